//! Motion rules applied once per animation step

use super::entity::Entity;
use crate::consts::*;

/// Motion style, picked once at spawn and fixed for the entity's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trajectory {
    /// x advances by dx; y by dy plus a sine of x
    Wave,
    /// Plain velocity integration
    Straight,
    /// x oscillates with a sine of y on top of dx; y advances by dy
    SinX,
}

impl Trajectory {
    pub const ALL: [Trajectory; 3] = [Trajectory::Wave, Trajectory::Straight, Trajectory::SinX];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trajectory::Wave => "wave",
            Trajectory::Straight => "straight",
            Trajectory::SinX => "sinx",
        }
    }

    /// Advance the entity's position by one step (velocity is untouched)
    pub fn apply(self, entity: &mut Entity) {
        let vel = entity.vel;
        let pos = &mut entity.pos;
        match self {
            Trajectory::Wave => {
                pos.x += vel.x;
                // Wave phase uses the already-updated x
                let wave = (pos.x * WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE;
                pos.y += vel.y + wave * WAVE_SCALE;
            }
            Trajectory::Straight => {
                pos.x += vel.x;
                pos.y += vel.y;
            }
            Trajectory::SinX => {
                pos.x += (pos.y * SIN_X_FREQUENCY).sin() * SIN_X_AMPLITUDE + vel.x;
                pos.y += vel.y;
            }
        }
    }
}

//! Entity construction with randomized size, velocity and color

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Color, Entity, EntityId, ShapeKind};
use super::trajectory::Trajectory;
use crate::consts::*;

/// Builds entities with random attributes from a seedable RNG
#[derive(Debug, Clone)]
pub struct EntityFactory {
    rng: Pcg32,
}

impl Default for EntityFactory {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl EntityFactory {
    /// Reproducible factory
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Entity placed uniformly at random inside a `width` x `height` canvas
    pub fn random(&mut self, id: EntityId, kind: ShapeKind, width: f64, height: f64) -> Entity {
        let size = self.random_size();
        let pos = DVec2::new(
            self.rng.random::<f64>() * (width - size * 2.0).max(0.0),
            self.rng.random::<f64>() * (height - size * 2.0).max(0.0),
        );
        self.finish(id, kind, pos, size)
    }

    /// Entity centered on `center`, pushed back inside the canvas if needed
    pub fn centered(
        &mut self,
        id: EntityId,
        kind: ShapeKind,
        center: DVec2,
        width: f64,
        height: f64,
    ) -> Entity {
        let size = self.random_size();
        let mut entity = self.finish(id, kind, DVec2::ZERO, size);
        let ext = entity.extent();

        let mut pos = center - ext * 0.5;
        pos.x = pos.x.max(0.0);
        pos.y = pos.y.max(0.0);
        if pos.x + ext.x > width {
            pos.x = width - ext.x;
        }
        if pos.y + ext.y > height {
            pos.y = height - ext.y;
        }
        entity.pos = pos;
        entity
    }

    /// Uniformly random shape kind
    pub fn random_kind(&mut self) -> ShapeKind {
        ShapeKind::ALL[self.rng.random_range(0..ShapeKind::ALL.len())]
    }

    /// Uniformly random trajectory
    pub fn random_trajectory(&mut self) -> Trajectory {
        Trajectory::ALL[self.rng.random_range(0..Trajectory::ALL.len())]
    }

    fn random_size(&mut self) -> f64 {
        MIN_SIZE + self.rng.random::<f64>() * SIZE_SPREAD
    }

    fn random_axis_speed(&mut self) -> f64 {
        let v = self.rng.random::<f64>() * 2.0 - 1.0;
        if v.abs() < MIN_AXIS_SPEED {
            if v > 0.0 { MIN_AXIS_SPEED } else { -MIN_AXIS_SPEED }
        } else {
            v
        }
    }

    fn random_color(&mut self) -> Color {
        Color::new(self.rng.random(), self.rng.random(), self.rng.random())
    }

    fn finish(&mut self, id: EntityId, kind: ShapeKind, pos: DVec2, size: f64) -> Entity {
        let vel = DVec2::new(self.random_axis_speed(), self.random_axis_speed());
        let color = self.random_color();
        let entity = Entity::new(id, kind, pos, vel, size, color);
        match kind {
            ShapeKind::Rectangle => {
                let aspect = ASPECT_MIN + self.rng.random::<f64>() * ASPECT_SPREAD;
                entity.with_aspect(aspect)
            }
            ShapeKind::Circle | ShapeKind::Triangle => entity,
        }
    }
}

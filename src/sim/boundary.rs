//! Canvas wall reflection
//!
//! Each axis is checked independently. A crossing clamps the bounding box to
//! the wall and flips that velocity component, losing energy on impact.

use super::entity::Entity;
use super::geometry::Rect;
use crate::consts::WALL_DAMPING;

/// Which walls were hit during one reflection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHits {
    pub x: bool,
    pub y: bool,
}

impl WallHits {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Clamp the entity inside `canvas` and reflect velocity on crossed axes
pub fn reflect(entity: &mut Entity, canvas: &Rect) -> WallHits {
    let hits = contain(entity, canvas);
    if hits.x {
        entity.vel.x = -entity.vel.x * WALL_DAMPING;
    }
    if hits.y {
        entity.vel.y = -entity.vel.y * WALL_DAMPING;
    }
    hits
}

/// Clamp the entity inside `canvas` without touching its velocity
pub fn contain(entity: &mut Entity, canvas: &Rect) -> WallHits {
    let ext = entity.extent();
    let (x, hit_x) = clamp_axis(entity.pos.x, ext.x, canvas.min.x, canvas.max.x);
    let (y, hit_y) = clamp_axis(entity.pos.y, ext.y, canvas.min.y, canvas.max.y);
    entity.pos.x = x;
    entity.pos.y = y;
    WallHits { x: hit_x, y: hit_y }
}

// The low wall is applied last so an entity wider than the canvas is pinned
// to the origin instead of pushed past it.
fn clamp_axis(pos: f64, ext: f64, lo: f64, hi: f64) -> (f64, bool) {
    let mut pos = pos;
    let mut hit = false;
    if pos + ext >= hi {
        pos = hi - ext;
        hit = true;
    }
    if pos < lo {
        pos = lo;
        hit = true;
    }
    (pos, hit)
}

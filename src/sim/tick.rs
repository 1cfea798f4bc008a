//! Single animation and collision ticks
//!
//! The scheduler threads call these once per period; tests call them directly.

use std::time::Instant;

use super::geometry::Rect;
use super::manager::{CollisionManager, ScanReport};
use super::world::World;

/// Step every running animator once. Returns how many entities moved.
pub fn animate(world: &World, canvas: &Rect, now: Instant) -> usize {
    world
        .snapshot()
        .iter()
        .filter(|slot| slot.step(canvas, now))
        .count()
}

/// Run one collision scan over the current population
pub fn detect(manager: &mut CollisionManager, world: &World, now: Instant) -> ScanReport {
    manager.scan(&world.snapshot(), now)
}

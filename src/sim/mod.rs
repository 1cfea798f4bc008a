//! Motion and collision core
//!
//! Everything here is independent of threads and wall-clock sleeps:
//! - Time-dependent behavior takes an explicit `Instant`
//! - Geometry is always derived from current position and size
//! - The shared collection hands out snapshots for iteration

pub mod animator;
pub mod boundary;
pub mod collision;
pub mod entity;
pub mod factory;
pub mod geometry;
pub mod manager;
pub mod tick;
pub mod trajectory;
pub mod world;

pub use animator::{Animator, AnimatorState};
pub use collision::{Contact, contact, overlap_bounds, overlaps, separation_distance};
pub use entity::{Color, Entity, EntityId, Outline, ShapeKind};
pub use factory::EntityFactory;
pub use geometry::{Rect, Shape};
pub use manager::{CollisionManager, ScanReport, resolve};
pub use trajectory::Trajectory;
pub use world::{Slot, World};

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// A panic elsewhere never leaves entity fields half-written, so poisoned
// locks are taken over rather than propagated.

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}

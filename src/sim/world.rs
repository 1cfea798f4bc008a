//! Shared entity collection
//!
//! Slots are reference counted so readers (animation, collision scan,
//! rendering, persistence) work on a point-in-time snapshot while entities
//! are inserted or removed concurrently. Each entity sits behind its own
//! mutex so no reader ever sees half an update.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use glam::DVec2;

use super::animator::Animator;
use super::entity::{Entity, EntityId};
use super::geometry::Rect;
use super::trajectory::Trajectory;
use super::{lock, read, write};

/// One live entity and the animator driving it
#[derive(Debug)]
pub struct Slot {
    id: EntityId,
    entity: Mutex<Entity>,
    animator: Animator,
}

impl Slot {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Lock the entity for reading or mutation
    pub fn entity(&self) -> MutexGuard<'_, Entity> {
        lock(&self.entity)
    }

    /// Copy of the entity's current state
    pub fn snapshot(&self) -> Entity {
        self.entity().clone()
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Run one animation step for this slot
    pub fn step(&self, canvas: &Rect, now: Instant) -> bool {
        self.animator.step(&self.entity, canvas, now)
    }
}

#[derive(Debug)]
pub struct World {
    slots: RwLock<Vec<Arc<Slot>>>,
    next_id: AtomicU64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate a fresh entity ID
    pub fn next_entity_id(&self) -> EntityId {
        EntityId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Add an entity with a running animator and return its ID.
    ///
    /// IDs are unique within the world: an entity whose ID is already taken
    /// is given a fresh one, and later allocations skip past any ID inserted
    /// from outside `next_entity_id`.
    pub fn insert(&self, mut entity: Entity, trajectory: Trajectory) -> EntityId {
        let mut slots = write(&self.slots);

        let requested = entity.id();
        self.next_id.fetch_max(requested.0.saturating_add(1), Ordering::Relaxed);
        if slots.iter().any(|s| s.id == requested) {
            let fresh = self.next_entity_id();
            log::warn!("Entity ID {requested} already in use, assigning {fresh}");
            entity.set_id(fresh);
        }

        let id = entity.id();
        slots.push(Arc::new(Slot {
            id,
            entity: Mutex::new(entity),
            animator: Animator::new(trajectory),
        }));
        id
    }

    /// Point-in-time view of all slots, in insertion order
    pub fn snapshot(&self) -> Vec<Arc<Slot>> {
        read(&self.slots).clone()
    }

    /// Copies of all entities, in insertion order
    pub fn entities(&self) -> Vec<Entity> {
        self.snapshot().iter().map(|s| s.snapshot()).collect()
    }

    pub fn get(&self, id: EntityId) -> Option<Arc<Slot>> {
        read(&self.slots).iter().find(|s| s.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        read(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.slots).is_empty()
    }

    /// Mutate one entity in place
    pub fn with_entity<R>(&self, id: EntityId, f: impl FnOnce(&mut Entity) -> R) -> Option<R> {
        let slot = self.get(id)?;
        let mut entity = slot.entity();
        Some(f(&mut entity))
    }

    /// Topmost (most recently added) entity whose shape contains `point`
    pub fn find_at(&self, point: DVec2) -> Option<EntityId> {
        self.snapshot()
            .iter()
            .rev()
            .find(|s| s.entity().contains(point))
            .map(|s| s.id)
    }

    /// Stop the entity's animator, then drop it from the collection.
    /// Returns the final entity state with display flags cleared.
    pub fn remove(&self, id: EntityId) -> Option<Entity> {
        let mut slots = write(&self.slots);
        let index = slots.iter().position(|s| s.id == id)?;
        if slots[index].animator.cancel() {
            log::debug!("Animator for {id} stopped");
        }
        let slot = slots.remove(index);
        drop(slots);

        let mut entity = slot.snapshot();
        entity.set_hovered(false);
        entity.clear_colliding();
        Some(entity)
    }

    /// Stop every animator and empty the collection
    pub fn drain(&self) -> Vec<Entity> {
        let mut slots = write(&self.slots);
        for slot in slots.iter() {
            slot.animator.cancel();
        }
        let removed = std::mem::take(&mut *slots);
        drop(slots);

        removed.iter().map(|s| s.snapshot()).collect()
    }
}

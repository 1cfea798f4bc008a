//! Collision manager: one full pairwise scan per collision tick
//!
//! Every unordered pair of the snapshot is tested with the exact-shape
//! detector. Overlapping pairs are pushed apart along the line between their
//! bounding-box centers, get fully inverted velocities, and show the collision
//! color. Sustained overlap is resolved again on every scan.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use super::collision::{contact, overlaps};
use super::entity::{Entity, EntityId};
use super::world::Slot;
use crate::monitor::{Event, EventLogger};

/// Unordered pair key (smaller ID first)
type PairKey = (EntityId, EntityId);

fn pair_key(a: EntityId, b: EntityId) -> PairKey {
    if a <= b { (a, b) } else { (b, a) }
}

/// Outcome of one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Pairs handed to the detector
    pub pairs_checked: usize,
    /// Pairs whose exact shapes overlapped
    pub overlapping: usize,
    /// Pairs that were actually pushed apart
    pub resolved: usize,
}

pub struct CollisionManager {
    /// Pairs handled in the current scan
    resolved: HashSet<PairKey>,
    events: Arc<dyn EventLogger>,
    scans: u64,
}

impl CollisionManager {
    pub fn new(events: Arc<dyn EventLogger>) -> Self {
        Self {
            resolved: HashSet::new(),
            events,
            scans: 0,
        }
    }

    /// Number of scans run so far
    pub fn scans(&self) -> u64 {
        self.scans
    }

    /// Whether the pair was handled during the most recent scan
    pub fn was_resolved(&self, a: EntityId, b: EntityId) -> bool {
        self.resolved.contains(&pair_key(a, b))
    }

    /// Test every unordered pair of `slots` once and resolve overlaps
    pub fn scan(&mut self, slots: &[Arc<Slot>], now: Instant) -> ScanReport {
        self.resolved.clear();
        self.scans += 1;
        let mut report = ScanReport::default();

        for (i, slot_a) in slots.iter().enumerate() {
            for slot_b in &slots[i + 1..] {
                let key = pair_key(slot_a.id(), slot_b.id());
                if key.0 == key.1 || self.resolved.contains(&key) {
                    continue;
                }

                // Only the scan holds two entity locks, always in snapshot order
                let mut a = slot_a.entity();
                let mut b = slot_b.entity();

                report.pairs_checked += 1;
                if !overlaps(&a, &b) {
                    continue;
                }
                report.overlapping += 1;
                self.resolved.insert(key);

                if resolve(&mut a, &mut b, now) {
                    report.resolved += 1;
                    self.events.record(Event::collision(a.kind(), b.kind()));
                }
            }
        }

        if report.overlapping > 0 {
            log::trace!(
                "Scan {}: {} pairs, {} overlapping, {} resolved",
                self.scans,
                report.pairs_checked,
                report.overlapping,
                report.resolved
            );
        }
        report
    }

    /// Reset every entity's collision state and forget this scan's pairs
    pub fn clear_all(&mut self, slots: &[Arc<Slot>]) {
        for slot in slots {
            slot.entity().clear_colliding();
        }
        self.resolved.clear();
    }
}

/// Push an overlapping pair apart and bounce both entities.
///
/// Returns false, leaving both untouched, when the bounding boxes share no
/// area.
pub fn resolve(a: &mut Entity, b: &mut Entity, now: Instant) -> bool {
    let Some(contact) = contact(a, b) else {
        return false;
    };

    let shift = contact.normal * (contact.separation * 0.5);
    a.pos -= shift;
    b.pos += shift;

    // Inter-entity bounces are elastic, unlike wall bounces
    a.vel = -a.vel;
    b.vel = -b.vel;

    a.mark_colliding(now);
    b.mark_colliding(now);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::NullEventLogger;
    use crate::sim::collision::separation_distance;
    use crate::sim::entity::{Color, ShapeKind};
    use crate::sim::trajectory::Trajectory;
    use crate::sim::world::World;
    use glam::DVec2;
    use proptest::prelude::*;
    use std::sync::Mutex;

    /// Keeps every event for inspection
    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<Event>>,
    }

    impl EventLogger for RecordingLogger {
        fn record(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl RecordingLogger {
        fn len(&self) -> usize {
            self.events.lock().unwrap().len()
        }
    }

    fn circle(id: u64, center: DVec2, radius: f64, vel: DVec2) -> Entity {
        let mut e = Entity::new(EntityId(id), ShapeKind::Circle, DVec2::ZERO, vel, radius * 2.0, Color::new(20, 40, 60));
        e.set_center(center);
        e
    }

    fn spawn_circle(world: &World, center: DVec2, radius: f64, vel: DVec2) -> EntityId {
        let id = world.next_entity_id();
        world.insert(circle(id.0, center, radius, vel), Trajectory::Straight)
    }

    #[test]
    fn test_two_circle_scenario() {
        let mut a = circle(1, DVec2::new(100.0, 100.0), 10.0, DVec2::new(0.5, -0.3));
        let mut b = circle(2, DVec2::new(105.0, 100.0), 10.0, DVec2::new(-0.4, 0.8));
        let (va, vb) = (a.vel, b.vel);
        assert!(overlaps(&a, &b));

        assert!(resolve(&mut a, &mut b, Instant::now()));

        let d = separation_distance(&a, &b);
        assert!(d > 5.0);
        assert!((d - 17.5).abs() < 1e-9);
        assert!(a.is_colliding() && b.is_colliding());
        assert_eq!(a.vel, -va);
        assert_eq!(b.vel, -vb);
        // Pushed symmetrically along +X
        assert!((a.center() - DVec2::new(93.75, 100.0)).length() < 1e-9);
        assert!((b.center() - DVec2::new(111.25, 100.0)).length() < 1e-9);
    }

    #[test]
    fn test_coincident_centers_use_default_normal() {
        let mut a = circle(1, DVec2::new(50.0, 50.0), 10.0, DVec2::ONE);
        let mut b = circle(2, DVec2::new(50.0, 50.0), 10.0, DVec2::ONE);
        assert!(resolve(&mut a, &mut b, Instant::now()));
        assert!(a.pos.is_finite() && b.pos.is_finite());
        assert!(a.center().x < 50.0 && b.center().x > 50.0);
        assert_eq!(a.center().y, 50.0);
        assert_eq!(b.center().y, 50.0);
    }

    #[test]
    fn test_touching_without_box_area_is_noop() {
        let mut a = Entity::new(EntityId(1), ShapeKind::Rectangle, DVec2::ZERO, DVec2::ONE, 10.0, Color::new(0, 0, 0));
        let mut b = Entity::new(EntityId(2), ShapeKind::Rectangle, DVec2::new(10.0, 0.0), DVec2::ONE, 10.0, Color::new(0, 0, 0));
        assert!(!resolve(&mut a, &mut b, Instant::now()));
        assert_eq!(a.vel, DVec2::ONE);
        assert!(!a.is_colliding());
    }

    #[test]
    fn test_scan_resolves_each_pair_once_per_scan() {
        let world = World::new();
        let a = spawn_circle(&world, DVec2::new(100.0, 100.0), 10.0, DVec2::ONE);
        let b = spawn_circle(&world, DVec2::new(105.0, 100.0), 10.0, DVec2::ONE);
        spawn_circle(&world, DVec2::new(300.0, 300.0), 10.0, DVec2::ONE);

        let logger = Arc::new(RecordingLogger::default());
        let mut manager = CollisionManager::new(logger.clone());

        // Still overlapping after one push (17.5 < 20), so both scans resolve
        let first = manager.scan(&world.snapshot(), Instant::now());
        assert_eq!(first.pairs_checked, 3);
        assert_eq!(first.resolved, 1);
        assert!(manager.was_resolved(b, a));
        assert_eq!(logger.len(), 1);

        let second = manager.scan(&world.snapshot(), Instant::now());
        assert_eq!(second.resolved, 1);
        assert_eq!(logger.len(), 2);
        assert_eq!(manager.scans(), 2);
    }

    #[test]
    fn test_scan_tolerates_stale_snapshot() {
        let world = World::new();
        let a = spawn_circle(&world, DVec2::new(100.0, 100.0), 10.0, DVec2::ONE);
        spawn_circle(&world, DVec2::new(104.0, 100.0), 10.0, DVec2::ONE);
        let snapshot = world.snapshot();
        world.remove(a);

        let mut manager = CollisionManager::new(Arc::new(NullEventLogger));
        let report = manager.scan(&snapshot, Instant::now());
        assert_eq!(report.pairs_checked, 1);
    }

    #[test]
    fn test_clear_all() {
        let world = World::new();
        let a = spawn_circle(&world, DVec2::new(100.0, 100.0), 10.0, DVec2::ONE);
        let b = spawn_circle(&world, DVec2::new(101.0, 100.0), 10.0, DVec2::ONE);
        let mut manager = CollisionManager::new(Arc::new(NullEventLogger));
        manager.scan(&world.snapshot(), Instant::now());
        assert!(world.with_entity(a, |e| e.is_colliding()).unwrap());

        manager.clear_all(&world.snapshot());
        assert!(!manager.was_resolved(a, b));
        assert!(!world.with_entity(a, |e| e.is_colliding()).unwrap());
        assert!(!world.with_entity(b, |e| e.is_colliding()).unwrap());
    }

    proptest! {
        #[test]
        fn prop_resolution_pushes_circles_apart(
            x in 50.0..150.0f64,
            y in 50.0..150.0f64,
            ox in -15.0..15.0f64,
            oy in -15.0..15.0f64,
            r in 5.0..20.0f64,
        ) {
            let mut a = circle(1, DVec2::new(x, y), r, DVec2::new(1.0, -2.0));
            let mut b = circle(2, DVec2::new(x + ox, y + oy), r, DVec2::new(-3.0, 0.5));
            prop_assume!(overlaps(&a, &b));
            let before = separation_distance(&a, &b);

            if resolve(&mut a, &mut b, Instant::now()) {
                prop_assert!(a.pos.is_finite() && b.pos.is_finite());
                prop_assert!(separation_distance(&a, &b) > before);
                prop_assert_eq!(a.vel, DVec2::new(-1.0, 2.0));
                prop_assert_eq!(b.vel, DVec2::new(3.0, -0.5));
            }
        }
    }
}

//! Simulation context
//!
//! Owns the shared world, the collision manager and the entity factory, and
//! drives them from two scheduler threads:
//! - `animator`: steps every running animator once per animator interval
//! - `collision`: runs one pairwise scan per collision interval
//!
//! Both threads sleep on a shutdown channel, so dropping its sender wakes and
//! stops them immediately.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use glam::DVec2;

use crate::error::{Error, Result};
use crate::monitor::{Event, EventLogger};
use crate::persistence;
use crate::platform::{CanvasBounds, RenderSink};
use crate::settings::Settings;
use crate::sim::{CollisionManager, Entity, EntityFactory, EntityId, ShapeKind, Trajectory, World, lock, tick};

pub struct Simulation {
    world: Arc<World>,
    manager: Arc<Mutex<CollisionManager>>,
    factory: Mutex<EntityFactory>,
    hovered: Mutex<Option<EntityId>>,

    canvas: Arc<dyn CanvasBounds>,
    renderer: Arc<dyn RenderSink>,
    events: Arc<dyn EventLogger>,

    animator_interval: Duration,
    collision_interval: Duration,

    /// Present while the scheduler threads run
    shutdown: Option<Sender<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl Simulation {
    pub fn new(
        settings: &Settings,
        canvas: Arc<dyn CanvasBounds>,
        renderer: Arc<dyn RenderSink>,
        events: Arc<dyn EventLogger>,
    ) -> Self {
        let factory = match settings.seed {
            Some(seed) => EntityFactory::new(seed),
            None => EntityFactory::from_entropy(),
        };

        Self {
            world: Arc::new(World::new()),
            manager: Arc::new(Mutex::new(CollisionManager::new(Arc::clone(&events)))),
            factory: Mutex::new(factory),
            hovered: Mutex::new(None),
            canvas,
            renderer,
            events,
            animator_interval: settings.animator_interval(),
            collision_interval: settings.collision_interval(),
            shutdown: None,
            workers: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Launch the animation and collision threads
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(Error::AlreadyRunning);
        }

        let (tx, rx) = bounded::<()>(0);
        self.shutdown = Some(tx);

        let world = Arc::clone(&self.world);
        let canvas = Arc::clone(&self.canvas);
        let renderer = Arc::clone(&self.renderer);
        let animation = spawn_worker("animator", self.animator_interval, rx.clone(), move |now| {
            if tick::animate(&world, &canvas.bounds(), now) > 0 {
                renderer.request_redraw();
            }
        });
        self.track(animation)?;

        let world = Arc::clone(&self.world);
        let manager = Arc::clone(&self.manager);
        let renderer = Arc::clone(&self.renderer);
        let collision = spawn_worker("collision", self.collision_interval, rx, move |now| {
            let report = tick::detect(&mut lock(&manager), &world, now);
            if report.resolved > 0 {
                renderer.request_redraw();
            }
        });
        self.track(collision)?;

        log::info!(
            "Simulation started (animation {}ms, collision {}ms)",
            self.animator_interval.as_millis(),
            self.collision_interval.as_millis()
        );
        Ok(())
    }

    fn track(&mut self, spawned: Result<JoinHandle<()>>) -> Result<()> {
        match spawned {
            Ok(handle) => {
                self.workers.push(handle);
                Ok(())
            }
            Err(e) => {
                self.shutdown();
                Err(e)
            }
        }
    }

    /// Stop and join the scheduler threads. Entities stay in the world.
    pub fn shutdown(&mut self) {
        if self.shutdown.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                log::error!("{name} thread panicked");
            }
        }
        log::info!("Simulation stopped");
    }

    /// One animation step followed by one collision scan, on the calling thread
    pub fn step(&self, now: Instant) {
        let moved = tick::animate(&self.world, &self.canvas.bounds(), now);
        let report = tick::detect(&mut lock(&self.manager), &self.world, now);
        if moved > 0 || report.resolved > 0 {
            self.renderer.request_redraw();
        }
    }

    // === Spawning ===

    /// Spawn at a random spot inside the canvas
    pub fn spawn_random(&self, kind: ShapeKind) -> EntityId {
        let bounds = self.canvas.bounds();
        let id = self.world.next_entity_id();
        let (mut entity, trajectory) = {
            let mut factory = lock(&self.factory);
            let entity = factory.random(id, kind, bounds.width(), bounds.height());
            (entity, factory.random_trajectory())
        };
        entity.pos += bounds.min;
        self.insert(entity, trajectory)
    }

    /// Spawn centered on `point`, kept inside the canvas
    pub fn spawn_at(&self, kind: ShapeKind, point: DVec2) -> EntityId {
        let bounds = self.canvas.bounds();
        let id = self.world.next_entity_id();
        let (mut entity, trajectory) = {
            let mut factory = lock(&self.factory);
            let entity = factory.centered(id, kind, point - bounds.min, bounds.width(), bounds.height());
            (entity, factory.random_trajectory())
        };
        entity.pos += bounds.min;
        self.insert(entity, trajectory)
    }

    /// Spawn `count` entities of random kinds at random spots
    pub fn spawn_batch(&self, count: usize) -> Vec<EntityId> {
        (0..count)
            .map(|_| {
                let kind = lock(&self.factory).random_kind();
                self.spawn_random(kind)
            })
            .collect()
    }

    /// Add a prebuilt entity. A duplicate ID is replaced; use the returned one.
    pub fn insert(&self, entity: Entity, trajectory: Trajectory) -> EntityId {
        let (kind, pos) = (entity.kind(), entity.pos);
        let id = self.world.insert(entity, trajectory);
        log::debug!("Spawned {kind} {id} ({})", trajectory.as_str());
        self.events.record(Event::Created { kind, pos });
        self.renderer.request_redraw();
        id
    }

    // === Interaction ===

    /// Cancel the entity's animator and drop it
    pub fn remove(&self, id: EntityId) -> Option<Entity> {
        let removed = self.world.remove(id)?;
        {
            let mut hovered = lock(&self.hovered);
            if *hovered == Some(id) {
                *hovered = None;
            }
        }
        log::debug!("Removed {} {id}", removed.kind());
        self.events.record(Event::Removed { kind: removed.kind() });
        self.renderer.request_redraw();
        Some(removed)
    }

    /// Remove every entity
    pub fn clear_all(&self) -> usize {
        lock(&self.manager).clear_all(&self.world.snapshot());
        let removed = self.world.drain();
        *lock(&self.hovered) = None;
        for entity in &removed {
            self.events.record(Event::Removed { kind: entity.kind() });
        }
        log::info!("Cleared {} entities", removed.len());
        self.renderer.request_redraw();
        removed.len()
    }

    pub fn find_at(&self, point: DVec2) -> Option<EntityId> {
        self.world.find_at(point)
    }

    /// Flip the paused flag. Returns the new value, or `None` if the entity is gone.
    pub fn toggle_pause(&self, id: EntityId) -> Option<bool> {
        let paused = self.world.with_entity(id, |e| e.toggle_pause())?;
        log::debug!("{id} {}", if paused { "paused" } else { "resumed" });
        self.renderer.request_redraw();
        Some(paused)
    }

    /// Highlight the topmost entity under `point`, un-highlighting the previous one
    pub fn hover_at(&self, point: DVec2) -> Option<EntityId> {
        let target = self.world.find_at(point);
        let mut hovered = lock(&self.hovered);
        if *hovered != target {
            if let Some(prev) = *hovered {
                self.world.with_entity(prev, |e| e.set_hovered(false));
            }
            if let Some(next) = target {
                self.world.with_entity(next, |e| e.set_hovered(true));
            }
            *hovered = target;
            self.renderer.request_redraw();
        }
        target
    }

    pub fn clear_hover(&self) {
        let mut hovered = lock(&self.hovered);
        if let Some(prev) = hovered.take() {
            self.world.with_entity(prev, |e| e.set_hovered(false));
            self.renderer.request_redraw();
        }
    }

    // === Queries ===

    pub fn entities(&self) -> Vec<Entity> {
        self.world.entities()
    }

    pub fn len(&self) -> usize {
        self.world.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Entities currently showing the collision color
    pub fn colliding_count(&self) -> usize {
        self.world
            .snapshot()
            .iter()
            .filter(|s| s.entity().is_colliding())
            .count()
    }

    /// Collision scans run so far
    pub fn scans(&self) -> u64 {
        lock(&self.manager).scans()
    }

    // === Persistence ===

    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
        persistence::save(path, &self.world.entities())
    }

    /// Add every recognized entity from a save file. Returns how many were added.
    pub fn restore(&self, path: impl AsRef<Path>) -> Result<usize> {
        let file = persistence::load(path)?;
        let size = {
            let bounds = self.canvas.bounds();
            DVec2::new(bounds.width(), bounds.height())
        };
        let now = Instant::now();

        let mut added = 0;
        for record in &file.objects {
            let id = self.world.next_entity_id();
            let (entity, trajectory) = {
                let mut factory = lock(&self.factory);
                let Some(entity) = record.to_entity(id, &mut factory, size, now) else {
                    continue;
                };
                (entity, factory.random_trajectory())
            };
            self.insert(entity, trajectory);
            added += 1;
        }
        log::info!("Restored {added} of {} saved objects", file.objects.len());
        Ok(added)
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_worker(
    name: &'static str,
    interval: Duration,
    stop: Receiver<()>,
    mut tick: impl FnMut(Instant) + Send + 'static,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            log::debug!("{name} thread running every {}ms", interval.as_millis());
            loop {
                let started = Instant::now();
                tick(started);
                match stop.recv_timeout(interval.saturating_sub(started.elapsed())) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            log::debug!("{name} thread exiting");
        })
        .map_err(|source| Error::ThreadSpawn { name, source })
}

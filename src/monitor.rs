//! Event logging collaborator
//!
//! The simulation reports collisions, spawns and removals here. Reporting is
//! fire-and-forget: the channel logger never blocks the caller and silently
//! counts records it had to drop when the queue is full or the writer is gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use glam::DVec2;

use crate::error::{Error, Result};
use crate::sim::ShapeKind;

/// Something worth recording
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Collision {
        first: ShapeKind,
        second: ShapeKind,
        at: SystemTime,
    },
    Created {
        kind: ShapeKind,
        pos: DVec2,
    },
    Removed {
        kind: ShapeKind,
    },
}

impl Event {
    pub fn collision(first: ShapeKind, second: ShapeKind) -> Self {
        Event::Collision {
            first,
            second,
            at: SystemTime::now(),
        }
    }
}

/// Receiver of simulation events. Implementations must not block.
pub trait EventLogger: Send + Sync {
    fn record(&self, event: Event);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullEventLogger;

impl EventLogger for NullEventLogger {
    fn record(&self, _event: Event) {}
}

/// Running totals kept by the channel logger
#[derive(Debug, Default)]
pub struct EventStats {
    pub collisions: AtomicU64,
    pub created: AtomicU64,
    pub removed: AtomicU64,
    pub dropped: AtomicU64,
}

impl EventStats {
    pub fn summary(&self) -> String {
        format!(
            "collisions={} created={} removed={} dropped={}",
            self.collisions.load(Ordering::Relaxed),
            self.created.load(Ordering::Relaxed),
            self.removed.load(Ordering::Relaxed),
            self.dropped.load(Ordering::Relaxed),
        )
    }
}

/// Queues events to a background writer thread that emits them through `log`
#[derive(Debug)]
pub struct ChannelEventLogger {
    tx: Sender<Event>,
    stats: Arc<EventStats>,
}

impl ChannelEventLogger {
    /// Start the writer thread. It exits once every logger handle is dropped.
    pub fn spawn(capacity: usize) -> Result<(Self, JoinHandle<()>)> {
        let (tx, rx) = bounded(capacity.max(1));
        let stats = Arc::new(EventStats::default());

        let writer_stats = Arc::clone(&stats);
        let handle = thread::Builder::new()
            .name("event-log".into())
            .spawn(move || write_events(rx, writer_stats))
            .map_err(|source| Error::ThreadSpawn {
                name: "event-log",
                source,
            })?;

        Ok((Self { tx, stats }, handle))
    }

    pub fn stats(&self) -> Arc<EventStats> {
        Arc::clone(&self.stats)
    }
}

impl EventLogger for ChannelEventLogger {
    fn record(&self, event: Event) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

fn write_events(rx: Receiver<Event>, stats: Arc<EventStats>) {
    for event in rx.iter() {
        match event {
            Event::Collision { first, second, at } => {
                stats.collisions.fetch_add(1, Ordering::Relaxed);
                log::info!(
                    target: "events",
                    "collision {first} <-> {second} at {}ms",
                    unix_millis(at)
                );
            }
            Event::Created { kind, pos } => {
                stats.created.fetch_add(1, Ordering::Relaxed);
                log::info!(target: "events", "created {kind} at ({:.1}, {:.1})", pos.x, pos.y);
            }
            Event::Removed { kind } => {
                stats.removed.fetch_add(1, Ordering::Relaxed);
                log::info!(target: "events", "removed {kind}");
            }
        }
    }
    log::debug!("Event writer finished: {}", stats.summary());
}

/// Milliseconds since the Unix epoch (0 for clocks set before it)
pub fn unix_millis(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

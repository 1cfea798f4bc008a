//! Platform collaborators
//!
//! The core never draws or owns a window. It asks a bounds provider for the
//! canvas rectangle and pokes a render sink after every change; both are
//! traits so a GUI, a test, or the headless runner can plug in.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec2;

use crate::sim::{Rect, read, write};

/// Supplies the current canvas rectangle
pub trait CanvasBounds: Send + Sync {
    fn bounds(&self) -> Rect;
}

/// Canvas anchored at the origin whose size can change at runtime
#[derive(Debug)]
pub struct Canvas {
    size: RwLock<DVec2>,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: RwLock::new(DVec2::new(width, height)),
        }
    }

    pub fn size(&self) -> DVec2 {
        *read(&self.size)
    }

    pub fn resize(&self, width: f64, height: f64) {
        *write(&self.size) = DVec2::new(width, height);
        log::debug!("Canvas resized to {width}x{height}");
    }
}

impl CanvasBounds for Canvas {
    fn bounds(&self) -> Rect {
        Rect::new(DVec2::ZERO, self.size())
    }
}

/// Receives fire-and-forget redraw requests
pub trait RenderSink: Send + Sync {
    fn request_redraw(&self);
}

/// Ignores redraw requests
#[derive(Debug, Default)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn request_redraw(&self) {}
}

/// Counts redraw requests (used by the headless runner for stats)
#[derive(Debug, Default)]
pub struct RedrawCounter {
    count: AtomicU64,
}

impl RedrawCounter {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl RenderSink for RedrawCounter {
    fn request_redraw(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

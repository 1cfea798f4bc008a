//! Runtime configuration
//!
//! Loaded from an optional JSON file; every field has a default so partial
//! files are fine. Command-line flags override individual values.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};
use crate::sim::ShapeKind;

/// A batch of entities to spawn at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Shape token; unknown tokens spawn circles
    pub shape: String,
    pub count: u32,
}

impl SpawnGroup {
    pub fn kind(&self) -> ShapeKind {
        ShapeKind::from_token(&self.shape)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Canvas ===
    pub canvas_width: f64,
    pub canvas_height: f64,

    // === Scheduling ===
    /// Pause between animation steps (milliseconds)
    pub animator_interval_ms: u64,
    /// Collision scan cadence (milliseconds)
    pub collision_interval_ms: u64,

    // === Spawning ===
    /// Factory seed; random when absent
    pub seed: Option<u64>,
    /// Entities created at startup
    pub initial: Vec<SpawnGroup>,

    // === Event log ===
    /// Events buffered before new ones are dropped
    pub event_queue_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,

            animator_interval_ms: ANIMATOR_INTERVAL.as_millis() as u64,
            collision_interval_ms: COLLISION_INTERVAL.as_millis() as u64,

            seed: None,
            initial: Vec::new(),

            event_queue_capacity: 1024,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file and validate them
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "canvas must be positive, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.animator_interval_ms == 0 || self.collision_interval_ms == 0 {
            return Err(Error::InvalidConfig("intervals must be greater than 0".into()));
        }
        if self.collision_interval_ms <= self.animator_interval_ms {
            return Err(Error::InvalidConfig(format!(
                "collision interval ({}ms) must be slower than the animator interval ({}ms)",
                self.collision_interval_ms, self.animator_interval_ms
            )));
        }
        if self.event_queue_capacity == 0 {
            return Err(Error::InvalidConfig("event queue capacity must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn animator_interval(&self) -> Duration {
        Duration::from_millis(self.animator_interval_ms)
    }

    pub fn collision_interval(&self) -> Duration {
        Duration::from_millis(self.collision_interval_ms)
    }

    /// Total entities requested at startup
    pub fn initial_count(&self) -> u32 {
        self.initial.iter().map(|g| g.count).sum()
    }
}

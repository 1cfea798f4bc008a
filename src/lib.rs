//! Shape Bounce - concurrent 2D shape animation with exact collision handling
//!
//! Core modules:
//! - `sim`: Entities, trajectories, wall reflection, collision detection and resolution
//! - `engine`: Simulation context owning the shared world and its scheduler threads
//! - `platform`: Canvas bounds and redraw collaborators
//! - `monitor`: Non-blocking event logger
//! - `persistence`: JSON save/restore of the entity collection
//! - `settings`: Runtime configuration

pub mod engine;
pub mod error;
pub mod monitor;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use engine::Simulation;
pub use error::{Error, Result};
pub use settings::Settings;

use glam::DVec2;

/// Simulation constants
pub mod consts {
    use std::time::Duration;

    /// Pause between two animation steps of every entity
    pub const ANIMATOR_INTERVAL: Duration = Duration::from_millis(5);
    /// Cadence of the pairwise collision scan (slower than animation)
    pub const COLLISION_INTERVAL: Duration = Duration::from_millis(20);
    /// How long an entity shows the collision color after the last hit
    pub const COLLISION_DISPLAY_DURATION: Duration = Duration::from_millis(200);

    /// Velocity scale applied when bouncing off a canvas wall
    pub const WALL_DAMPING: f64 = 0.9;

    /// Entity size range (diameter / side length)
    pub const MIN_SIZE: f64 = 10.0;
    pub const SIZE_SPREAD: f64 = 20.0;
    /// Per-axis speed floor so nothing drifts at near-zero velocity
    pub const MIN_AXIS_SPEED: f64 = 0.2;
    /// Rectangle height = width * (ASPECT_MIN + rand * ASPECT_SPREAD)
    pub const ASPECT_MIN: f64 = 0.7;
    pub const ASPECT_SPREAD: f64 = 0.6;

    /// Wave trajectory: y += dy + sin(x * WAVE_FREQUENCY) * WAVE_AMPLITUDE * WAVE_SCALE
    pub const WAVE_FREQUENCY: f64 = 0.02;
    pub const WAVE_AMPLITUDE: f64 = 15.0;
    pub const WAVE_SCALE: f64 = 0.1;
    /// SinX trajectory: x += sin(y * SIN_X_FREQUENCY) * SIN_X_AMPLITUDE + dx
    pub const SIN_X_FREQUENCY: f64 = 0.03;
    pub const SIN_X_AMPLITUDE: f64 = 2.0;

    /// Canvas used when none is configured
    pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
    pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    (b - a).length()
}

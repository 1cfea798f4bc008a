//! Per-entity animation unit
//!
//! An animator owns one entity's trajectory and lifecycle. The animation
//! scheduler steps every running animator at a fixed cadence; each step holds
//! the animator's state lock, so `cancel` returns only after any in-flight
//! step has finished and no later step can touch the entity.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::entity::Entity;
use super::geometry::Rect;
use super::lock;
use super::trajectory::Trajectory;

/// Lifecycle of an animator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    /// Stepping on every scheduler tick (state right after spawn)
    Running,
    /// Cancelled; will never step again
    Stopped,
}

#[derive(Debug)]
pub struct Animator {
    trajectory: Trajectory,
    state: Mutex<AnimatorState>,
    steps: AtomicU64,
}

impl Animator {
    pub fn new(trajectory: Trajectory) -> Self {
        Self {
            trajectory,
            state: Mutex::new(AnimatorState::Running),
            steps: AtomicU64::new(0),
        }
    }

    pub fn trajectory(&self) -> Trajectory {
        self.trajectory
    }

    pub fn state(&self) -> AnimatorState {
        *lock(&self.state)
    }

    pub fn is_running(&self) -> bool {
        self.state() == AnimatorState::Running
    }

    /// Number of completed steps
    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Relaxed)
    }

    /// Advance `entity` once if still running. Returns false once stopped.
    pub fn step(&self, entity: &Mutex<Entity>, canvas: &Rect, now: Instant) -> bool {
        let state = lock(&self.state);
        if *state != AnimatorState::Running {
            return false;
        }
        lock(entity).advance(self.trajectory, canvas, now);
        self.steps.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Stop the animator. Blocks for at most one in-flight step.
    /// Returns true if this call performed the transition.
    pub fn cancel(&self) -> bool {
        let mut state = lock(&self.state);
        let was_running = *state == AnimatorState::Running;
        *state = AnimatorState::Stopped;
        was_running
    }
}

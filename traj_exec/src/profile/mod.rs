//! # Motion Profile
//!
//! A motion profile is a time-indexed schedule of arc length, velocity and acceleration along a
//! path. Profiles are produced by [`ProfileGenerator`] as a sequence of constant acceleration
//! segments and are immutable once built.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod generator;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use generator::{ProfileGenerator, DEFAULT_PROFILE_RESOLUTION};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position along the path, velocity and acceleration at one instant.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// Arc length along the path
    pub x: f64,

    /// Velocity along the path
    pub v: f64,

    /// Acceleration along the path
    pub a: f64,
}

/// A constant acceleration piece of a profile.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Segment {
    t0_s: f64,
    x0: f64,
    v0: f64,
    a: f64,
}

/// Mapping from elapsed time to [`MotionState`].
#[derive(Debug, Clone, PartialEq)]
pub struct MotionProfile {
    segments: Vec<Segment>,
    start: MotionState,
    end: MotionState,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while generating a profile.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ProfileError {
    #[error("Velocity limit must be positive inside the path, found {v} at s = {s}")]
    InvalidVelocityLimit { s: f64, v: f64 },

    #[error("Acceleration limit must be positive and finite, found {a} at s = {s}")]
    InvalidAccelerationLimit { s: f64, a: f64 },

    #[error("Invalid boundary states: start {start:?}, end {end:?}")]
    InvalidBoundaryStates { start: MotionState, end: MotionState },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionState {
    pub fn new(x: f64, v: f64, a: f64) -> Self {
        Self { x, v, a }
    }
}

impl Segment {
    fn state_at(&self, t: f64) -> MotionState {
        let tau = t - self.t0_s;

        MotionState {
            x: self.x0 + self.v0 * tau + 0.5 * self.a * tau * tau,
            v: self.v0 + self.a * tau,
            a: self.a,
        }
    }
}

impl MotionProfile {
    /// A profile that stays at `state` with zero duration.
    pub fn stationary(state: MotionState) -> Self {
        Self {
            segments: Vec::new(),
            start: state,
            end: state,
            duration_s: 0.0,
        }
    }

    /// Total time taken by the profile.
    pub fn duration(&self) -> f64 {
        self.duration_s
    }

    pub fn start(&self) -> MotionState {
        self.start
    }

    pub fn end(&self) -> MotionState {
        self.end
    }

    /// Get the state at elapsed time `t_s`.
    ///
    /// Times before the start give the start state and times after the end give the end state.
    pub fn get(&self, t_s: f64) -> MotionState {
        if t_s <= 0.0 || self.segments.is_empty() {
            return self.start;
        }
        if t_s >= self.duration_s {
            return self.end;
        }

        // Index of the last segment starting at or before t
        let idx = self
            .segments
            .partition_point(|s| s.t0_s <= t_s)
            .saturating_sub(1);

        self.segments[idx].state_at(t_s)
    }
}

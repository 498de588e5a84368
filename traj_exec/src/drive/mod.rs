//! # Drive
//!
//! Interfaces between the follower and the vehicle: a [`Localizer`] providing the current pose
//! estimate and a [`Drivetrain`] accepting velocity and acceleration commands. This module also
//! provides the feedforward model and mecanum wheel mixing used to turn those commands into wheel
//! powers.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod mecanum;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::pose::Pose;
pub use mecanum::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of pose estimates.
pub trait Localizer {
    /// The most recent pose estimate in the field frame.
    fn pose(&self) -> Pose;
}

/// A drivetrain that can be commanded with a desired velocity and acceleration.
pub trait Drivetrain {
    /// Command the drivetrain with a body frame pose, of which the velocity, acceleration, angular
    /// velocity and angular acceleration are used.
    ///
    /// Repeating the same command has no further effect.
    fn set_drive_va(&mut self, cmd: &Pose);

    /// Stop all motion.
    fn stop(&mut self);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

/// A pose is a localizer which always reports itself.
impl Localizer for Pose {
    fn pose(&self) -> Pose {
        *self
    }
}

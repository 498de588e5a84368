//! # Trajectory library.
//!
//! This library provides the path geometry, motion profiling and path following used by the
//! trajectory executable, and allows other crates in the workspace to use them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive interfaces - localizer and drivetrain traits, feedforward and mecanum wheel mixing
pub mod drive;

/// Follower - tracks a motion profile along a path and commands the drivetrain
pub mod follower;

/// Trajectory executable parameters
pub mod params;

/// Paths - linear, Hermite and compound paths parameterised by `t` in `[0, 1]`
pub mod path;

/// Polynomials used to build Hermite paths
pub mod poly;

/// Planar pose with velocity and acceleration
pub mod pose;

/// Motion profiles - time-indexed schedules of distance, velocity and acceleration
pub mod profile;

/// Simulated mecanum base
pub mod sim;

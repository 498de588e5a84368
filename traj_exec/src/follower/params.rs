//! Follower parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::pid::DEFAULT_INTEGRAL_CLAMP;
use crate::profile::DEFAULT_PROFILE_RESOLUTION;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the path follower
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// X position controller proportional gain
    pub x_k_p: f64,

    /// X position controller integral gain
    pub x_k_i: f64,

    /// X position controller derivative gain
    pub x_k_d: f64,

    /// Y position controller proportional gain
    pub y_k_p: f64,

    /// Y position controller integral gain
    pub y_k_i: f64,

    /// Y position controller derivative gain
    pub y_k_d: f64,

    /// Limit on the magnitude of the position controllers' integral accumulation
    #[serde(default = "default_integral_clamp")]
    pub integral_clamp: f64,

    /// Maximum velocity along the path
    pub max_drive_velocity_ms: f64,

    /// Maximum acceleration along the path
    pub max_drive_acceleration_mss: f64,

    /// Maximum centripetal acceleration. Limits the velocity through curves to
    /// `sqrt(max_centripetal_acceleration_mss / |curvature|)`.
    pub max_centripetal_acceleration_mss: f64,

    /// Number of arc length segments used to generate motion profiles
    #[serde(default = "default_profile_resolution")]
    pub profile_resolution: usize,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn default_integral_clamp() -> f64 {
    DEFAULT_INTEGRAL_CLAMP
}

fn default_profile_resolution() -> usize {
    DEFAULT_PROFILE_RESOLUTION
}

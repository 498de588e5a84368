//! # Trajectory Executable Parameters
//!
//! This module provide parameters for the trajectory executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{drive::DriveFeedforward, pose::Pose};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajExecParams {
    /// Period of one control cycle
    pub cycle_period_s: f64,

    /// The run is abandoned if the path has not been completed after this long
    pub max_run_time_s: f64,

    /// If true each cycle sleeps until the end of its period, otherwise the simulation runs as fast
    /// as possible
    #[serde(default)]
    pub realtime: bool,

    /// If true the follower status reports are archived to CSV
    #[serde(default)]
    pub archive: bool,

    /// Initial pose of the simulated base as `[x, y, theta]`
    pub initial_pose: [f64; 3],

    /// Multiplier applied to commanded velocity by the simulated base
    #[serde(default = "default_velocity_scale")]
    pub velocity_scale: f64,

    /// Feedforward gains used to compute wheel powers
    pub feedforward: DriveFeedforward,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl TrajExecParams {
    pub fn initial_pose(&self) -> Pose {
        Pose::with_heading(
            self.initial_pose[0],
            self.initial_pose[1],
            self.initial_pose[2],
        )
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_velocity_scale() -> f64 {
    1.0
}

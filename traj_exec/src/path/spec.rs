//! Path specifications loaded from parameter files
//!
//! A path file looks like:
//!
//! ```toml
//! type = "Hermite"
//! tension = 0.0
//!
//! [[waypoints]]
//! x = 0.0
//! y = 0.0
//! tangent = [100.0, 0.0]
//!
//! [[waypoints]]
//! x = 100.0
//! y = 50.0
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::pose::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single waypoint in a path specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,

    /// Heading at the waypoint, defaults to zero
    #[serde(default)]
    pub theta: f64,

    /// Explicit tangent at the waypoint, Hermite paths only. Linear specs with a tangent are rejected
    #[serde(default)]
    pub tangent: Option<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Description of a path to be built with [`super::Path::from_path_spec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PathSpec {
    /// A polyline through the waypoints
    Linear { waypoints: Vec<Waypoint> },

    /// A cardinal spline through the waypoints
    Hermite {
        waypoints: Vec<Waypoint>,

        #[serde(default)]
        tension: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn pose(&self) -> Pose {
        Pose::with_heading(self.x, self.y, self.theta)
    }

    pub fn tangent(&self) -> Option<Vector2<f64>> {
        self.tangent.map(|t| Vector2::new(t[0], t[1]))
    }
}

//! Mecanum drive feedforward and wheel mixing
//!
//! Body frame efforts are x for strafing, y for driving forwards and omega for turning.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::pose::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Velocities with a magnitude below this do not get the static friction term.
const STATIC_VELOCITY_THRESHOLD: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Feedforward gains for one axis: `k_v * v + k_a * a + k_s * sign(v)`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedforward {
    pub k_v: f64,
    pub k_a: f64,

    #[serde(default)]
    pub k_s: f64,
}

/// Feedforward gains for each axis of the base.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveFeedforward {
    pub x: Feedforward,
    pub y: Feedforward,
    pub theta: Feedforward,
}

/// Power demands for the four wheels, each in `[-1, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct WheelPowers {
    pub left_front: f64,
    pub left_back: f64,
    pub right_front: f64,
    pub right_back: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Feedforward {
    pub fn new(k_v: f64, k_a: f64, k_s: f64) -> Self {
        Self { k_v, k_a, k_s }
    }

    /// Motor effort needed for velocity `v` and acceleration `a`.
    pub fn calculate(&self, v: f64, a: f64) -> f64 {
        let stat = if v.abs() > STATIC_VELOCITY_THRESHOLD {
            self.k_s * v.signum()
        } else {
            0.0
        };

        self.k_v * v + self.k_a * a + stat
    }
}

impl DriveFeedforward {
    /// Wheel powers for a body frame velocity and acceleration command.
    pub fn wheel_powers(&self, cmd: &Pose) -> WheelPowers {
        mecanum_powers(
            self.x.calculate(cmd.vx, cmd.ax),
            self.y.calculate(cmd.vy, cmd.ay),
            self.theta.calculate(cmd.omega, cmd.alpha),
        )
    }
}

impl WheelPowers {
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.left_front,
            self.left_back,
            self.right_front,
            self.right_back,
        ]
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Mix strafe (`x`), forward (`y`) and turn (`omega`) efforts into wheel powers.
///
/// Each power is clamped to `[-1, 1]` independently.
pub fn mecanum_powers(x: f64, y: f64, omega: f64) -> WheelPowers {
    let clamp = |p: f64| p.max(-1.0).min(1.0);

    WheelPowers {
        left_front: clamp(y + x + omega),
        left_back: clamp(y - x + omega),
        right_front: clamp(y - x - omega),
        right_back: clamp(y + x - omega),
    }
}

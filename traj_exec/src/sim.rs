//! # Simulated base
//!
//! A kinematic model of a mecanum base which acts as both the localizer and the drivetrain. The
//! last body frame command is rotated into the field frame by the current heading and integrated
//! each step. The base can be given a velocity scale to model a drivetrain which under or over
//! performs its commands.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use crate::{
    drive::{DriveFeedforward, Drivetrain, Localizer, WheelPowers},
    pose::{Pose, PoseError},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SimBase {
    /// Field frame pose of the base
    pose: Pose,

    /// Last body frame command
    cmd: Pose,

    /// Multiplier applied to commanded velocity and acceleration
    velocity_scale: f64,

    feedforward: DriveFeedforward,

    /// Wheel powers computed for the last command
    wheel_powers: WheelPowers,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimBase {
    /// Create a stationary base at the given pose.
    pub fn new(initial: Pose, feedforward: DriveFeedforward) -> Self {
        Self {
            pose: Pose {
                vx: 0.0,
                vy: 0.0,
                ax: 0.0,
                ay: 0.0,
                omega: 0.0,
                alpha: 0.0,
                ..initial
            }
            .normalize(),
            cmd: Pose::default(),
            velocity_scale: 1.0,
            feedforward,
            wheel_powers: WheelPowers::default(),
        }
    }

    pub fn with_velocity_scale(mut self, scale: f64) -> Self {
        self.velocity_scale = scale;
        self
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f64) -> Result<(), PoseError> {
        let (sin_h, cos_h) = self.pose.theta.sin_cos();
        let c = self.cmd;
        let k = self.velocity_scale;

        // Rotate the body frame command into the field frame
        let moving = Pose {
            vx: k * (c.vx * cos_h - c.vy * sin_h),
            vy: k * (c.vx * sin_h + c.vy * cos_h),
            ax: k * (c.ax * cos_h - c.ay * sin_h),
            ay: k * (c.ax * sin_h + c.ay * cos_h),
            omega: k * c.omega,
            alpha: k * c.alpha,
            ..self.pose
        };

        self.pose = moving.integrate(dt)?;

        Ok(())
    }

    pub fn wheel_powers(&self) -> WheelPowers {
        self.wheel_powers
    }
}

impl Localizer for SimBase {
    fn pose(&self) -> Pose {
        self.pose
    }
}

impl Drivetrain for SimBase {
    fn set_drive_va(&mut self, cmd: &Pose) {
        self.cmd = *cmd;
        self.wheel_powers = self.feedforward.wheel_powers(cmd);
    }

    fn stop(&mut self) {
        debug!("Simulated base stopped at {}", self.pose);

        self.cmd = Pose::default();
        self.wheel_powers = WheelPowers::default();
        self.pose = Pose {
            vx: 0.0,
            vy: 0.0,
            ax: 0.0,
            ay: 0.0,
            omega: 0.0,
            alpha: 0.0,
            ..self.pose
        };
    }
}

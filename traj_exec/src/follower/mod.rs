//! # Follower
//!
//! The follower keeps the vehicle on the active path by tracking a motion profile generated for
//! that path.
//!
//! Each call to [`Follower::update`] samples the profile at the current elapsed time to get the
//! target distance along the path, velocity and acceleration. The target distance is mapped to a
//! point on the path, and the target velocity and acceleration are projected onto the path tangent
//! (plus the centripetal acceleration needed to stay on the curve) to give a feedforward command.
//! Position error to the target point is corrected by a pair of PID controllers acting on the x
//! and y axes of the field frame. The corrected command is rotated into the body frame and given
//! to the drivetrain.
//!
//! Heading is not controlled, the command carries no angular velocity or acceleration.
//!
//! The follower is in one of three states:
//!
//! - `Idle` - no path is set. Calls to `update`, `done` and `target_state` are logged and ignored.
//! - `Following` - a path is set and the elapsed time is less than the profile duration.
//! - `Done` - the elapsed time has reached the profile duration. Updates keep commanding the end
//!   of the path so the vehicle holds position.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod pid;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, trace};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::{
    drive::{Drivetrain, Localizer},
    path::{unit_or_zero, Curve, Path},
    pose::Pose,
    profile::{MotionProfile, MotionState, ProfileError, ProfileGenerator},
};
pub use params::Params;
pub use pid::{PidController, PidError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Path follower
pub struct Follower {
    params: Params,

    /// The active path, if any
    path: Option<Path>,

    /// The profile generated for the active path
    profile: Option<MotionProfile>,

    /// Time since the current path was started
    elapsed_s: f64,

    /// Field frame x position controller
    x_ctrl: PidController,

    /// Field frame y position controller
    y_ctrl: PidController,
}

/// Status of a single update, kept flat so it can be archived.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Profile time the command was generated for
    pub elapsed_s: f64,

    /// Parameter of the target point on the path
    pub path_t: f64,

    pub target_s_m: f64,
    pub target_v_ms: f64,
    pub target_a_mss: f64,

    pub target_x_m: f64,
    pub target_y_m: f64,

    pub pose_x_m: f64,
    pub pose_y_m: f64,
    pub pose_theta_rad: f64,

    /// Field frame position error, target minus current
    pub error_x_m: f64,
    pub error_y_m: f64,

    /// Path curvature at the target, zero if undefined
    pub curvature_m: f64,

    /// PID corrections added to the feedforward velocity
    pub correction_x_ms: f64,
    pub correction_y_ms: f64,

    /// Body frame command
    pub cmd_vx_ms: f64,
    pub cmd_vy_ms: f64,
    pub cmd_ax_mss: f64,
    pub cmd_ay_mss: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The state of the follower, see the module documentation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FollowerState {
    Idle,
    Following,
    Done,
}

#[derive(Debug, thiserror::Error)]
pub enum FollowerError {
    #[error("Could not create the position controllers: {0}")]
    ControllerError(PidError),

    #[error("Could not generate a motion profile for the path: {0}")]
    ProfileError(ProfileError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Follower {
    /// Create a new idle follower.
    pub fn new(params: Params) -> Result<Self, FollowerError> {
        let make_ctrl = |k_p, k_i, k_d| {
            PidController::new(k_p, k_i, k_d)
                .and_then(|c| c.with_integral_clamp(params.integral_clamp))
                .map_err(FollowerError::ControllerError)
        };

        let x_ctrl = make_ctrl(params.x_k_p, params.x_k_i, params.x_k_d)?;
        let y_ctrl = make_ctrl(params.y_k_p, params.y_k_i, params.y_k_d)?;

        Ok(Self {
            params,
            path: None,
            profile: None,
            elapsed_s: 0.0,
            x_ctrl,
            y_ctrl,
        })
    }

    /// Set the path to follow, or clear it with `None`.
    ///
    /// Setting a path generates its motion profile and starts following it from the beginning.
    /// If the profile cannot be generated the follower is left unchanged.
    pub fn set_path(&mut self, path: Option<Path>) -> Result<(), FollowerError> {
        match path {
            Some(path) => {
                let profile = self.generate_profile(&path)?;

                info!(
                    "New path set: {:.3} m long, profile duration {:.3} s",
                    path.length(),
                    profile.duration()
                );

                self.path = Some(path);
                self.profile = Some(profile);
            }
            None => {
                if self.path.is_some() {
                    info!("Path cleared");
                }
                self.path = None;
                self.profile = None;
            }
        }

        self.start();

        Ok(())
    }

    /// Restart the current path from the beginning, clearing the controller state.
    pub fn start(&mut self) {
        self.elapsed_s = 0.0;
        self.x_ctrl.reset();
        self.y_ctrl.reset();
    }

    pub fn state(&self) -> FollowerState {
        match self.profile {
            None => FollowerState::Idle,
            Some(ref p) if self.elapsed_s >= p.duration() => FollowerState::Done,
            Some(_) => FollowerState::Following,
        }
    }

    /// Returns true once the elapsed time has reached the duration of the profile.
    ///
    /// Always false when idle.
    pub fn done(&self) -> bool {
        match self.profile {
            Some(ref p) => self.elapsed_s >= p.duration(),
            None => {
                error!("Follower has no path, cannot check if it is done");
                false
            }
        }
    }

    /// The planned state at the current elapsed time.
    pub fn target_state(&self) -> Option<MotionState> {
        match self.profile {
            Some(ref p) => Some(p.get(self.elapsed_s.min(p.duration()))),
            None => {
                error!("Follower has no path, there is no target state");
                None
            }
        }
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn profile(&self) -> Option<&MotionProfile> {
        self.profile.as_ref()
    }

    /// Run one control cycle.
    ///
    /// The command is computed for the current elapsed time, which then advances by `dt`. Returns
    /// `None` without commanding the drivetrain if no path is set.
    pub fn update<L, D>(&mut self, dt: f64, localizer: &L, drivetrain: &mut D) -> Option<StatusReport>
    where
        L: Localizer,
        D: Drivetrain,
    {
        let (path, profile) = match (&self.path, &self.profile) {
            (Some(path), Some(profile)) => (path, profile),
            _ => {
                error!("Follower has no path, update ignored");
                return None;
            }
        };

        // ---- TARGET ----

        let t_s = self.elapsed_s.min(profile.duration());
        let target = profile.get(t_s);

        let path_t = path.t_from_length(target.x);
        let path_pose = path.pose(path_t);

        // Undefined curvature is treated as straight
        let curvature = match path.curvature(path_t) {
            k if k.is_finite() => k,
            _ => 0.0,
        };

        // ---- FEEDFORWARD ----

        let tangent = unit_or_zero(path_pose.velocity());
        let normal = Vector2::new(-tangent[1], tangent[0]);

        let ff_vel = tangent * target.v;
        let ff_acc = tangent * target.a + normal * (target.v * target.v * curvature);

        // ---- FEEDBACK ----

        let current = localizer.pose();
        let error = path_pose.position() - current.position();

        let correction = Vector2::new(
            self.x_ctrl.update(error[0], dt),
            self.y_ctrl.update(error[1], dt),
        );

        // ---- COMMAND ----

        let cmd_field = Pose {
            theta: current.theta,
            ..Pose::from_vectors(Vector2::zeros(), ff_vel + correction, ff_acc)
        };
        let cmd_body = cmd_field.rotate(-current.theta);

        drivetrain.set_drive_va(&cmd_body);

        let report = StatusReport {
            elapsed_s: t_s,
            path_t,
            target_s_m: target.x,
            target_v_ms: target.v,
            target_a_mss: target.a,
            target_x_m: path_pose.x,
            target_y_m: path_pose.y,
            pose_x_m: current.x,
            pose_y_m: current.y,
            pose_theta_rad: current.theta,
            error_x_m: error[0],
            error_y_m: error[1],
            curvature_m: curvature,
            correction_x_ms: correction[0],
            correction_y_ms: correction[1],
            cmd_vx_ms: cmd_body.vx,
            cmd_vy_ms: cmd_body.vy,
            cmd_ax_mss: cmd_body.ax,
            cmd_ay_mss: cmd_body.ay,
        };

        trace!(
            "t = {:.3} s, target s = {:.3} m, v = {:.3}, error = ({:.4}, {:.4})",
            t_s,
            target.x,
            target.v,
            error[0],
            error[1]
        );

        if dt > 0.0 {
            self.elapsed_s += dt;
        }

        Some(report)
    }

    /// Generate the motion profile for a path using the curvature and drive limits.
    fn generate_profile(&self, path: &Path) -> Result<MotionProfile, FollowerError> {
        let max_vel = self.params.max_drive_velocity_ms;
        let max_acc = self.params.max_drive_acceleration_mss;
        let max_centripetal = self.params.max_centripetal_acceleration_mss;

        let velocity_constraint = |s: f64| {
            let k = path.curvature(path.t_from_length(s));
            let v = (max_centripetal / k.abs()).sqrt();

            // Zero or undefined curvature gives no limit from the curve
            if v.is_finite() {
                v.min(max_vel)
            } else {
                max_vel
            }
        };

        ProfileGenerator::new(self.params.profile_resolution)
            .generate(
                MotionState::new(0.0, 0.0, 0.0),
                MotionState::new(path.length(), 0.0, 0.0),
                velocity_constraint,
                |_| max_acc,
            )
            .map_err(FollowerError::ProfileError)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    /// Localizer and drivetrain that record the last command without moving.
    #[derive(Default)]
    struct Fixed {
        pose: Pose,
        cmd: Option<Pose>,
        stopped: bool,
    }

    impl Localizer for Fixed {
        fn pose(&self) -> Pose {
            self.pose
        }
    }

    impl Drivetrain for Fixed {
        fn set_drive_va(&mut self, cmd: &Pose) {
            self.cmd = Some(*cmd);
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    fn params() -> Params {
        Params {
            x_k_p: 1.0,
            x_k_i: 0.0,
            x_k_d: 0.0,
            y_k_p: 1.0,
            y_k_i: 0.0,
            y_k_d: 0.0,
            integral_clamp: 1.0,
            max_drive_velocity_ms: 50.0,
            max_drive_acceleration_mss: 25.0,
            max_centripetal_acceleration_mss: 100.0,
            profile_resolution: 500,
        }
    }

    fn straight(length: f64) -> Path {
        Path::linear(&[Pose::new(0.0, 0.0), Pose::new(length, 0.0)]).unwrap()
    }

    #[test]
    fn test_idle() {
        let mut follower = Follower::new(params()).unwrap();
        let loc = Fixed::default();
        let mut drive = Fixed::default();

        assert_eq!(follower.state(), FollowerState::Idle);
        assert!(!follower.done());
        assert!(follower.target_state().is_none());
        assert!(follower.update(0.1, &loc, &mut drive).is_none());
        assert!(drive.cmd.is_none());
        assert_eq!(follower.elapsed_s(), 0.0);
    }

    #[test]
    fn test_state_transitions() {
        let mut follower = Follower::new(params()).unwrap();
        let loc = Fixed::default();
        let mut drive = Fixed::default();

        follower.set_path(Some(straight(100.0))).unwrap();
        assert_eq!(follower.state(), FollowerState::Following);

        let duration = follower.profile().unwrap().duration();
        let mut n = 0;
        while !follower.done() {
            assert!(follower.elapsed_s() < duration);
            follower.update(0.05, &loc, &mut drive).unwrap();
            n += 1;
            assert!(n < 10_000);
        }
        assert_eq!(follower.state(), FollowerState::Done);
        assert!(follower.elapsed_s() >= duration);

        // Restarting keeps the path
        follower.start();
        assert_eq!(follower.state(), FollowerState::Following);
        assert_eq!(follower.elapsed_s(), 0.0);

        // Clearing the path returns to idle
        follower.set_path(None).unwrap();
        assert_eq!(follower.state(), FollowerState::Idle);
        assert!(follower.path().is_none());
    }

    #[test]
    fn test_duration_lower_bound() {
        // A trapezoid limited by max_v and max_a is the fastest possible profile
        let (max_v, max_a, length) = (50.0, 25.0, 100.0);
        let mut follower = Follower::new(params()).unwrap();
        follower.set_path(Some(straight(length))).unwrap();

        let bound = max_v / max_a + (length - max_v * max_v / max_a) / max_v;
        assert!(follower.profile().unwrap().duration() >= bound);
    }

    #[test]
    fn test_feedforward_command() {
        let mut follower = Follower::new(params()).unwrap();
        follower.set_path(Some(straight(100.0))).unwrap();

        let mut drive = Fixed::default();

        // Vehicle at the start of the path with a heading of 90 degrees
        let loc = Fixed {
            pose: Pose::with_heading(0.0, 0.0, FRAC_PI_2),
            ..Default::default()
        };

        // Step to one second in, where the vehicle is accelerating at 25
        follower.update(1.0, &loc, &mut drive).unwrap();
        let report = follower.update(0.1, &loc, &mut drive).unwrap();

        assert!((report.target_v_ms - 25.0).abs() < 1e-3);
        assert!((report.target_a_mss - 25.0).abs() < 1e-6);
        assert!(report.error_y_m.abs() < 1e-9);
        assert!(report.error_x_m > 0.0);

        // Field frame command is along +x, which is the body frame -y axis
        let cmd = drive.cmd.unwrap();
        assert!(cmd.vx.abs() < 1e-9);
        assert!(cmd.vy < -25.0);
        assert!((cmd.ay + 25.0).abs() < 1e-6);
        assert_eq!(cmd.omega, 0.0);
        assert_eq!(cmd.alpha, 0.0);
    }

    #[test]
    fn test_centripetal_term() {
        // Quarter circle anticlockwise, so the centripetal acceleration points left of travel
        let k = 4.0 / 3.0 * (2f64.sqrt() - 1.0) * 3.0 * 10.0;
        let path = Path::hermite(
            &[Pose::new(10.0, 0.0), Pose::new(0.0, 10.0)],
            &[Some(Vector2::new(0.0, k)), Some(Vector2::new(-k, 0.0))],
            0.0,
        )
        .unwrap();

        let mut follower = Follower::new(params()).unwrap();
        follower.set_path(Some(path)).unwrap();

        let loc = Fixed::default();
        let mut drive = Fixed::default();

        // Advance to the middle of the path where the tangent points to (-1, 1)
        let half = follower.profile().unwrap().duration() / 2.0;
        follower.update(half, &loc, &mut drive).unwrap();
        let report = follower.update(0.0, &loc, &mut drive).unwrap();

        assert!(report.curvature_m > 0.0);
        assert!(report.target_v_ms > 0.0);

        // The component of acceleration towards the centre of the circle at the origin is the
        // centripetal acceleration v^2 k
        let acc = Vector2::new(report.cmd_ax_mss, report.cmd_ay_mss);
        let to_centre = Vector2::new(-report.target_x_m, -report.target_y_m).normalize();
        let centripetal = report.target_v_ms.powi(2) * report.curvature_m;
        assert!((acc.dot(&to_centre) - centripetal).abs() < 0.05 * centripetal);
    }

    #[test]
    fn test_profile_respects_curvature_limit() {
        let p = Params {
            max_centripetal_acceleration_mss: 196.0,
            ..params()
        };
        let (max_v, max_c) = (p.max_drive_velocity_ms, p.max_centripetal_acceleration_mss);

        let path = Path::hermite(
            &[
                Pose::new(0.0, 0.0),
                Pose::new(30.0, 30.0),
                Pose::new(60.0, 0.0),
                Pose::new(60.0, 40.0),
            ],
            &[],
            0.0,
        )
        .unwrap();

        let mut follower = Follower::new(p).unwrap();
        follower.set_path(Some(path.clone())).unwrap();
        let profile = follower.profile().unwrap();

        let limit = |s: f64| {
            let k = path.curvature(path.t_from_length(s)).abs();
            (max_c / k).sqrt().min(max_v)
        };

        let n = 100_000;
        for i in 0..=n {
            let state = profile.get(profile.duration() * i as f64 / n as f64);
            let v_max = limit(state.x);
            assert!(
                state.v <= v_max * (1.0 + 1e-3) + 1e-9,
                "v = {} exceeds {} at s = {}",
                state.v,
                v_max,
                state.x
            );
        }
    }

    #[test]
    fn test_invalid_params() {
        let mut p = params();
        p.x_k_p = -1.0;
        assert!(matches!(
            Follower::new(p),
            Err(FollowerError::ControllerError(_))
        ));

        let mut p = params();
        p.max_centripetal_acceleration_mss = 0.0;
        let mut follower = Follower::new(p).unwrap();
        let curved = Path::hermite(
            &[Pose::new(0.0, 0.0), Pose::new(10.0, 10.0), Pose::new(20.0, 0.0)],
            &[],
            0.0,
        )
        .unwrap();

        assert!(matches!(
            follower.set_path(Some(curved)),
            Err(FollowerError::ProfileError(_))
        ));
        assert_eq!(follower.state(), FollowerState::Idle);
    }
}

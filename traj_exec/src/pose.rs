//! # Pose
//!
//! A planar kinematic state: position, velocity and acceleration in x and y, plus heading, angular
//! velocity and angular acceleration. Poses are small `Copy` values and are never mutated in
//! place, every operation returns a new pose.
//!
//! Linear arithmetic acts component-wise and always re-wraps the heading into (-pi, pi].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, Mul, Neg, Sub},
};

// Internal
use util::maths::normalize_radians;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default position tolerance used by [`Pose::roughly_equals`].
pub const DEFAULT_POSITION_TOLERANCE_M: f64 = 0.01;

/// Default heading tolerance used by [`Pose::roughly_equals`].
pub const DEFAULT_ANGLE_TOLERANCE_RAD: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planar pose with motion derivatives.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position
    pub x: f64,
    pub y: f64,

    /// Velocity
    pub vx: f64,
    pub vy: f64,

    /// Acceleration
    pub ax: f64,
    pub ay: f64,

    /// Heading in radians, in the range (-pi, pi]
    pub theta: f64,

    /// Angular velocity
    pub omega: f64,

    /// Angular acceleration
    pub alpha: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PoseError {
    #[error("Cannot divide a pose by zero")]
    DivideByZero,

    #[error("Integration step must be finite, found {0}")]
    NonFiniteStep(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// A stationary pose at the given position with zero heading.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// A stationary pose at the given position and heading.
    pub fn with_heading(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalize_radians(theta),
            ..Default::default()
        }
    }

    /// A pose built from position, velocity and acceleration vectors.
    pub fn from_vectors(
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        acceleration: Vector2<f64>,
    ) -> Self {
        Self {
            x: position[0],
            y: position[1],
            vx: velocity[0],
            vy: velocity[1],
            ax: acceleration[0],
            ay: acceleration[1],
            ..Default::default()
        }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Vector2<f64> {
        Vector2::new(self.vx, self.vy)
    }

    pub fn acceleration(&self) -> Vector2<f64> {
        Vector2::new(self.ax, self.ay)
    }

    /// Return a copy of this pose with the heading wrapped into (-pi, pi].
    pub fn normalize(&self) -> Self {
        Self {
            theta: normalize_radians(self.theta),
            ..*self
        }
    }

    /// Step the pose forward by `dt` assuming constant linear and angular acceleration.
    pub fn integrate(&self, dt: f64) -> Result<Self, PoseError> {
        if !dt.is_finite() {
            return Err(PoseError::NonFiniteStep(dt));
        }

        let dt2 = dt * dt;

        Ok(Self {
            x: self.x + self.vx * dt + 0.5 * self.ax * dt2,
            y: self.y + self.vy * dt + 0.5 * self.ay * dt2,
            vx: self.vx + self.ax * dt,
            vy: self.vy + self.ay * dt,
            theta: normalize_radians(self.theta + self.omega * dt + 0.5 * self.alpha * dt2),
            omega: self.omega + self.alpha * dt,
            ..*self
        })
    }

    /// The time derivative of this pose, assuming constant acceleration terms.
    pub fn derivative(&self) -> Self {
        Self {
            x: self.vx,
            y: self.vy,
            vx: self.ax,
            vy: self.ay,
            ax: 0.0,
            ay: 0.0,
            theta: normalize_radians(self.omega),
            omega: self.alpha,
            alpha: 0.0,
        }
    }

    /// Magnitude of the position vector.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle of the vector from this position to the other position.
    pub fn angle_to(&self, other: &Pose) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Returns true if the positions are within `position_tol_m` and the headings are within
    /// `angle_tol_rad` of each other.
    pub fn roughly_equals(&self, other: &Pose, position_tol_m: f64, angle_tol_rad: f64) -> bool {
        self.distance_to(other) < position_tol_m
            && normalize_radians(self.theta - other.theta).abs() < angle_tol_rad
    }

    /// Rotate the pose about the origin.
    pub fn rotate(&self, angle_rad: f64) -> Self {
        self.rotate_about(angle_rad, &Pose::default())
    }

    /// Rotate the pose about the position of `origin`.
    ///
    /// Velocity and acceleration vectors are rotated with the position and the angle is added to
    /// the heading.
    pub fn rotate_about(&self, angle_rad: f64, origin: &Pose) -> Self {
        let (sin_a, cos_a) = angle_rad.sin_cos();
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;

        Self {
            x: origin.x + dx * cos_a - dy * sin_a,
            y: origin.y + dx * sin_a + dy * cos_a,
            vx: self.vx * cos_a - self.vy * sin_a,
            vy: self.vx * sin_a + self.vy * cos_a,
            ax: self.ax * cos_a - self.ay * sin_a,
            ay: self.ax * sin_a + self.ay * cos_a,
            theta: normalize_radians(self.theta + angle_rad),
            ..*self
        }
    }

    /// Divide every component by `s`.
    pub fn try_div(&self, s: f64) -> Result<Self, PoseError> {
        if s == 0.0 {
            return Err(PoseError::DivideByZero);
        }

        Ok(self.map(|c| c / s))
    }

    /// Format the position as a Desmos point for quick plotting.
    pub fn to_desmos_string(&self) -> String {
        format!("({:.3}, {:.3})", self.x, self.y)
    }

    /// Apply `f` to every component, wrapping the resulting heading.
    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            x: f(self.x),
            y: f(self.y),
            vx: f(self.vx),
            vy: f(self.vy),
            ax: f(self.ax),
            ay: f(self.ay),
            theta: normalize_radians(f(self.theta)),
            omega: f(self.omega),
            alpha: f(self.alpha),
        }
    }

    /// Combine two poses component-wise, wrapping the resulting heading.
    fn zip<F: Fn(f64, f64) -> f64>(&self, other: &Pose, f: F) -> Self {
        Self {
            x: f(self.x, other.x),
            y: f(self.y, other.y),
            vx: f(self.vx, other.vx),
            vy: f(self.vy, other.vy),
            ax: f(self.ax, other.ax),
            ay: f(self.ay, other.ay),
            theta: normalize_radians(f(self.theta, other.theta)),
            omega: f(self.omega, other.omega),
            alpha: f(self.alpha, other.alpha),
        }
    }
}

impl Add for Pose {
    type Output = Pose;

    fn add(self, rhs: Pose) -> Pose {
        self.zip(&rhs, |a, b| a + b)
    }
}

impl Sub for Pose {
    type Output = Pose;

    fn sub(self, rhs: Pose) -> Pose {
        self.zip(&rhs, |a, b| a - b)
    }
}

impl Mul<f64> for Pose {
    type Output = Pose;

    fn mul(self, rhs: f64) -> Pose {
        self.map(|c| c * rhs)
    }
}

impl Neg for Pose {
    type Output = Pose;

    fn neg(self) -> Pose {
        self.map(|c| -c)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pose(x={:.3}, y={:.3}, vx={:.3}, vy={:.3}, ax={:.3}, ay={:.3}, θ={:.3}, ω={:.3}, α={:.3})",
            self.x,
            self.y,
            self.vx,
            self.vy,
            self.ax,
            self.ay,
            normalize_radians(self.theta),
            self.omega,
            self.alpha
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_arithmetic_wraps_heading() {
        let a = Pose::with_heading(1.0, 2.0, 3.0);
        let b = Pose::with_heading(0.5, -1.0, 1.0);

        let sum = a + b;
        assert!((sum.x - 1.5).abs() < EPS);
        assert!((sum.y - 1.0).abs() < EPS);
        assert!((sum.theta - (4.0 - 2.0 * PI)).abs() < EPS);

        let diff = b - a;
        assert!((diff.theta - (-2.0)).abs() < EPS);

        let scaled = a * 2.0;
        assert!((scaled.x - 2.0).abs() < EPS);
        assert!((scaled.theta - (6.0 - 2.0 * PI)).abs() < EPS);

        let neg = -Pose::with_heading(1.0, 1.0, PI);
        assert!((neg.x + 1.0).abs() < EPS);
        assert!((neg.theta - PI).abs() < EPS);
    }

    #[test]
    fn test_try_div() {
        let p = Pose::new(4.0, -2.0);
        let half = p.try_div(2.0).unwrap();
        assert!((half.x - 2.0).abs() < EPS);
        assert!((half.y + 1.0).abs() < EPS);

        assert_eq!(p.try_div(0.0), Err(PoseError::DivideByZero));
    }

    #[test]
    fn test_rotate() {
        let p = Pose {
            x: 1.0,
            vx: 2.0,
            ay: 1.0,
            ..Default::default()
        };
        let r = p.rotate(FRAC_PI_2);

        assert!(r.x.abs() < EPS);
        assert!((r.y - 1.0).abs() < EPS);
        assert!(r.vx.abs() < EPS);
        assert!((r.vy - 2.0).abs() < EPS);
        assert!((r.ax + 1.0).abs() < EPS);
        assert!(r.ay.abs() < EPS);
        assert!((r.theta - FRAC_PI_2).abs() < EPS);

        // About a non-zero origin
        let r = Pose::new(2.0, 1.0).rotate_about(PI, &Pose::new(1.0, 1.0));
        assert!(r.x.abs() < EPS);
        assert!((r.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_integrate() {
        let p = Pose {
            vx: 1.0,
            ax: 2.0,
            omega: 1.0,
            ..Default::default()
        };
        let q = p.integrate(0.5).unwrap();

        assert!((q.x - 0.75).abs() < EPS);
        assert!((q.vx - 2.0).abs() < EPS);
        assert!((q.theta - 0.5).abs() < EPS);

        assert!(p.integrate(std::f64::NAN).is_err());
    }

    #[test]
    fn test_metrics() {
        let a = Pose::new(0.0, 0.0);
        let b = Pose::new(3.0, 4.0);

        assert!((b.length() - 5.0).abs() < EPS);
        assert!((a.distance_to(&b) - 5.0).abs() < EPS);
        assert!((Pose::new(1.0, 1.0).angle_to(&Pose::new(1.0, 2.0)) - FRAC_PI_2).abs() < EPS);

        let c = Pose::with_heading(3.001, 4.0, PI - 1e-4);
        let d = Pose::with_heading(3.0, 4.0, -PI + 1e-4);
        assert!(c.roughly_equals(&d, DEFAULT_POSITION_TOLERANCE_M, DEFAULT_ANGLE_TOLERANCE_RAD));
        assert!(!a.roughly_equals(&b, DEFAULT_POSITION_TOLERANCE_M, DEFAULT_ANGLE_TOLERANCE_RAD));
    }

    #[test]
    fn test_derivative() {
        let p = Pose {
            x: 5.0,
            vx: 1.0,
            vy: 2.0,
            ax: 3.0,
            omega: 0.5,
            alpha: 0.25,
            ..Default::default()
        };
        let d = p.derivative();

        assert_eq!(d.x, 1.0);
        assert_eq!(d.y, 2.0);
        assert_eq!(d.vx, 3.0);
        assert_eq!(d.ax, 0.0);
        assert_eq!(d.theta, 0.5);
        assert_eq!(d.omega, 0.25);
    }
}

//! Cubic Hermite paths

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

use super::{CompoundPath, Curve};
use crate::{poly::Polynomial, pose::Pose};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of straight segments used to approximate a Hermite path when measuring arc length.
pub const DEFAULT_RESOLUTION: usize = 100;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A cubic Hermite curve from `start` to `end` with the given end tangents.
///
/// `point(t) = h00(t) p0 + h10(t) v0 + h01(t) p1 + h11(t) v1`
///
/// Arc length queries are answered from a polyline approximation sampled evenly in `t`.
#[derive(Debug, Clone, Serialize)]
pub struct HermitePath {
    start: Pose,
    end: Pose,
    start_tangent: [f64; 2],
    end_tangent: [f64; 2],

    #[serde(skip)]
    x_poly: Polynomial,

    #[serde(skip)]
    y_poly: Polynomial,

    #[serde(skip)]
    approx: CompoundPath,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HermitePath {
    /// Create a new Hermite path with the default arc length resolution.
    pub fn new(
        start: Pose,
        end: Pose,
        start_tangent: Vector2<f64>,
        end_tangent: Vector2<f64>,
    ) -> Self {
        Self::with_resolution(start, end, start_tangent, end_tangent, DEFAULT_RESOLUTION)
    }

    /// Create a new Hermite path approximated by `resolution` straight segments.
    ///
    /// A resolution of zero is treated as one.
    pub fn with_resolution(
        start: Pose,
        end: Pose,
        start_tangent: Vector2<f64>,
        end_tangent: Vector2<f64>,
        resolution: usize,
    ) -> Self {
        let h00 = Polynomial::new(vec![1.0, 0.0, -3.0, 2.0]);
        let h10 = Polynomial::new(vec![0.0, 1.0, -2.0, 1.0]);
        let h01 = Polynomial::new(vec![0.0, 0.0, 3.0, -2.0]);
        let h11 = Polynomial::new(vec![0.0, 0.0, -1.0, 1.0]);

        let combine = |p0: f64, v0: f64, p1: f64, v1: f64| {
            Polynomial::add(&[
                h00.v_scale(p0),
                h10.v_scale(v0),
                h01.v_scale(p1),
                h11.v_scale(v1),
            ])
        };

        let x_poly = combine(start.x, start_tangent[0], end.x, end_tangent[0]);
        let y_poly = combine(start.y, start_tangent[1], end.y, end_tangent[1]);

        let samples: Vec<Pose> = util::maths::linspace(0.0, 1.0, resolution.max(1) + 1)
            .into_iter()
            .map(|t| Pose::new(x_poly.eval(t), y_poly.eval(t)))
            .collect();

        Self {
            start,
            end,
            start_tangent: [start_tangent[0], start_tangent[1]],
            end_tangent: [end_tangent[0], end_tangent[1]],
            x_poly,
            y_poly,
            approx: CompoundPath::polyline(&samples),
        }
    }

    fn derivative(&self, t: f64) -> Vector2<f64> {
        Vector2::new(self.x_poly.der_eval(t), self.y_poly.der_eval(t))
    }

    fn second_derivative_at(&self, t: f64) -> Vector2<f64> {
        Vector2::new(self.x_poly.n_der_eval(t, 2), self.y_poly.n_der_eval(t, 2))
    }
}

impl Curve for HermitePath {
    fn start_pose(&self) -> Pose {
        self.start
    }

    fn end_pose(&self) -> Pose {
        self.end
    }

    fn length(&self) -> f64 {
        self.approx.length()
    }

    fn point(&self, t: f64) -> Pose {
        Pose::with_heading(self.x_poly.eval(t), self.y_poly.eval(t), self.heading(t))
    }

    fn pose(&self, t: f64) -> Pose {
        let mut pose = Pose::from_vectors(
            Vector2::new(self.x_poly.eval(t), self.y_poly.eval(t)),
            self.derivative(t),
            self.second_derivative_at(t),
        );
        pose.theta = self.heading(t);

        pose
    }

    /// `(x' y'' - y' x'') / (x'^2 + y'^2)^(3/2)`, non-finite where the tangent vanishes.
    fn curvature(&self, t: f64) -> f64 {
        let d = self.derivative(t);
        let dd = self.second_derivative_at(t);

        (d[0] * dd[1] - d[1] * dd[0]) / d.norm_squared().powf(1.5)
    }

    fn length_so_far(&self, t: f64) -> f64 {
        self.approx.length_so_far(t)
    }

    fn t_from_length(&self, length: f64) -> f64 {
        self.approx.t_from_length(length)
    }

    fn closest_point_t(&self, position: &Pose) -> f64 {
        self.approx.closest_point_t(position)
    }

    /// Direction of travel, or the start heading where the tangent vanishes.
    fn heading(&self, t: f64) -> f64 {
        let d = self.derivative(t);

        if d.norm_squared() > 0.0 {
            d[1].atan2(d[0])
        } else {
            self.start.theta
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn s_curve() -> HermitePath {
        HermitePath::new(
            Pose::new(0.0, 0.0),
            Pose::new(100.0, 50.0),
            Vector2::new(100.0, 0.0),
            Vector2::new(100.0, 0.0),
        )
    }

    #[test]
    fn test_endpoints_and_tangents() {
        let path = s_curve();

        let p0 = path.pose(0.0);
        let p1 = path.pose(1.0);

        assert!(p0.x.abs() < EPS && p0.y.abs() < EPS);
        assert!((p1.x - 100.0).abs() < EPS && (p1.y - 50.0).abs() < EPS);

        assert!((p0.vx - 100.0).abs() < EPS && p0.vy.abs() < EPS);
        assert!((p1.vx - 100.0).abs() < EPS && p1.vy.abs() < EPS);

        // Heading follows the tangent
        assert!(path.heading(0.0).abs() < EPS);
        assert!(path.heading(0.5) > 0.0);
    }

    #[test]
    fn test_length_bounds() {
        let path = s_curve();
        let chord = 100f64.hypot(50.0);

        assert!(path.length() >= chord);
        assert!(path.length() < 1.5 * chord);

        // A finer approximation converges from below
        let fine = HermitePath::with_resolution(
            Pose::new(0.0, 0.0),
            Pose::new(100.0, 50.0),
            Vector2::new(100.0, 0.0),
            Vector2::new(100.0, 0.0),
            1000,
        );
        assert!(fine.length() >= path.length() - EPS);
        assert!(fine.length() - path.length() < 0.1);
    }

    #[test]
    fn test_curvature_sign() {
        let path = s_curve();

        // Turns left first then right to finish level
        assert!(path.curvature(0.1) > 0.0);
        assert!(path.curvature(0.9) < 0.0);
        assert!(path.curvature(0.5).abs() < 1e-6);
    }

    #[test]
    fn test_quarter_circle_curvature() {
        // Hermite approximation of a quarter circle of radius 10
        let k = 4.0 / 3.0 * (2f64.sqrt() - 1.0) * 3.0;
        let path = HermitePath::new(
            Pose::new(10.0, 0.0),
            Pose::new(0.0, 10.0),
            Vector2::new(0.0, 10.0 * k),
            Vector2::new(-10.0 * k, 0.0),
        );

        let c = path.curvature(0.5);
        assert!((c - 0.1).abs() < 0.01, "curvature {}", c);
        assert!((path.heading(0.0) - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_zero_tangents() {
        let path = HermitePath::new(
            Pose::with_heading(0.0, 0.0, 0.3),
            Pose::new(10.0, 0.0),
            Vector2::zeros(),
            Vector2::zeros(),
        );

        assert!(!path.curvature(0.0).is_finite());
        assert!((path.heading(0.0) - 0.3).abs() < EPS);
        assert!((path.length() - 10.0).abs() < 1e-6);
    }
}

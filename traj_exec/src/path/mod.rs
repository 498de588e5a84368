//! # Path
//!
//! This module defines the geometric paths followed by the vehicle.
//!
//! All paths are parameterised by `t` in `[0, 1]`, with `point(0)` at the start pose and
//! `point(1)` at the end pose. Arc length grows monotonically with `t`, so `length_so_far` and
//! `t_from_length` convert between the two parameterisations. Three kinds of path exist:
//!
//! - [`LinearPath`] - a straight segment between two poses.
//! - [`HermitePath`] - a cubic Hermite curve between two poses with given end tangents.
//! - [`CompoundPath`] - a sequence of connected paths presented as a single path, with `t`
//!   split evenly between the sub-paths.
//!
//! Paths are immutable once built.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod compound;
mod hermite;
mod linear;
mod spec;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::pose::Pose;
pub use compound::CompoundPath;
pub use hermite::{HermitePath, DEFAULT_RESOLUTION};
pub use linear::LinearPath;
pub use spec::{PathSpec, Waypoint};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Queries shared by every kind of path.
pub trait Curve {
    /// The pose at the start of the path.
    fn start_pose(&self) -> Pose;

    /// The pose at the end of the path.
    fn end_pose(&self) -> Pose;

    /// The arc length of the path.
    fn length(&self) -> f64;

    /// The point (position and heading) at parameter `t`.
    fn point(&self, t: f64) -> Pose;

    /// The point at parameter `t` with the first derivative with respect to `t` in the velocity
    /// components and the second derivative in the acceleration components.
    fn pose(&self, t: f64) -> Pose;

    /// Signed curvature at `t`, positive when turning left.
    ///
    /// May be non-finite where the first derivative vanishes, callers must treat such values as
    /// straight.
    fn curvature(&self, t: f64) -> f64;

    /// Arc length from the start of the path to `t`.
    fn length_so_far(&self, t: f64) -> f64;

    /// The parameter at which the given arc length is reached.
    fn t_from_length(&self, length: f64) -> f64;

    /// The parameter of the point on the path closest to `position`.
    fn closest_point_t(&self, position: &Pose) -> f64;

    /// The heading associated with the path at `t`.
    fn heading(&self, t: f64) -> f64;

    /// First derivative of the position with respect to `t`.
    fn tangent(&self, t: f64) -> Vector2<f64> {
        self.pose(t).velocity()
    }

    /// Second derivative of the position with respect to `t`.
    fn second_derivative(&self, t: f64) -> Vector2<f64> {
        self.pose(t).acceleration()
    }

    /// Unit normal pointing to the left of the direction of travel.
    ///
    /// Zero where the tangent vanishes.
    fn normal(&self, t: f64) -> Vector2<f64> {
        let unit = unit_or_zero(self.tangent(t));
        Vector2::new(-unit[1], unit[0])
    }

    /// The point on the path closest to `position`.
    fn closest_point(&self, position: &Pose) -> Pose {
        self.point(self.closest_point_t(position))
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Any path that can be followed.
#[derive(Debug, Clone, Serialize)]
pub enum Path {
    Linear(LinearPath),
    Hermite(HermitePath),
    Compound(CompoundPath),
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while constructing paths.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PathError {
    #[error("At least two waypoints are required to build a path, found {0}")]
    TooFewWaypoints(usize),

    #[error("Tension must be in the range [0, 1], found {0}")]
    InvalidTension(f64),

    #[error(
        "Paths are not connected end-to-end, path {index} ends at {end:?} but the next starts at \
         {start:?}"
    )]
    Disconnected {
        index: usize,
        end: (f64, f64),
        start: (f64, f64),
    },

    #[error("Attempted to build a compound path from an empty list of paths")]
    EmptyCompound,

    #[error("Expected either no tangents or one per waypoint ({waypoints}), found {tangents}")]
    TangentCountMismatch { waypoints: usize, tangents: usize },

    #[error("Waypoint {0} of a linear path has a tangent, tangents are only used by Hermite paths")]
    UnexpectedTangent(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Build a polyline through the waypoints.
    ///
    /// Two waypoints give a single [`LinearPath`], more give a [`CompoundPath`] of linear
    /// segments.
    pub fn linear(waypoints: &[Pose]) -> Result<Self, PathError> {
        match waypoints.len() {
            n if n < 2 => Err(PathError::TooFewWaypoints(n)),
            2 => Ok(Path::Linear(LinearPath::new(waypoints[0], waypoints[1]))),
            _ => {
                let segments = waypoints
                    .windows(2)
                    .map(|w| Path::Linear(LinearPath::new(w[0], w[1])))
                    .collect();
                Ok(Path::Compound(CompoundPath::new(segments)?))
            }
        }
    }

    /// Build a cardinal spline through the waypoints.
    ///
    /// `tangents` is either empty or holds one optional tangent per waypoint. Waypoints without an
    /// explicit tangent use the cardinal spline default scaled by `1 - tension`:
    ///
    /// - interior waypoints: `(next - prev) * (1 - tension) / 2`
    /// - end waypoints: `(adjacent - end) * (1 - tension)`, pointing along the path
    ///
    /// Two waypoints give a single [`HermitePath`], more give a [`CompoundPath`] of Hermite
    /// segments.
    pub fn hermite(
        waypoints: &[Pose],
        tangents: &[Option<Vector2<f64>>],
        tension: f64,
    ) -> Result<Self, PathError> {
        if !(0.0..=1.0).contains(&tension) {
            return Err(PathError::InvalidTension(tension));
        }

        let n = waypoints.len();
        if n < 2 {
            return Err(PathError::TooFewWaypoints(n));
        }

        if !tangents.is_empty() && tangents.len() != n {
            return Err(PathError::TangentCountMismatch {
                waypoints: n,
                tangents: tangents.len(),
            });
        }

        let explicit = |i: usize| tangents.get(i).copied().flatten();
        let scale = 1.0 - tension;
        let pos = |i: usize| waypoints[i].position();

        if n == 2 {
            let default = (pos(1) - pos(0)) * scale;
            return Ok(Path::Hermite(HermitePath::new(
                waypoints[0],
                waypoints[1],
                explicit(0).unwrap_or(default),
                explicit(1).unwrap_or(default),
            )));
        }

        let segments = (0..n - 1)
            .map(|i| {
                let default_start = if i > 0 {
                    (pos(i + 1) - pos(i - 1)) * scale * 0.5
                } else {
                    (pos(i + 1) - pos(i)) * scale
                };
                let default_end = if i < n - 2 {
                    (pos(i + 2) - pos(i)) * scale * 0.5
                } else {
                    (pos(i + 1) - pos(i)) * scale
                };

                Path::Hermite(HermitePath::new(
                    waypoints[i],
                    waypoints[i + 1],
                    explicit(i).unwrap_or(default_start),
                    explicit(i + 1).unwrap_or(default_end),
                ))
            })
            .collect();

        Ok(Path::Compound(CompoundPath::new(segments)?))
    }

    /// Join a list of connected paths into one.
    pub fn compound(paths: Vec<Path>) -> Result<Self, PathError> {
        Ok(Path::Compound(CompoundPath::new(paths)?))
    }

    /// Build a path from its specification.
    pub fn from_path_spec(spec: &PathSpec) -> Result<Self, PathError> {
        match spec {
            PathSpec::Linear { waypoints } => {
                if let Some(index) = waypoints.iter().position(|w| w.tangent.is_some()) {
                    return Err(PathError::UnexpectedTangent(index));
                }

                let poses: Vec<Pose> = waypoints.iter().map(Waypoint::pose).collect();
                Self::linear(&poses)
            }
            PathSpec::Hermite { waypoints, tension } => {
                let poses: Vec<Pose> = waypoints.iter().map(Waypoint::pose).collect();
                let tangents: Vec<Option<Vector2<f64>>> =
                    waypoints.iter().map(Waypoint::tangent).collect();
                Self::hermite(&poses, &tangents, *tension)
            }
        }
    }

    /// Sample `num` points evenly spaced in `t` along the path.
    pub fn sample(&self, num: usize) -> Vec<Pose> {
        util::maths::linspace(0.0, 1.0, num)
            .into_iter()
            .map(|t| self.point(t))
            .collect()
    }

    /// Get the underlying path as a trait object.
    fn inner(&self) -> &dyn Curve {
        match self {
            Path::Linear(p) => p,
            Path::Hermite(p) => p,
            Path::Compound(p) => p,
        }
    }
}

impl Curve for Path {
    fn start_pose(&self) -> Pose {
        self.inner().start_pose()
    }

    fn end_pose(&self) -> Pose {
        self.inner().end_pose()
    }

    fn length(&self) -> f64 {
        self.inner().length()
    }

    fn point(&self, t: f64) -> Pose {
        self.inner().point(t)
    }

    fn pose(&self, t: f64) -> Pose {
        self.inner().pose(t)
    }

    fn curvature(&self, t: f64) -> f64 {
        self.inner().curvature(t)
    }

    fn length_so_far(&self, t: f64) -> f64 {
        self.inner().length_so_far(t)
    }

    fn t_from_length(&self, length: f64) -> f64 {
        self.inner().t_from_length(length)
    }

    fn closest_point_t(&self, position: &Pose) -> f64 {
        self.inner().closest_point_t(position)
    }

    fn heading(&self, t: f64) -> f64 {
        self.inner().heading(t)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Normalise the vector, returning zero if it has no length.
pub(crate) fn unit_or_zero(v: Vector2<f64>) -> Vector2<f64> {
    let norm = v.norm();
    if norm > std::f64::EPSILON {
        v / norm
    } else {
        Vector2::zeros()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-9;

    fn all_kinds() -> Vec<Path> {
        let square = [
            Pose::new(0.0, 0.0),
            Pose::new(10.0, 0.0),
            Pose::new(10.0, 10.0),
            Pose::new(0.0, 10.0),
        ];

        vec![
            Path::linear(&square[..2]).unwrap(),
            Path::linear(&square).unwrap(),
            Path::hermite(&square[..2], &[], 0.0).unwrap(),
            Path::hermite(&square, &[], 0.5).unwrap(),
        ]
    }

    #[test]
    fn test_endpoint_interpolation() {
        for path in all_kinds() {
            let start = path.point(0.0);
            let end = path.point(1.0);

            assert!((start.x - path.start_pose().x).abs() < EPS);
            assert!((start.y - path.start_pose().y).abs() < EPS);
            assert!((end.x - path.end_pose().x).abs() < EPS);
            assert!((end.y - path.end_pose().y).abs() < EPS);
        }
    }

    #[test]
    fn test_arc_length_round_trip() {
        for path in all_kinds() {
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let s = path.length_so_far(t);
                let t_back = path.t_from_length(s);
                assert!(
                    (t_back - t).abs() < 1e-6,
                    "{:?}: t = {}, s = {}, t_back = {}",
                    path,
                    t,
                    s,
                    t_back
                );
            }
        }
    }

    #[test]
    fn test_length_monotonic() {
        for path in all_kinds() {
            let mut prev = 0.0;
            for i in 0..=100 {
                let s = path.length_so_far(i as f64 / 100.0);
                assert!(s >= prev - EPS);
                prev = s;
            }
            assert!((prev - path.length()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_builders_reject_bad_input() {
        let one = [Pose::new(0.0, 0.0)];
        let two = [Pose::new(0.0, 0.0), Pose::new(1.0, 0.0)];

        assert_eq!(Path::linear(&one).unwrap_err(), PathError::TooFewWaypoints(1));
        assert_eq!(Path::linear(&[]).unwrap_err(), PathError::TooFewWaypoints(0));
        assert_eq!(
            Path::hermite(&one, &[], 0.0).unwrap_err(),
            PathError::TooFewWaypoints(1)
        );
        assert_eq!(
            Path::hermite(&two, &[], 1.5).unwrap_err(),
            PathError::InvalidTension(1.5)
        );
        assert_eq!(
            Path::hermite(&two, &[], -0.1).unwrap_err(),
            PathError::InvalidTension(-0.1)
        );
        assert_eq!(
            Path::hermite(&two, &[None], 0.0).unwrap_err(),
            PathError::TangentCountMismatch {
                waypoints: 2,
                tangents: 1
            }
        );
        assert_eq!(Path::compound(vec![]).unwrap_err(), PathError::EmptyCompound);
    }

    #[test]
    fn test_builder_variants() {
        let two = [Pose::new(0.0, 0.0), Pose::new(10.0, 0.0)];
        let three = [Pose::new(0.0, 0.0), Pose::new(10.0, 0.0), Pose::new(10.0, 10.0)];

        assert!(matches!(Path::linear(&two), Ok(Path::Linear(_))));
        assert!(matches!(Path::linear(&three), Ok(Path::Compound(_))));
        assert!(matches!(Path::hermite(&two, &[], 0.0), Ok(Path::Hermite(_))));
        assert!(matches!(Path::hermite(&three, &[], 0.0), Ok(Path::Compound(_))));

        assert!((Path::linear(&three).unwrap().length() - 20.0).abs() < EPS);
    }

    #[test]
    fn test_cardinal_default_tangents() {
        let pts = [Pose::new(0.0, 0.0), Pose::new(10.0, 0.0), Pose::new(10.0, 10.0)];
        let path = Path::hermite(&pts, &[], 0.5).unwrap();

        // Start: (p1 - p0) * (1 - tension)
        let start = path.tangent(0.0);
        assert!((start[0] - 5.0).abs() < EPS);
        assert!(start[1].abs() < EPS);

        // Interior: (p2 - p0) * (1 - tension) / 2
        let mid = path.tangent(0.5);
        assert!((mid[0] - 2.5).abs() < EPS);
        assert!((mid[1] - 2.5).abs() < EPS);

        // Explicit tangents override the defaults
        let tangents = [Some(Vector2::new(0.0, 5.0)), None, None];
        let path = Path::hermite(&pts, &tangents, 0.5).unwrap();
        let start = path.tangent(0.0);
        assert!(start[0].abs() < EPS);
        assert!(start[1] > 0.0);
    }

    #[test]
    fn test_colinear_full_tension_is_straight() {
        let pts = [Pose::new(0.0, 0.0), Pose::new(5.0, 5.0), Pose::new(10.0, 10.0)];
        let path = Path::hermite(&pts, &[], 1.0).unwrap();

        // Endpoints of each segment have zero tangent so only interior samples have a defined
        // curvature.
        for i in 1..100 {
            let t = i as f64 / 100.0;
            if i == 50 {
                continue;
            }
            let k = path.curvature(t);
            assert!(k.is_finite());
            assert!(k.abs() < 1e-6, "curvature at {} is {}", t, k);
        }

        // Every point still lies on the line y = x
        for p in path.sample(51) {
            assert!((p.x - p.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normal() {
        let path = Path::linear(&[Pose::new(0.0, 0.0), Pose::new(10.0, 0.0)]).unwrap();
        let n = path.normal(0.5);
        assert!(n[0].abs() < EPS);
        assert!((n[1] - 1.0).abs() < EPS);

        let degenerate = Path::linear(&[Pose::new(1.0, 1.0), Pose::new(1.0, 1.0)]).unwrap();
        assert_eq!(degenerate.normal(0.5), Vector2::zeros());
    }

    #[test]
    fn test_closest_point() {
        let path = Path::linear(&[
            Pose::new(0.0, 0.0),
            Pose::new(10.0, 0.0),
            Pose::new(10.0, 10.0),
        ])
        .unwrap();

        let p = path.closest_point(&Pose::new(12.0, 5.0));
        assert!((p.x - 10.0).abs() < EPS);
        assert!((p.y - 5.0).abs() < EPS);
        assert!((path.closest_point_t(&Pose::new(12.0, 5.0)) - 0.75).abs() < EPS);
    }

    #[test]
    fn test_from_path_spec() {
        let spec = PathSpec::Hermite {
            waypoints: vec![
                Waypoint {
                    x: 0.0,
                    y: 0.0,
                    theta: 0.0,
                    tangent: Some([100.0, 0.0]),
                },
                Waypoint {
                    x: 100.0,
                    y: 50.0,
                    theta: 0.0,
                    tangent: None,
                },
            ],
            tension: 0.0,
        };

        let path = Path::from_path_spec(&spec).unwrap();
        assert!(matches!(path, Path::Hermite(_)));
        let t0 = path.tangent(0.0);
        assert!((t0[0] - 100.0).abs() < EPS);
        assert!(t0[1].abs() < EPS);
    }

    #[test]
    fn test_linear_spec_rejects_tangents() {
        let waypoint = |x: f64, tangent: Option<[f64; 2]>| Waypoint {
            x,
            y: 0.0,
            theta: 0.0,
            tangent,
        };

        let spec = PathSpec::Linear {
            waypoints: vec![
                waypoint(0.0, None),
                waypoint(10.0, None),
                waypoint(20.0, Some([1.0, 0.0])),
            ],
        };
        assert_eq!(
            Path::from_path_spec(&spec).unwrap_err(),
            PathError::UnexpectedTangent(2)
        );

        let spec = PathSpec::Linear {
            waypoints: vec![waypoint(0.0, None), waypoint(10.0, None)],
        };
        assert!(matches!(Path::from_path_spec(&spec), Ok(Path::Linear(_))));
    }

    #[test]
    fn test_spline_continuity_at_joins() {
        let waypoints = [
            Pose::new(0.0, 0.0),
            Pose::new(30.0, 30.0),
            Pose::new(60.0, 0.0),
            Pose::new(60.0, 40.0),
        ];

        for &tension in &[0.0, 0.5, 0.9] {
            let path = Path::hermite(&waypoints, &[], tension).unwrap();
            let n = waypoints.len() - 1;

            for k in 1..n {
                let t = k as f64 / n as f64;

                // Each interior waypoint is passed through exactly
                let at = path.point(t);
                assert!(at.distance_to(&waypoints[k]) < 1e-9);

                let before = path.point(t - 1e-9);
                let after = path.point(t + 1e-9);
                assert!(before.distance_to(&after) < 1e-6);

                // Both segments share the cardinal tangent at the join
                let dir_before = unit_or_zero(path.tangent(t - 1e-9));
                let dir_after = unit_or_zero(path.tangent(t + 1e-9));
                assert!(
                    (dir_before - dir_after).norm() < 1e-6,
                    "tension {}: tangent jumps at t = {}",
                    tension,
                    t
                );
                assert!(dir_after.norm() > 0.5);
            }
        }
    }
}

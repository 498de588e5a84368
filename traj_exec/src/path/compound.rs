//! Paths made from a sequence of connected sub-paths

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{Curve, LinearPath, Path, PathError};
use crate::pose::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum distance between the end of one sub-path and the start of the next for the two to be
/// considered connected.
pub const CONNECTION_TOLERANCE_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sequence of connected paths followed one after the other.
///
/// The parameter range is split evenly between the sub-paths regardless of their lengths, so with
/// `N` sub-paths `t` in `[i/N, (i+1)/N)` lies on sub-path `i`.
#[derive(Debug, Clone, Serialize)]
pub struct CompoundPath {
    paths: Vec<Path>,

    #[serde(skip)]
    lengths_m: Vec<f64>,

    /// Arc length at the start of each sub-path
    #[serde(skip)]
    offsets_m: Vec<f64>,

    #[serde(skip)]
    total_length_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CompoundPath {
    /// Create a new compound path, checking that each path ends where the next one starts.
    pub fn new(paths: Vec<Path>) -> Result<Self, PathError> {
        if paths.is_empty() {
            return Err(PathError::EmptyCompound);
        }

        for (index, pair) in paths.windows(2).enumerate() {
            let end = pair[0].end_pose();
            let start = pair[1].start_pose();

            if end.distance_to(&start) > CONNECTION_TOLERANCE_M {
                return Err(PathError::Disconnected {
                    index,
                    end: (end.x, end.y),
                    start: (start.x, start.y),
                });
            }
        }

        Ok(Self::from_connected(paths))
    }

    /// Build a polyline through the given points.
    ///
    /// Consecutive segments share their end points so no connection check is needed. `points`
    /// must contain at least two points.
    pub(super) fn polyline(points: &[Pose]) -> Self {
        Self::from_connected(
            points
                .windows(2)
                .map(|w| Path::Linear(LinearPath::new(w[0], w[1])))
                .collect(),
        )
    }

    fn from_connected(paths: Vec<Path>) -> Self {
        let lengths_m: Vec<f64> = paths.iter().map(|p| p.length()).collect();

        let mut offsets_m = Vec::with_capacity(lengths_m.len());
        let mut total_length_m = 0.0;
        for l in lengths_m.iter() {
            offsets_m.push(total_length_m);
            total_length_m += l;
        }

        Self {
            paths,
            lengths_m,
            offsets_m,
            total_length_m,
        }
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Find the sub-path containing `t` and the local parameter on that sub-path.
    fn locate(&self, t: f64) -> (usize, f64) {
        let n = self.paths.len();
        let scaled = t * n as f64;
        let index = (scaled.floor().max(0.0) as usize).min(n - 1);

        (index, scaled - index as f64)
    }

    fn first(&self) -> &Path {
        &self.paths[0]
    }

    fn last(&self) -> &Path {
        &self.paths[self.paths.len() - 1]
    }
}

impl Curve for CompoundPath {
    fn start_pose(&self) -> Pose {
        self.first().start_pose()
    }

    fn end_pose(&self) -> Pose {
        self.last().end_pose()
    }

    fn length(&self) -> f64 {
        self.total_length_m
    }

    fn point(&self, t: f64) -> Pose {
        let (i, local_t) = self.locate(t);
        self.paths[i].point(local_t)
    }

    /// Derivatives are taken with respect to the sub-path's own parameter.
    fn pose(&self, t: f64) -> Pose {
        let (i, local_t) = self.locate(t);
        self.paths[i].pose(local_t)
    }

    fn curvature(&self, t: f64) -> f64 {
        let (i, local_t) = self.locate(t);
        self.paths[i].curvature(local_t)
    }

    fn length_so_far(&self, t: f64) -> f64 {
        let (i, local_t) = self.locate(t);
        self.offsets_m[i] + self.paths[i].length_so_far(local_t)
    }

    /// Lengths past the end of the path map to `t = 1`.
    fn t_from_length(&self, length: f64) -> f64 {
        let n = self.paths.len() as f64;

        for (i, path) in self.paths.iter().enumerate() {
            if self.offsets_m[i] + self.lengths_m[i] >= length {
                let local_t = path.t_from_length(length - self.offsets_m[i]);
                return (i as f64 + local_t) / n;
            }
        }

        1.0
    }

    fn closest_point_t(&self, position: &Pose) -> f64 {
        let n = self.paths.len() as f64;
        let mut best_t = 0.0;
        let mut best_dist = std::f64::INFINITY;

        for (i, path) in self.paths.iter().enumerate() {
            let local_t = path.closest_point_t(position);
            let dist = path.point(local_t).distance_to(position);

            if dist < best_dist {
                best_dist = dist;
                best_t = (i as f64 + local_t) / n;
            }
        }

        best_t
    }

    fn heading(&self, t: f64) -> f64 {
        let (i, local_t) = self.locate(t);
        self.paths[i].heading(local_t)
    }
}

//! Straight line paths

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::Curve;
use crate::pose::Pose;
use util::maths::{ang_dist, normalize_radians};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A straight segment between two poses.
///
/// Position is interpolated linearly in `t`, heading by the shortest angular difference between
/// the two end headings.
#[derive(Debug, Clone, Serialize)]
pub struct LinearPath {
    start: Pose,
    end: Pose,
    length_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LinearPath {
    pub fn new(start: Pose, end: Pose) -> Self {
        Self {
            start,
            end,
            length_m: start.distance_to(&end),
        }
    }
}

impl Curve for LinearPath {
    fn start_pose(&self) -> Pose {
        self.start
    }

    fn end_pose(&self) -> Pose {
        self.end
    }

    fn length(&self) -> f64 {
        self.length_m
    }

    fn point(&self, t: f64) -> Pose {
        Pose::with_heading(
            self.start.x + (self.end.x - self.start.x) * t,
            self.start.y + (self.end.y - self.start.y) * t,
            self.heading(t),
        )
    }

    /// The velocity of a linear path's pose is the unit direction of travel and its acceleration
    /// is zero.
    fn pose(&self, t: f64) -> Pose {
        let mut pose = self.point(t);

        if self.length_m > 0.0 {
            pose.vx = (self.end.x - self.start.x) / self.length_m;
            pose.vy = (self.end.y - self.start.y) / self.length_m;
        }

        pose
    }

    fn curvature(&self, _t: f64) -> f64 {
        0.0
    }

    fn length_so_far(&self, t: f64) -> f64 {
        self.length_m * t
    }

    /// Zero length paths map every length to `t = 0`.
    fn t_from_length(&self, length: f64) -> f64 {
        if self.length_m > 0.0 {
            (length / self.length_m).max(0.0).min(1.0)
        } else {
            0.0
        }
    }

    fn closest_point_t(&self, position: &Pose) -> f64 {
        let dir = self.end.position() - self.start.position();
        let len_sq = dir.norm_squared();

        if len_sq == 0.0 {
            return 0.0;
        }

        let t = (position.position() - self.start.position()).dot(&dir) / len_sq;
        t.max(0.0).min(1.0)
    }

    fn heading(&self, t: f64) -> f64 {
        normalize_radians(self.start.theta + ang_dist(self.start.theta, self.end.theta) * t)
    }
}

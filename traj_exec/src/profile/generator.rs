//! Motion profile generation
//!
//! The arc length domain is split into evenly spaced samples. The velocity at each sample is the
//! smallest of the velocity limit there, the velocity reachable by accelerating forward from the
//! start, and the velocity from which the end can still be reached by decelerating. Between
//! samples the acceleration is constant, so the time across a segment of length `ds` is
//! `2 ds / (v0 + v1)`.
//!
//! Within a segment `v^2` is linear in arc length, so the velocity never exceeds the larger of its
//! end velocities. Limits are therefore taken as the minimum over several points inside each
//! segment, and a sample is bounded by the limits of both segments it touches.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::{MotionProfile, MotionState, ProfileError, Segment};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default number of arc length segments used when generating a profile.
pub const DEFAULT_PROFILE_RESOLUTION: usize = 500;

/// Paths shorter than this produce a stationary profile.
const MIN_LENGTH_M: f64 = 1e-9;

/// Number of sub-intervals each segment is split into when evaluating the limits.
const SEGMENT_SUBDIVISIONS: usize = 8;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Builds [`MotionProfile`]s from boundary states and limit functions.
#[derive(Debug, Copy, Clone)]
pub struct ProfileGenerator {
    resolution: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ProfileGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE_RESOLUTION)
    }
}

impl ProfileGenerator {
    /// Create a generator using `resolution` arc length segments, at least two are always used.
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(2),
        }
    }

    /// Generate a profile from `start` to `end`.
    ///
    /// `velocity_constraint` and `acceleration_constraint` give the maximum velocity and
    /// acceleration at an arc length. The velocity limit must be positive everywhere it is
    /// evaluated strictly inside the path. At the two ends the boundary state velocities apply
    /// instead, capped by the limit of the adjacent segment.
    pub fn generate<V, A>(
        &self,
        start: MotionState,
        end: MotionState,
        velocity_constraint: V,
        acceleration_constraint: A,
    ) -> Result<MotionProfile, ProfileError>
    where
        V: Fn(f64) -> f64,
        A: Fn(f64) -> f64,
    {
        let length = end.x - start.x;

        if !length.is_finite()
            || length < 0.0
            || !(start.v >= 0.0)
            || !(end.v >= 0.0)
            || !start.v.is_finite()
            || !end.v.is_finite()
        {
            return Err(ProfileError::InvalidBoundaryStates { start, end });
        }

        if length < MIN_LENGTH_M {
            return Ok(MotionProfile {
                segments: Vec::new(),
                start,
                end,
                duration_s: 0.0,
            });
        }

        let n = self.resolution;
        let ds = length / n as f64;
        let s_at = |i: usize| start.x + ds * i as f64;

        // Smallest limits found across each segment
        let mut seg_vels = Vec::with_capacity(n);
        let mut accels = Vec::with_capacity(n);
        for i in 0..n {
            let mut v_min = std::f64::INFINITY;
            let mut a_min = std::f64::INFINITY;

            for j in 0..=SEGMENT_SUBDIVISIONS {
                let s = s_at(i) + ds * j as f64 / SEGMENT_SUBDIVISIONS as f64;

                let a = acceleration_constraint(s);
                if !(a > 0.0) || !a.is_finite() {
                    return Err(ProfileError::InvalidAccelerationLimit { s, a });
                }
                a_min = a_min.min(a);

                // The ends of the path are governed by the boundary states
                let path_end = (i == 0 && j == 0) || (i == n - 1 && j == SEGMENT_SUBDIVISIONS);
                if !path_end {
                    let v = velocity_constraint(s);
                    if !(v > 0.0) {
                        return Err(ProfileError::InvalidVelocityLimit { s, v });
                    }
                    v_min = v_min.min(v);
                }
            }

            seg_vels.push(v_min);
            accels.push(a_min);
        }

        // Velocity limits at each sample
        let mut vels = Vec::with_capacity(n + 1);
        vels.push(start.v.min(seg_vels[0]));
        for i in 1..n {
            vels.push(seg_vels[i - 1].min(seg_vels[i]));
        }
        vels.push(end.v.min(seg_vels[n - 1]));

        // Forward pass, accelerate as hard as allowed from the start
        for i in 0..n {
            let reachable = (vels[i] * vels[i] + 2.0 * accels[i] * ds).sqrt();
            vels[i + 1] = vels[i + 1].min(reachable);
        }

        // Backward pass, make sure every sample can still brake for the next
        for i in (0..n).rev() {
            let brakeable = (vels[i + 1] * vels[i + 1] + 2.0 * accels[i] * ds).sqrt();
            vels[i] = vels[i].min(brakeable);
        }

        let mut segments = Vec::with_capacity(n);
        let mut t_s = 0.0;
        for i in 0..n {
            let (v0, v1) = (vels[i], vels[i + 1]);

            segments.push(Segment {
                t0_s: t_s,
                x0: s_at(i),
                v0,
                a: (v1 * v1 - v0 * v0) / (2.0 * ds),
            });

            t_s += 2.0 * ds / (v0 + v1);
        }

        trace!(
            "Generated profile over {:.3} m in {} segments, duration {:.3} s",
            length,
            n,
            t_s
        );

        Ok(MotionProfile {
            segments,
            start: MotionState { v: vels[0], ..start },
            end: MotionState { v: vels[n], ..end },
            duration_s: t_s,
        })
    }
}

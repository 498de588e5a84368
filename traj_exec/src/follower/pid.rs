//! # PID controller
//!
//! A discrete PID controller with an optional feedforward term, integral clamping and output
//! limits. The controller is stepped with an explicit `dt` so that behaviour is deterministic.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use util::maths::normalize_radians;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default limit on the magnitude of the integral accumulation.
pub const DEFAULT_INTEGRAL_CLAMP: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Feedforward gain, applied to the target in `update_target`
    k_f: f64,

    /// Limit on the magnitude of the integral accumulation
    integral_clamp: f64,

    output_min: f64,
    output_max: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PidError {
    #[error("PID gains must be non-negative, found k_p = {0}, k_i = {1}, k_d = {2}")]
    NegativeGain(f64, f64, f64),

    #[error("Integral clamp must be non-negative, found {0}")]
    NegativeIntegralClamp(f64),

    #[error("Output minimum ({0}) is greater than the maximum ({1})")]
    InvertedOutputLimits(f64, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Result<Self, PidError> {
        if !(k_p >= 0.0 && k_i >= 0.0 && k_d >= 0.0) {
            return Err(PidError::NegativeGain(k_p, k_i, k_d));
        }

        Ok(Self {
            k_p,
            k_i,
            k_d,
            k_f: 0.0,
            integral_clamp: DEFAULT_INTEGRAL_CLAMP,
            output_min: std::f64::NEG_INFINITY,
            output_max: std::f64::INFINITY,
            prev_error: None,
            integral: 0.0,
        })
    }

    /// Set the feedforward gain.
    pub fn with_feedforward(mut self, k_f: f64) -> Self {
        self.k_f = k_f;
        self
    }

    /// Set the limit on the magnitude of the integral accumulation.
    pub fn with_integral_clamp(mut self, clamp: f64) -> Result<Self, PidError> {
        if !(clamp >= 0.0) {
            return Err(PidError::NegativeIntegralClamp(clamp));
        }
        self.integral_clamp = clamp;
        Ok(self)
    }

    /// Limit the controller output to `[min, max]`.
    pub fn set_output_limits(&mut self, min: f64, max: f64) -> Result<(), PidError> {
        if min > max {
            return Err(PidError::InvertedOutputLimits(min, max));
        }

        self.output_min = min;
        self.output_max = max;

        Ok(())
    }

    /// Clear the integral and derivative memory.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Get the value of the controller for the given error after `dt` seconds.
    ///
    /// A non-positive `dt` gives zero output and leaves the controller state untouched.
    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        if !(dt > 0.0) {
            return 0.0;
        }

        // Accumulate the integral term, saturating to avoid windup
        self.integral = (self.integral + error * dt)
            .max(-self.integral_clamp)
            .min(self.integral_clamp);

        // No derivative until there is a previous error to compare against
        let deriv = match self.prev_error {
            Some(e) => (error - e) / dt,
            None => 0.0,
        };

        self.prev_error = Some(error);

        self.clamp_output(self.k_p * error + self.k_i * self.integral + self.k_d * deriv)
    }

    /// Get the value of the controller for a target and current value, including the feedforward
    /// term.
    ///
    /// If `wrap_angle` is true the error is wrapped into (-pi, pi] first.
    pub fn update_target(&mut self, target: f64, current: f64, dt: f64, wrap_angle: bool) -> f64 {
        let error = if wrap_angle {
            normalize_radians(target - current)
        } else {
            target - current
        };

        if !(dt > 0.0) {
            return 0.0;
        }

        let feedback = self.update(error, dt);
        self.clamp_output(feedback + self.k_f * target)
    }

    fn clamp_output(&self, out: f64) -> f64 {
        out.max(self.output_min).min(self.output_max)
    }
}

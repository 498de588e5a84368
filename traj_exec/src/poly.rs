//! # Polynomial
//!
//! Dense single-variable polynomials stored lowest power first, i.e. `coeffs[i]` multiplies
//! `x^i`. Used to build the Hermite curves.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A polynomial `c[0] + c[1] x + c[2] x^2 + ...`
///
/// An empty coefficient list is the zero polynomial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Polynomial {
    pub fn new(coeffs: Vec<f64>) -> Self {
        Self { coeffs }
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Degree of the polynomial, counting trailing zero coefficients.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Evaluate the polynomial at `x` using Horner's method.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    /// Evaluate the first derivative at `x`.
    pub fn der_eval(&self, x: f64) -> f64 {
        self.n_der_eval(x, 1)
    }

    /// Evaluate the `n`th derivative at `x`.
    pub fn n_der_eval(&self, x: f64, n: usize) -> f64 {
        self.derivative(n).eval(x)
    }

    /// Get the `n`th derivative of this polynomial.
    ///
    /// Coefficient `c_i` becomes `c_i * i! / (i - n)!` and moves down `n` powers. Differentiating
    /// past the degree gives the zero polynomial.
    pub fn derivative(&self, n: usize) -> Polynomial {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(n)
            .map(|(i, c)| c * falling_factorial(i, n))
            .collect();

        Polynomial { coeffs }
    }

    /// Multiply every coefficient by `s`.
    pub fn v_scale(&self, s: f64) -> Polynomial {
        Polynomial {
            coeffs: self.coeffs.iter().map(|c| c * s).collect(),
        }
    }

    /// Sum any number of polynomials, zero-padding shorter coefficient lists.
    pub fn add<'a, I>(polys: I) -> Polynomial
    where
        I: IntoIterator<Item = &'a Polynomial>,
    {
        let mut coeffs: Vec<f64> = Vec::new();

        for p in polys {
            if p.coeffs.len() > coeffs.len() {
                coeffs.resize(p.coeffs.len(), 0.0);
            }
            for (sum, c) in coeffs.iter_mut().zip(p.coeffs.iter()) {
                *sum += c;
            }
        }

        Polynomial { coeffs }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// `i! / (i - n)!`, valid for `i >= n`
fn falling_factorial(i: usize, n: usize) -> f64 {
    ((i - n + 1)..=i).fold(1.0, |acc, k| acc * k as f64)
}

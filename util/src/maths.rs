//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Wrap an angle in radians into the range (-pi, pi].
pub fn normalize_radians<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    pi_t - rem_euclid(pi_t - angle, tau_t)
}

/// Get the signed shortest angular distance from `a` to `b`, in the range (-pi, pi].
pub fn ang_dist<T>(a: T, b: T) -> T
where
    T: Float,
{
    normalize_radians(b - a)
}

/// Produce `num` evenly spaced values between `start` and `end` inclusive.
pub fn linspace<T>(start: T, end: T, num: usize) -> Vec<T>
where
    T: Float,
{
    match num {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / T::from(num - 1).unwrap();
            (0..num)
                .map(|i| {
                    // Pin the final value so the end point is exact
                    if i == num - 1 {
                        end
                    } else {
                        start + T::from(i).unwrap() * step
                    }
                })
                .collect()
        }
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

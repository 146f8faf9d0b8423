//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Linearly interpolate between `a` and `b`, with `frac` in [0, 1].
pub fn lerp<T>(a: T, b: T, frac: T) -> T
where
    T: Float
{
    a + (b - a) * frac
}

/// Wrap an angle into the range (-pi, pi].
pub fn norm_angle<T>(angle: T) -> T
where
    T: Float
{
    let pi_t = T::from(std::f64::consts::PI).unwrap();
    let tau_t = T::from(std::f64::consts::TAU).unwrap();

    // Result of the euclidian remainder is in [-pi, pi)
    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    // Move the lower bound into the upper one
    if wrapped <= -pi_t {
        wrapped + tau_t
    }
    else {
        wrapped
    }
}

/// Get the signed shortest angular distance from `a` to `b`.
///
/// The result is in (-pi, pi] and satisfies `norm_angle(a + d) == norm_angle(b)`.
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float
{
    norm_angle(b - a)
}

/// The unnormalised sinc function, `sin(x)/x`, evaluating to exactly 1 at 0.
pub fn sinc<T>(x: T) -> T
where
    T: Float
{
    if x == T::zero() {
        T::one()
    }
    else {
        x.sin() / x
    }
}

/// The sign of a value, with the sign of zero being zero.
///
/// `Float::signum` gives +1 for +0.0, which isn't wanted for static friction
/// compensation.
pub fn sign<T>(value: T) -> T
where
    T: Float
{
    if value > T::zero() {
        T::one()
    }
    else if value < T::zero() {
        -T::one()
    }
    else {
        T::zero()
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

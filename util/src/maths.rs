//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
///
/// Ranges wider than the largest finite value are handled without overflow.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    let num = (value - source_range.0) * (target_range.1 - target_range.0);
    let den = source_range.1 - source_range.0;

    if num.is_finite() && den.is_finite() {
        return target_range.0 + num / den
    }

    // Work with half ranges so the differences can't overflow
    let two = T::one() + T::one();
    let ratio = (value / two - source_range.0 / two)
        / (source_range.1 / two - source_range.0 / two);

    target_range.0 * (T::one() - ratio) + target_range.1 * ratio
}

/// Saturate a value to the symmetric range `[-limit, +limit]`.
///
/// Returns the saturated value and `true` if the value was outside the range
/// and had to be limited. An infinite `limit` never saturates.
pub fn saturate<T>(value: T, limit: T) -> (T, bool)
where
    T: Float
{
    if value > limit {
        (limit, true)
    }
    else if value < -limit {
        (-limit, true)
    }
    else {
        (value, false)
    }
}

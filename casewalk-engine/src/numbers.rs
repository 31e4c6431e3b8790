//! Safe numeric casts, kept in one place so the rest of the crate can stay
//! cast-free.

use num_traits::cast::cast;

/// Downcast a f64 to f32, saturating at the f32 range; non-finite input
/// becomes 0.0.
#[must_use]
pub fn clamp_f64_to_f32(value: f64) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let clamped = value.clamp(f64::from(f32::MIN), f64::from(f32::MAX));
    cast::<f64, f32>(clamped).unwrap_or(0.0)
}

/// Round a f64 to the nearest i32, saturating at the i32 range; NaN becomes 0.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.clamp(f64::from(i32::MIN), f64::from(i32::MAX)).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Round a f32 to the nearest i32, saturating at the i32 range; NaN becomes 0.
#[must_use]
pub fn round_f32_to_i32(value: f32) -> i32 {
    round_f64_to_i32(f64::from(value))
}

/// Convert i32 to f32 while allowing precision loss in a single location.
#[must_use]
pub fn i32_to_f32(value: i32) -> f32 {
    cast::<i32, f32>(value).unwrap_or(0.0)
}

/// Convert u32 to f32 while allowing precision loss in a single location.
#[must_use]
pub fn u32_to_f32(value: u32) -> f32 {
    cast::<u32, f32>(value).unwrap_or(0.0)
}

/// Clamp a collection length into the u32 range.
#[must_use]
pub fn count_u32(value: usize) -> u32 {
    cast::<usize, u32>(value).unwrap_or(u32::MAX)
}

/// Ratio of two counts as f32, returning 0.0 when the denominator is zero.
#[must_use]
pub fn ratio_u32(numerator: u32, denominator: u32) -> f32 {
    if denominator == 0 {
        return 0.0;
    }
    let num = cast::<u32, f64>(numerator).unwrap_or(0.0);
    let den = cast::<u32, f64>(denominator).unwrap_or(1.0);
    clamp_f64_to_f32(num / den)
}

/// Ratio of two counts rounded to a whole percentage in `0..=100`.
#[must_use]
pub fn percent_u32(numerator: u32, denominator: u32) -> i32 {
    round_f32_to_i32(ratio_u32(numerator, denominator) * 100.0).clamp(0, 100)
}

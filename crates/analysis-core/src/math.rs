//! Numeric guards shared by every scoring component.
//!
//! Nothing non-finite may reach a report, so every ratio and mean in the
//! workspace goes through these helpers.

/// Replace NaN and infinities with `default`.
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Clamp into `[lo, hi]`. NaN clamps to `lo`.
pub fn clip(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.clamp(lo, hi)
}

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    finite_or(data.iter().sum::<f64>() / data.len() as f64, 0.0)
}

/// `numerator / denominator`, or `default` when the denominator is zero or the
/// result is not finite.
pub fn safe_div(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 {
        return default;
    }
    finite_or(numerator / denominator, default)
}

//! Shared math utilities.

/// Round a value to two decimal places.
///
/// Rounds the exact binary value, ties to even: `3.125` becomes `3.12`.
/// Scaling by 100 first would round `1.005` up through representation error.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Share of `part` in `total` as a percentage, rounded to two decimals.
///
/// Returns 0.0 when `total` is zero.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

/// Render a float the way tag values are shown to users: integral values
/// keep a trailing `.0` so they stay recognisable as non-integers.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

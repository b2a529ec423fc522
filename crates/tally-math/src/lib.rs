//! Deterministic numeric and statistical helpers.
//!
//! Every function here is total: empty inputs and zero denominators yield a
//! defined value instead of `NaN` or a panic.

#![forbid(unsafe_code)]

/// Decimals used for ratios unless a metric asks for something else.
pub const DEFAULT_DECIMALS: u32 = 4;

/// Round a floating point value to `decimals` decimal places.
#[must_use]
pub fn round_f64(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Ratio rounded to `decimals`; zero when the denominator is zero.
#[must_use]
pub fn ratio(numer: usize, denom: usize, decimals: u32) -> f64 {
    if denom == 0 {
        0.0
    } else {
        round_f64(numer as f64 / denom as f64, decimals)
    }
}

/// 4-decimal ratio that guards division by zero.
#[must_use]
pub fn safe_ratio(numer: usize, denom: usize) -> f64 {
    ratio(numer, denom, DEFAULT_DECIMALS)
}

/// Relative change from `from` to `to`, rounded to 4 decimals.
///
/// `None` when `from` is zero and the value moved; `Some(0.0)` when both are zero.
#[must_use]
pub fn pct_change(from: usize, to: usize) -> Option<f64> {
    if from == 0 {
        return if to == 0 { Some(0.0) } else { None };
    }
    let delta = to as f64 - from as f64;
    Some(round_f64(delta / from as f64, DEFAULT_DECIMALS))
}

/// Share of the largest value in the total, 4 decimals.
#[must_use]
pub fn max_share(values: &[usize]) -> f64 {
    let total: usize = values.iter().sum();
    let max = values.iter().copied().max().unwrap_or(0);
    safe_ratio(max, total)
}

/// Return the `pct` percentile (nearest-rank, rounding up) from an
/// ascending-sorted slice. `pct` is clamped to `[0, 1]`.
#[must_use]
pub fn percentile(sorted: &[usize], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pct = if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 1.0) };
    let idx = (pct * (sorted.len() as f64 - 1.0)).ceil() as usize;
    sorted[idx.min(sorted.len() - 1)] as f64
}

/// Return the Gini coefficient for an ascending-sorted slice, 4 decimals.
#[must_use]
pub fn gini_coefficient(sorted: &[usize]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len() as f64;
    let sum: f64 = sorted.iter().map(|v| *v as f64).sum();
    if sum == 0.0 {
        return 0.0;
    }
    let accum: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (2.0 * (i as f64 + 1.0) - n - 1.0) * (*v as f64))
        .sum();
    round_f64(accum / (n * sum), DEFAULT_DECIMALS)
}

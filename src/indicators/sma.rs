// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_t = (close_{t-period+1} + ... + close_t) / period
//
// Output is aligned with the input: index t holds the average of the window
// ending at t, or `None` while fewer than `period` closes exist. Partial
// windows are never averaged.
// =============================================================================

/// Compute the aligned SMA series for `closes` over `period`.
///
/// # Edge cases
/// - `period == 0` => every element is `None`
/// - A window containing a non-finite close yields `None` for that index.
pub fn rolling_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return result;
    }

    for (offset, window) in closes.windows(period).enumerate() {
        let sum: f64 = window.iter().sum();
        let mean = sum / period as f64;
        if mean.is_finite() {
            result[offset + period - 1] = Some(mean);
        }
    }
    result
}

/// Replace each non-finite close with the previous finite one. Leading
/// non-finite values have nothing to carry and are left as they are.
pub fn forward_fill(closes: &mut [f64]) {
    let mut last: Option<f64> = None;
    for close in closes.iter_mut() {
        if close.is_finite() {
            last = Some(*close);
        } else if let Some(prev) = last {
            *close = prev;
        }
    }
}

// =============================================================================
// Period-over-period percentage return
// =============================================================================
//
// r_t = (close_t - close_{t-1}) / close_{t-1}, expressed as a fraction.
//
// Output is aligned with the input; index 0 is always `None`.

pub fn pct_change(closes: &[f64]) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return result;
    }
    result.push(None);
    for pair in closes.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let change = (curr - prev) / prev;
        result.push((prev != 0.0 && change.is_finite()).then_some(change));
    }
    result
}

/// Ratio of two aligned series; `None` where the denominator is zero or
/// either side is not finite.
pub fn ratio(numerators: &[f64], denominators: &[f64]) -> Vec<Option<f64>> {
    numerators
        .iter()
        .zip(denominators)
        .map(|(&n, &d)| {
            let r = n / d;
            (d != 0.0 && r.is_finite()).then_some(r)
        })
        .collect()
}

// =============================================================================
// Forecaster — least-squares trend line and 7-day projection
// =============================================================================
//
// x = calendar days elapsed since the first usable row, y = instrument-A
// price. Closed-form OLS:
//
//   slope     = Σ(x - x̄)(y - ȳ) / Σ(x - x̄)²
//   intercept = ȳ - slope · x̄
//
// Outlook: slope > 0.5 → Bullish Bias, slope < -0.5 → Bearish Bias, else
// Neutral (units: price per calendar day).
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::market_data::Series;
use crate::types::Outlook;

pub const MIN_ROWS: usize = 50;
pub const HORIZON_DAYS: i64 = 7;
pub const SLOPE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub outlook: Outlook,
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
    pub forecast_prices: Vec<f64>,
}

impl Forecast {
    pub fn insufficient() -> Self {
        Self {
            outlook: Outlook::InsufficientData,
            slope: None,
            intercept: None,
            forecast_prices: Vec::new(),
        }
    }
}

pub fn forecast(series: &Series) -> Forecast {
    let usable: Vec<_> = series
        .rows()
        .iter()
        // Only base prices gate the fit; rows without a defined MA200 still count.
        .filter(|r| r.point.price_a.is_finite() && r.point.price_b.is_finite())
        .collect();

    if usable.len() < MIN_ROWS {
        debug!(rows = usable.len(), "forecast skipped: insufficient rows");
        return Forecast::insufficient();
    }

    let origin = usable[0].point.date;
    let xs: Vec<f64> = usable
        .iter()
        .map(|r| (r.point.date - origin).num_days() as f64)
        .collect();
    let ys: Vec<f64> = usable.iter().map(|r| r.point.price_a).collect();

    let Some((slope, intercept)) = fit_line(&xs, &ys) else {
        return Forecast::insufficient();
    };

    let last_x = xs[xs.len() - 1];
    let forecast_prices = (1..=HORIZON_DAYS)
        .map(|step| slope * (last_x + step as f64) + intercept)
        .collect();

    let outlook = if slope > SLOPE_THRESHOLD {
        Outlook::BullishBias
    } else if slope < -SLOPE_THRESHOLD {
        Outlook::BearishBias
    } else {
        Outlook::Neutral
    };

    debug!(slope, intercept, outlook = %outlook, "forecast fitted");

    Forecast {
        outlook,
        slope: Some(slope),
        intercept: Some(intercept),
        forecast_prices,
    }
}

/// Ordinary least-squares fit of `y = slope·x + intercept`. `None` when fewer
/// than two points exist or every `x` is identical.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let y_mean = ys.iter().sum::<f64>() / n as f64;

    let (sxy, sxx) = xs.iter().zip(ys).fold((0.0, 0.0), |(sxy, sxx), (&x, &y)| {
        let dx = x - x_mean;
        (sxy + dx * (y - y_mean), sxx + dx * dx)
    });
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    (slope.is_finite() && intercept.is_finite()).then_some((slope, intercept))
}

// =============================================================================
// Indicator Engine — attach derived fields to every row of a series
// =============================================================================
//
// Per instrument: forward fill, then SMA 20/50/200. Instrument A also gets a
// percentage return; every row gets the A/B ratio and a MA50 zone signal.
// Pure function of the input rows; index t only looks at rows <= t.

use tracing::debug;

use crate::indicators::returns::{pct_change, ratio};
use crate::indicators::sma::{forward_fill, rolling_sma};
use crate::market_data::{Derived, Series};
use crate::types::Signal;

pub const MA_SHORT: usize = 20;
pub const MA_MEDIUM: usize = 50;
pub const MA_LONG: usize = 200;

struct Averages {
    short: Vec<Option<f64>>,
    medium: Vec<Option<f64>>,
    long: Vec<Option<f64>>,
}

impl Averages {
    fn of(closes: &[f64]) -> Self {
        Self {
            short: rolling_sma(closes, MA_SHORT),
            medium: rolling_sma(closes, MA_MEDIUM),
            long: rolling_sma(closes, MA_LONG),
        }
    }
}

pub fn enrich(mut series: Series) -> Series {
    if series.is_empty() {
        return series;
    }

    let mut closes_a = series.prices_a();
    let mut closes_b = series.prices_b();
    forward_fill(&mut closes_a);
    forward_fill(&mut closes_b);

    let avg_a = Averages::of(&closes_a);
    let avg_b = Averages::of(&closes_b);
    let returns_a = pct_change(&closes_a);
    let ratios = ratio(&closes_a, &closes_b);

    for (i, row) in series.rows_mut().iter_mut().enumerate() {
        row.point.price_a = closes_a[i];
        row.point.price_b = closes_b[i];
        row.derived = Derived {
            ma20_a: avg_a.short[i],
            ma50_a: avg_a.medium[i],
            ma200_a: avg_a.long[i],
            ma20_b: avg_b.short[i],
            ma50_b: avg_b.medium[i],
            ma200_b: avg_b.long[i],
            return_a: returns_a[i],
            ratio: ratios[i],
            signal: zone_signal(closes_a[i], avg_a.medium[i]),
        };
    }

    debug!(rows = series.len(), "series enriched");
    series
}

fn zone_signal(price: f64, ma50: Option<f64>) -> Signal {
    match ma50 {
        Some(ma) if price > ma => Signal::BullishZone,
        Some(ma) if price < ma => Signal::BearishZone,
        _ => Signal::Neutral,
    }
}

// =============================================================================
// Trend Classifier
// =============================================================================
//
// Looks only at the most recent row of an enriched series:
//
//   1. INSUFFICIENT DATA — MA200 undefined (or empty series)
//   2. BULLISH           — price > MA50 > MA200
//   3. BEARISH           — price < MA50 < MA200
//   4. SIDEWAYS          — anything else, including ties

use tracing::debug;

use crate::market_data::Series;
use crate::types::TrendLabel;

pub fn classify(series: &Series) -> TrendLabel {
    let Some(latest) = series.last() else {
        return TrendLabel::InsufficientData;
    };
    let price = latest.point.price_a;
    let (Some(ma50), Some(ma200)) = (latest.derived.ma50_a, latest.derived.ma200_a) else {
        return TrendLabel::InsufficientData;
    };

    let label = alignment(price, ma50, ma200);
    debug!(price, ma50, ma200, trend = %label, "trend classified");
    label
}

fn alignment(price: f64, ma50: f64, ma200: f64) -> TrendLabel {
    if price > ma50 && ma50 > ma200 {
        TrendLabel::Bullish
    } else if price < ma50 && ma50 < ma200 {
        TrendLabel::Bearish
    } else {
        TrendLabel::Sideways
    }
}

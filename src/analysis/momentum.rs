// =============================================================================
// Momentum narrative — latest price versus its 50-day average
// =============================================================================

use crate::market_data::Series;

pub const EQUILIBRIUM: &str = "Market is finding equilibrium.";
pub const STRONG_UP: &str = "Strong upward momentum, price significantly above 50-day average. Watch for potential overextension.";
pub const STEADY_UP: &str = "Steady bullish pressure. Price is holding above key moving averages.";
pub const STRONG_DOWN: &str = "Significant downward pressure. Price is extended to the downside.";
pub const STEADY_DOWN: &str = "Bearish sentiment prevails, trading below the average.";
pub const CONSOLIDATING: &str = "Price is consolidating near the 50-day average, indicating a potential breakout or breakdown soon.";

pub fn momentum_text(series: &Series) -> &'static str {
    let Some(latest) = series.last() else {
        return EQUILIBRIUM;
    };
    match latest.derived.ma50_a {
        Some(ma50) if ma50 != 0.0 => describe_distance((latest.point.price_a - ma50) / ma50),
        _ => EQUILIBRIUM,
    }
}

fn describe_distance(dist: f64) -> &'static str {
    if dist > 0.05 {
        STRONG_UP
    } else if dist > 0.01 {
        STEADY_UP
    } else if dist < -0.05 {
        STRONG_DOWN
    } else if dist < -0.01 {
        STEADY_DOWN
    } else {
        CONSOLIDATING
    }
}

// =============================================================================
// Aggregator — one serialisable snapshot per pipeline run
// =============================================================================
//
// The snapshot is built fresh each run and never merged with a previous one.
// Only the payload views are trimmed (daily / weekly limits); the series the
// derivations ran on is left untouched.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::events::MarketEvent;
use crate::analysis::forecast::Forecast;
use crate::analysis::levels::Levels;
use crate::analysis::momentum::momentum_text;
use crate::analysis::resample::{weekly, WeeklyRow};
use crate::market_data::{InstrumentPair, Series, SeriesRow};
use crate::types::TrendLabel;

/// How much history the payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLimits {
    pub daily: usize,
    pub weekly: usize,
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self {
            daily: 300,
            weekly: 104,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    pub instruments: InstrumentPair,
    pub daily: Vec<SeriesRow>,
    pub weekly: Vec<WeeklyRow>,
    pub trend: TrendLabel,
    pub market_events: Vec<MarketEvent>,
    pub levels: Levels,
    pub prediction: Forecast,
    pub momentum_text: String,
    /// Date of the most recent observation, if any.
    pub as_of: Option<NaiveDate>,
}

pub fn summarize(
    series: &Series,
    trend: TrendLabel,
    events: Vec<MarketEvent>,
    levels: Levels,
    forecast: Forecast,
    limits: PayloadLimits,
) -> AnalysisSnapshot {
    let weekly_rows = weekly(series);
    let weekly_start = weekly_rows.len().saturating_sub(limits.weekly);

    AnalysisSnapshot {
        instruments: series.instruments().clone(),
        daily: series.tail(limits.daily).to_vec(),
        weekly: weekly_rows[weekly_start..].to_vec(),
        trend,
        market_events: events,
        levels,
        prediction: forecast,
        momentum_text: momentum_text(series).to_string(),
        as_of: series.last().map(|r| r.point.date),
    }
}

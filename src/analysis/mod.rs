// =============================================================================
// Analysis pipeline
// =============================================================================
//
//   SeriesStore → enrich → { trend, events, levels, forecast } → summarize
//
// Every stage after the store is a pure function of the series it receives,
// so running `analyze` twice on the same input yields identical snapshots.

pub mod events;
pub mod forecast;
pub mod levels;
pub mod momentum;
pub mod resample;
pub mod snapshot;
pub mod trend;

use tracing::{info, warn};

use crate::error::PipelineError;
use crate::indicators::enrich;
use crate::market_data::{Series, SeriesStore};
use crate::runtime_config::RuntimeConfig;

pub use snapshot::{AnalysisSnapshot, PayloadLimits};

/// Tunables for the derivation stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    pub event_threshold: f64,
    pub level_window: usize,
    pub limits: PayloadLimits,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            event_threshold: events::DEFAULT_THRESHOLD,
            level_window: levels::DEFAULT_WINDOW,
            limits: PayloadLimits::default(),
        }
    }
}

impl From<&RuntimeConfig> for AnalysisSettings {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            event_threshold: config.event_threshold,
            level_window: config.level_window,
            limits: PayloadLimits {
                daily: config.daily_payload_limit,
                weekly: config.weekly_payload_limit,
            },
        }
    }
}

/// Run every derivation over a raw (un-enriched) series.
pub fn analyze(series: Series, settings: &AnalysisSettings) -> AnalysisSnapshot {
    let series = enrich(series);

    let trend = trend::classify(&series);
    let market_events = events::detect(&series, settings.event_threshold);
    let levels = levels::levels(&series, settings.level_window);
    let prediction = forecast::forecast(&series);

    snapshot::summarize(
        &series,
        trend,
        market_events,
        levels,
        prediction,
        settings.limits,
    )
}

/// Load the series and analyse it. An empty series is reported as
/// `DataUnavailable`; the derivations themselves never fail.
pub async fn run_pipeline(
    store: &SeriesStore,
    settings: &AnalysisSettings,
) -> Result<AnalysisSnapshot, PipelineError> {
    let series = store.load().await?;
    if series.is_empty() {
        warn!("pipeline produced no usable rows");
        return Err(PipelineError::DataUnavailable(
            "joined series has no usable rows".to_string(),
        ));
    }

    let rows = series.len();
    let snapshot = analyze(series, settings);
    info!(
        rows,
        trend = %snapshot.trend,
        events = snapshot.market_events.len(),
        outlook = %snapshot.prediction.outlook,
        "analysis snapshot built"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::store::tests::{close, temp_config, StaticSource};
    use crate::market_data::{InstrumentPair, PricePoint};
    use crate::provider::DailyClose;
    use crate::types::{Outlook, TrendLabel};
    use chrono::{Duration, NaiveDate};
    use std::sync::Arc;

    fn two_years() -> Series {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let points = (0..500)
            .map(|d| {
                let wave = ((d % 45) as f64 - 22.0) * 3.0;
                PricePoint::new(start + Duration::days(d), 1800.0 + d as f64 * 1.5 + wave, 23.0)
            })
            .collect();
        Series::from_points(InstrumentPair::new("XAU", "XAG"), points)
    }

    #[test]
    fn analyze_is_idempotent() {
        let settings = AnalysisSettings::default();
        assert_eq!(analyze(two_years(), &settings), analyze(two_years(), &settings));
    }

    #[test]
    fn analyze_populates_every_section() {
        let snap = analyze(two_years(), &AnalysisSettings::default());
        assert_ne!(snap.trend, TrendLabel::InsufficientData);
        assert_eq!(snap.prediction.outlook, Outlook::BullishBias);
        assert_eq!(snap.prediction.forecast_prices.len(), 7);
        assert_eq!(snap.daily.len(), 300);
        assert!(snap.daily.last().unwrap().derived.ma200_a.is_some());
        assert!(snap.levels["xau"].support().is_some());
    }

    #[test]
    fn analyze_empty_series_degrades_to_sentinels() {
        let snap = analyze(
            Series::empty(InstrumentPair::new("XAU", "XAG")),
            &AnalysisSettings::default(),
        );
        assert_eq!(snap.trend, TrendLabel::InsufficientData);
        assert_eq!(snap.prediction.outlook, Outlook::InsufficientData);
        assert!(snap.market_events.is_empty());
        assert!(snap.levels["xag"].supports.is_empty());
    }

    #[test]
    fn settings_follow_config() {
        let cfg = RuntimeConfig {
            event_threshold: 0.1,
            daily_payload_limit: 10,
            ..RuntimeConfig::default()
        };
        let settings = AnalysisSettings::from(&cfg);
        assert!((settings.event_threshold - 0.1).abs() < f64::EPSILON);
        assert_eq!(settings.limits.daily, 10);
        assert_eq!(settings.limits.weekly, 104);
    }

    #[tokio::test]
    async fn run_pipeline_reports_empty_join_as_unavailable() {
        let config = temp_config();
        let source = Arc::new(
            StaticSource::with("GC=F", vec![close(1, Some(1.0))])
                .and("SI=F", Vec::<DailyClose>::new()),
        );
        let store = SeriesStore::new(source, &config);
        let err = run_pipeline(&store, &AnalysisSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn run_pipeline_builds_snapshot() {
        let config = temp_config();
        let source = Arc::new(
            StaticSource::with("GC=F", vec![close(1, Some(2000.0)), close(2, Some(2012.0))])
                .and("SI=F", vec![close(1, Some(24.0)), close(2, Some(24.2))]),
        );
        let store = SeriesStore::new(source, &config);
        let snap = run_pipeline(&store, &AnalysisSettings::default())
            .await
            .unwrap();
        assert_eq!(snap.daily.len(), 2);
        assert_eq!(snap.trend, TrendLabel::InsufficientData);
        let _ = std::fs::remove_file(&config.cache_path);
    }
}

// =============================================================================
// Series Store — paired daily closes with a time-bounded disk cache
// =============================================================================
//
// load():
//   1. Fresh cache (younger than TTL)   → return it.
//   2. Otherwise fetch both symbols     → inner join by date, drop rows with a
//      missing / non-finite / non-positive close, sort ascending.
//   3. Persist non-empty results        → failures are logged, never fatal.
//
// Provider failures are the only errors that escape (`DataUnavailable`).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::market_data::cache::PriceCache;
use crate::market_data::series::{InstrumentPair, PricePoint, Series};
use crate::provider::{DailyClose, PriceSource};
use crate::runtime_config::RuntimeConfig;

pub struct SeriesStore {
    source: Arc<dyn PriceSource>,
    cache: PriceCache,
    instruments: InstrumentPair,
    symbol_a: String,
    symbol_b: String,
    lookback_days: i64,
}

impl SeriesStore {
    pub fn new(source: Arc<dyn PriceSource>, config: &RuntimeConfig) -> Self {
        Self {
            source,
            cache: PriceCache::new(config.cache_path.clone(), config.cache_ttl()),
            instruments: InstrumentPair::new(
                config.instrument_a.label.clone(),
                config.instrument_b.label.clone(),
            ),
            symbol_a: config.instrument_a.symbol.clone(),
            symbol_b: config.instrument_b.symbol.clone(),
            lookback_days: config.lookback_days,
        }
    }

    pub async fn load(&self) -> Result<Series, PipelineError> {
        match self.cache.read_fresh(&self.instruments) {
            Ok(Some(series)) => {
                info!(rows = series.len(), path = %self.cache.path().display(), "loaded prices from cache");
                return Ok(series);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "price cache read failed — fetching fresh data"),
        }

        let end = Utc::now().date_naive();
        let start = end - Duration::days(self.lookback_days);
        info!(%start, %end, a = %self.symbol_a, b = %self.symbol_b, "fetching prices from provider");

        let closes_a = self.fetch(&self.symbol_a, start, end).await?;
        let closes_b = self.fetch(&self.symbol_b, start, end).await?;

        let series = join_closes(self.instruments.clone(), &closes_a, &closes_b);
        info!(
            rows = series.len(),
            raw_a = closes_a.len(),
            raw_b = closes_b.len(),
            "joined provider series"
        );

        if !series.is_empty() {
            if let Err(e) = self.cache.write(&series) {
                warn!(error = %e, path = %self.cache.path().display(), "could not save price cache");
            }
        }

        Ok(series)
    }

    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>, PipelineError> {
        self.source
            .daily_closes(symbol, start, end)
            .await
            .map_err(|e| PipelineError::DataUnavailable(format!("{symbol}: {e:#}")))
    }
}

/// Inner-join two close lists by date. Later duplicates of a date win; rows
/// where either side lacks a usable price are dropped.
pub fn join_closes(instruments: InstrumentPair, a: &[DailyClose], b: &[DailyClose]) -> Series {
    let by_date = |closes: &[DailyClose]| -> BTreeMap<NaiveDate, Option<f64>> {
        closes.iter().map(|c| (c.date, c.close)).collect()
    };
    let map_a = by_date(a);
    let map_b = by_date(b);

    let points = map_a
        .iter()
        .filter_map(|(date, close_a)| {
            let price_a = usable(*close_a)?;
            let price_b = usable(*map_b.get(date)?)?;
            Some(PricePoint::new(*date, price_a, price_b))
        })
        .collect();

    Series::from_points(instruments, points)
}

fn usable(close: Option<f64>) -> Option<f64> {
    close.filter(|c| c.is_finite() && *c > 0.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory provider keyed by symbol; unknown symbols fail.
    #[derive(Default)]
    pub(crate) struct StaticSource {
        pub data: HashMap<String, Vec<DailyClose>>,
        pub calls: Mutex<usize>,
    }

    impl StaticSource {
        pub(crate) fn with(symbol: &str, closes: Vec<DailyClose>) -> Self {
            let mut s = Self::default();
            s.data.insert(symbol.to_string(), closes);
            s
        }

        pub(crate) fn and(mut self, symbol: &str, closes: Vec<DailyClose>) -> Self {
            self.data.insert(symbol.to_string(), closes);
            self
        }
    }

    #[async_trait]
    impl PriceSource for StaticSource {
        async fn daily_closes(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<DailyClose>> {
            *self.calls.lock() += 1;
            self.data
                .get(symbol)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("unknown symbol {symbol}"))
        }
    }

    pub(crate) fn close(day: u32, value: Option<f64>) -> DailyClose {
        DailyClose {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close: value,
        }
    }

    pub(crate) fn temp_config() -> RuntimeConfig {
        RuntimeConfig {
            cache_path: std::env::temp_dir()
                .join(format!("bullion-store-{}.csv", uuid::Uuid::new_v4())),
            ..RuntimeConfig::default()
        }
    }

    fn pair() -> InstrumentPair {
        InstrumentPair::new("XAU", "XAG")
    }

    #[test]
    fn join_keeps_only_common_dates() {
        let a = vec![close(1, Some(10.0)), close(2, Some(11.0)), close(3, Some(12.0))];
        let b = vec![close(2, Some(1.0)), close(3, Some(1.5)), close(4, Some(2.0))];
        let s = join_closes(pair(), &a, &b);
        let days: Vec<u32> = s.rows().iter().map(|r| chrono::Datelike::day(&r.point.date)).collect();
        assert_eq!(days, vec![2, 3]);
    }

    #[test]
    fn join_drops_missing_and_invalid_prices() {
        let a = vec![
            close(1, None),
            close(2, Some(f64::NAN)),
            close(3, Some(12.0)),
            close(4, Some(13.0)),
        ];
        let b = vec![
            close(1, Some(1.0)),
            close(2, Some(1.0)),
            close(3, Some(0.0)),
            close(4, Some(2.0)),
        ];
        let s = join_closes(pair(), &a, &b);
        assert_eq!(s.len(), 1);
        assert_eq!(s.rows()[0].point.price_a, 13.0);
    }

    #[test]
    fn join_sorts_and_dedups_unordered_input() {
        let a = vec![close(3, Some(3.0)), close(1, Some(1.0)), close(3, Some(30.0))];
        let b = vec![close(1, Some(1.0)), close(3, Some(1.0))];
        let s = join_closes(pair(), &a, &b);
        assert_eq!(s.prices_a(), vec![1.0, 30.0]);
    }

    #[tokio::test]
    async fn load_fetches_then_serves_from_cache() {
        let config = temp_config();
        let source = Arc::new(
            StaticSource::with("GC=F", vec![close(1, Some(2000.0)), close(2, Some(2010.0))])
                .and("SI=F", vec![close(1, Some(25.0)), close(2, Some(25.5))]),
        );
        let store = SeriesStore::new(source.clone(), &config);

        let first = store.load().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(*source.calls.lock(), 2);

        let second = store.load().await.unwrap();
        assert_eq!(second.points(), first.points());
        assert_eq!(*source.calls.lock(), 2, "second load should hit the cache");

        let _ = std::fs::remove_file(&config.cache_path);
    }

    #[tokio::test]
    async fn empty_join_returns_empty_series_without_caching() {
        let config = temp_config();
        let source = Arc::new(
            StaticSource::with("GC=F", vec![close(1, Some(2000.0))])
                .and("SI=F", vec![close(2, Some(25.0))]),
        );
        let store = SeriesStore::new(source, &config);

        let series = store.load().await.unwrap();
        assert!(series.is_empty());
        assert!(!config.cache_path.exists());
    }

    #[tokio::test]
    async fn cache_write_failure_still_returns_series() {
        let config = RuntimeConfig {
            cache_path: std::env::temp_dir()
                .join(format!("bullion-missing-{}", uuid::Uuid::new_v4()))
                .join("historical_data.csv"),
            ..RuntimeConfig::default()
        };
        let source = Arc::new(
            StaticSource::with("GC=F", vec![close(1, Some(2000.0)), close(2, Some(2010.0))])
                .and("SI=F", vec![close(1, Some(25.0)), close(2, Some(25.5))]),
        );
        let store = SeriesStore::new(source, &config);

        let series = store.load().await.unwrap();
        assert_eq!(series.prices_a(), vec![2000.0, 2010.0]);
        assert!(!config.cache_path.exists());
    }

    #[tokio::test]
    async fn provider_failure_is_data_unavailable() {
        let config = temp_config();
        let source = Arc::new(StaticSource::with("GC=F", vec![close(1, Some(2000.0))]));
        let store = SeriesStore::new(source, &config);

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable(ref m) if m.contains("SI=F")));
    }

    #[tokio::test]
    async fn corrupt_cache_falls_back_to_fetch() {
        let config = temp_config();
        std::fs::write(&config.cache_path, "not,a,cache\n").unwrap();
        let source = Arc::new(
            StaticSource::with("GC=F", vec![close(1, Some(2000.0))])
                .and("SI=F", vec![close(1, Some(25.0))]),
        );
        let store = SeriesStore::new(source.clone(), &config);

        let series = store.load().await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(*source.calls.lock(), 2);
        let _ = std::fs::remove_file(&config.cache_path);
    }
}

// =============================================================================
// Remote price providers
// =============================================================================

pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub use yahoo::YahooClient;

/// One daily close as reported by the provider. `close` is `None` when the
/// provider returned a null or non-numeric value for that day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

/// Source of daily closing prices for a ticker symbol.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>>;
}

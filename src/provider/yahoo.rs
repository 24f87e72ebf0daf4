// =============================================================================
// Yahoo Finance chart API client — daily closes for futures tickers
// =============================================================================
//
// Only the public chart endpoint is used; no credentials are involved. The
// response is deserialised into typed structs once, so a schema change fails
// loudly here instead of surfacing as missing fields downstream.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::provider::{DailyClose, PriceSource};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; bullion-lens/1.0)";

/// Daily bars are stamped at the session open in exchange time. Shifting to
/// midday keeps the calendar date stable when the request-time offset is an
/// hour away from the offset in force at the bar.
const MIDDAY_SECS: i64 = 12 * 60 * 60;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds at request time. It does not
    /// follow daylight-saving changes inside the requested range.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    /// GET /v8/finance/chart/{symbol} with a daily interval.
    #[instrument(skip(self), name = "yahoo::daily_closes")]
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("GET chart for {symbol} request failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read chart response for {symbol}"))?;

        if !status.is_success() {
            anyhow::bail!("Yahoo chart for {} returned {}: {}", symbol, status, body);
        }

        let closes = parse_chart(symbol, &body)?;
        debug!(symbol, count = closes.len(), "daily closes fetched");
        Ok(closes)
    }
}

/// Parse a chart response body into dated closes.
fn parse_chart(symbol: &str, body: &str) -> Result<Vec<DailyClose>> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .with_context(|| format!("unexpected chart response shape for {symbol}"))?;

    if let Some(err) = envelope.chart.error {
        anyhow::bail!("Yahoo chart error for {}: {} ({})", symbol, err.description, err.code);
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .with_context(|| format!("chart response for {symbol} has no result"))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() {
        warn!(
            symbol,
            timestamps = result.timestamp.len(),
            closes = closes.len(),
            "chart arrays differ in length — truncating to the shorter"
        );
    }

    let mut out = Vec::with_capacity(result.timestamp.len());
    for (ts, close) in result.timestamp.iter().zip(closes) {
        let Some(local) = DateTime::from_timestamp(ts + result.meta.gmtoffset + MIDDAY_SECS, 0)
        else {
            warn!(symbol, ts, "skipping out-of-range timestamp");
            continue;
        };
        out.push(DailyClose {
            date: local.date_naive(),
            close: close.filter(|c| c.is_finite()),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timestamps_with_exchange_offset() {
        // 2024-05-01 04:00:00 UTC is midnight in New York (-4h).
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":-14400},
            "timestamp":[1714536000,1714622400],
            "indicators":{"quote":[{"close":[2303.9,null]}]}}],"error":null}}"#;
        let closes = parse_chart("GC=F", body).unwrap();
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(closes[0].close, Some(2303.9));
        assert_eq!(closes[1].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(closes[1].close, None);
    }

    #[test]
    fn summer_bars_keep_their_date_under_winter_offset() {
        // 2024-05-01 00:00 EDT (04:00 UTC), fetched while New York is on EST.
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":-18000},
            "timestamp":[1714536000,1709269200],
            "indicators":{"quote":[{"close":[2303.9,2095.7]}]}}],"error":null}}"#;
        let closes = parse_chart("GC=F", body).unwrap();
        assert_eq!(closes[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        // 2024-03-01 00:00 EST (05:00 UTC) under the same offset.
        assert_eq!(closes[1].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn winter_bars_keep_their_date_under_summer_offset() {
        // 2024-01-02 00:00 EST (05:00 UTC), fetched while New York is on EDT.
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":-14400},
            "timestamp":[1704171600],
            "indicators":{"quote":[{"close":[2073.4]}]}}],"error":null}}"#;
        let closes = parse_chart("GC=F", body).unwrap();
        assert_eq!(closes[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn provider_error_is_surfaced() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("XX=F", body).unwrap_err();
        assert!(format!("{err}").contains("delisted"));
    }

    #[test]
    fn empty_result_is_an_error() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        assert!(parse_chart("GC=F", body).is_err());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_chart("GC=F", "<html>rate limited</html>").is_err());
    }

    #[test]
    fn missing_timestamps_yield_no_rows() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse_chart("GC=F", body).unwrap().is_empty());
    }
}

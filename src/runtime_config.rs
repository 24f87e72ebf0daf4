// =============================================================================
// Runtime Configuration — Instruments, cache windows and payload limits
// =============================================================================
//
// Every tunable lives here. All fields carry `#[serde(default)]` so a partial
// (or empty) JSON file still loads, and a missing file falls back to the
// defaults in `main`.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_instrument_a() -> InstrumentConfig {
    InstrumentConfig {
        label: "XAU".to_string(),
        symbol: "GC=F".to_string(),
    }
}

fn default_instrument_b() -> InstrumentConfig {
    InstrumentConfig {
        label: "XAG".to_string(),
        symbol: "SI=F".to_string(),
    }
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_lookback_days() -> i64 {
    730
}

fn default_cache_path() -> PathBuf {
    std::env::temp_dir().join("historical_data.csv")
}

fn default_cache_ttl_secs() -> u64 {
    12 * 60 * 60
}

fn default_snapshot_ttl_secs() -> u64 {
    60 * 60
}

fn default_event_threshold() -> f64 {
    0.05
}

fn default_level_window() -> usize {
    300
}

fn default_daily_payload_limit() -> usize {
    300
}

fn default_weekly_payload_limit() -> usize {
    104
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

// =============================================================================
// InstrumentConfig
// =============================================================================

/// A tracked instrument: the display label used in payload keys and the
/// provider ticker used to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub label: String,
    pub symbol: String,
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Instruments --------------------------------------------------------

    /// Primary instrument (drives trend, events, forecast and momentum).
    #[serde(default = "default_instrument_a")]
    pub instrument_a: InstrumentConfig,

    /// Secondary instrument (ratio denominator).
    #[serde(default = "default_instrument_b")]
    pub instrument_b: InstrumentConfig,

    // --- Provider -----------------------------------------------------------

    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Trailing window fetched from the provider, in calendar days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    // --- Caching ------------------------------------------------------------

    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Maximum age of the on-disk price cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum age of the in-memory analysis snapshot.
    #[serde(default = "default_snapshot_ttl_secs")]
    pub snapshot_ttl_secs: u64,

    // --- Analysis -----------------------------------------------------------

    /// Month-over-month move (fraction) that qualifies as a market event.
    #[serde(default = "default_event_threshold")]
    pub event_threshold: f64,

    /// Trailing points used for support/resistance.
    #[serde(default = "default_level_window")]
    pub level_window: usize,

    #[serde(default = "default_daily_payload_limit")]
    pub daily_payload_limit: usize,

    #[serde(default = "default_weekly_payload_limit")]
    pub weekly_payload_limit: usize,

    // --- Server -------------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            instrument_a: default_instrument_a(),
            instrument_b: default_instrument_b(),
            provider_base_url: default_provider_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            lookback_days: default_lookback_days(),
            cache_path: default_cache_path(),
            cache_ttl_secs: default_cache_ttl_secs(),
            snapshot_ttl_secs: default_snapshot_ttl_secs(),
            event_threshold: default_event_threshold(),
            level_window: default_level_window(),
            daily_payload_limit: default_daily_payload_limit(),
            weekly_payload_limit: default_weekly_payload_limit(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            instrument_a = %config.instrument_a.symbol,
            instrument_b = %config.instrument_b.symbol,
            "runtime config loaded"
        );

        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn snapshot_ttl(&self) -> Duration {
        Duration::from_secs(self.snapshot_ttl_secs)
    }
}

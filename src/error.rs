// =============================================================================
// Error taxonomy
// =============================================================================
//
// `PipelineError` is the only failure that aborts an analysis run. Cache
// problems are `CacheError`s: callers log them and carry on. Derived
// computations that lack history never error; they return their own
// "Insufficient Data" sentinel instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Remote fetch failed or the joined series has no usable rows.
    #[error("price data unavailable: {0}")]
    DataUnavailable(String),
}

/// Local persistence failures for the on-disk price cache. Always non-fatal.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache format error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cache file is missing column {0:?}")]
    MissingColumn(String),

    #[error("cache line {line}: invalid {field} value {value:?}")]
    BadValue {
        line: usize,
        field: &'static str,
        value: String,
    },
}

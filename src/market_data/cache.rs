// =============================================================================
// On-disk price cache (CSV: Date,<A>,<B>)
// =============================================================================
//
// Writes use the tmp + rename pattern so a crash mid-write never leaves a
// truncated cache behind. Readers locate columns by header name and ignore
// any extra columns.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::CacheError;
use crate::market_data::series::{InstrumentPair, PricePoint, Series};

const DATE_COLUMN: &str = "Date";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct PriceCache {
    path: PathBuf,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the cache file exists and was modified within the TTL.
    pub fn is_fresh(&self) -> Result<bool, CacheError> {
        let modified = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        // A modification time in the future counts as fresh.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        Ok(age < self.ttl)
    }

    /// Read the cached series if it is fresh. `Ok(None)` means absent or stale.
    pub fn read_fresh(&self, instruments: &InstrumentPair) -> Result<Option<Series>, CacheError> {
        if !self.is_fresh()? {
            return Ok(None);
        }
        self.read(instruments).map(Some)
    }

    pub fn read(&self, instruments: &InstrumentPair) -> Result<Series, CacheError> {
        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CacheError::MissingColumn(name.to_string()))
        };
        let date_idx = column(DATE_COLUMN)?;
        let a_idx = column(instruments.a.as_str())?;
        let b_idx = column(instruments.b.as_str())?;

        let mut points = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            // +2: header line plus 1-based numbering.
            let line = idx + 2;
            let field = |i: usize| record.get(i).unwrap_or("");

            let raw_date = field(date_idx);
            // Tolerate datetime strings like "2024-03-01 00:00:00".
            let date_part = raw_date.get(..10).unwrap_or(raw_date);
            let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| {
                CacheError::BadValue {
                    line,
                    field: "date",
                    value: raw_date.to_string(),
                }
            })?;

            let price_a = parse_price(field(a_idx), line)?;
            let price_b = parse_price(field(b_idx), line)?;
            points.push(PricePoint::new(date, price_a, price_b));
        }

        debug!(path = %self.path.display(), rows = points.len(), "price cache read");
        Ok(Series::from_points(instruments.clone(), points))
    }

    /// Persist `series` atomically (write to `.tmp`, then rename).
    pub fn write(&self, series: &Series) -> Result<(), CacheError> {
        let tmp_path = self.path.with_extension("csv.tmp");
        let written = write_csv(&tmp_path, series)
            .and_then(|()| std::fs::rename(&tmp_path, &self.path).map_err(CacheError::from));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }

        debug!(path = %self.path.display(), rows = series.len(), "price cache written");
        Ok(())
    }
}

fn write_csv(path: &Path, series: &Series) -> Result<(), CacheError> {
    let mut writer = csv::Writer::from_path(path)?;
    let pair = series.instruments();
    writer.write_record([DATE_COLUMN, pair.a.as_str(), pair.b.as_str()])?;
    for row in series.rows() {
        let p = row.point;
        writer.write_record([
            p.date.format(DATE_FORMAT).to_string(),
            p.price_a.to_string(),
            p.price_b.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_price(raw: &str, line: usize) -> Result<f64, CacheError> {
    raw.parse::<f64>().map_err(|_| CacheError::BadValue {
        line,
        field: "price",
        value: raw.to_string(),
    })
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Signal;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Display labels of the two instruments a series pairs up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentPair {
    pub a: String,
    pub b: String,
}

impl InstrumentPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }
}

/// One trading day with a closing price for each instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price_a: f64,
    pub price_b: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price_a: f64, price_b: f64) -> Self {
        Self {
            date,
            price_a,
            price_b,
        }
    }
}

/// Indicator values attached to a row. Every numeric field is `None` until
/// enough history exists to compute it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    pub ma20_a: Option<f64>,
    pub ma50_a: Option<f64>,
    pub ma200_a: Option<f64>,
    pub ma20_b: Option<f64>,
    pub ma50_b: Option<f64>,
    pub ma200_b: Option<f64>,
    pub return_a: Option<f64>,
    pub ratio: Option<f64>,
    pub signal: Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub point: PricePoint,
    pub derived: Derived,
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Date-ordered paired price history. Dates are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    instruments: InstrumentPair,
    rows: Vec<SeriesRow>,
}

impl Series {
    pub fn empty(instruments: InstrumentPair) -> Self {
        Self {
            instruments,
            rows: Vec::new(),
        }
    }

    /// Build a series from raw points: sorts ascending and keeps the last
    /// point seen for any repeated date.
    pub fn from_points(instruments: InstrumentPair, points: Vec<PricePoint>) -> Self {
        let mut rows: Vec<SeriesRow> = Vec::with_capacity(points.len());
        let mut indexed: Vec<(usize, PricePoint)> = points.into_iter().enumerate().collect();
        // Stable on (date, arrival order) so the latest duplicate ends up last.
        indexed.sort_by_key(|(i, p)| (p.date, *i));

        for (_, point) in indexed {
            let row = SeriesRow {
                point,
                derived: Derived::default(),
            };
            match rows.last_mut() {
                Some(last) if last.point.date == point.date => *last = row,
                _ => rows.push(row),
            }
        }

        Self { instruments, rows }
    }

    pub fn instruments(&self) -> &InstrumentPair {
        &self.instruments
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [SeriesRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&SeriesRow> {
        self.rows.last()
    }

    /// The most recent `count` rows (all rows when fewer exist).
    pub fn tail(&self, count: usize) -> &[SeriesRow] {
        let start = self.rows.len().saturating_sub(count);
        &self.rows[start..]
    }

    pub fn prices_a(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.point.price_a).collect()
    }

    pub fn prices_b(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.point.price_b).collect()
    }
}

#[cfg(test)]
impl Series {
    pub(crate) fn points(&self) -> Vec<PricePoint> {
        self.rows.iter().map(|r| r.point).collect()
    }
}

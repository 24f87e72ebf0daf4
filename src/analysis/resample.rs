// =============================================================================
// Calendar resampling (month-end and week-ending-Friday)
// =============================================================================
//
// Both resamplers take the last observation inside each period and emit only
// periods that contain at least one observation.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::market_data::Series;

/// Last instrument-A close observed in a calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyClose {
    pub year: i32,
    pub month: u32,
    pub close: f64,
}

impl MonthlyClose {
    /// `YYYY-MM` label.
    pub fn period(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

pub fn monthly_closes(series: &Series) -> Vec<MonthlyClose> {
    let mut out: Vec<MonthlyClose> = Vec::new();
    for row in series.rows() {
        let (year, month) = (row.point.date.year(), row.point.date.month());
        let close = MonthlyClose {
            year,
            month,
            close: row.point.price_a,
        };
        match out.last_mut() {
            Some(last) if last.year == year && last.month == month => *last = close,
            _ => out.push(close),
        }
    }
    out
}

/// One row of the weekly view, labelled with the Friday that closes the week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyRow {
    pub date: NaiveDate,
    pub price_a: f64,
    pub price_b: f64,
    pub ratio: Option<f64>,
}

/// The Friday on or after `date`.
pub fn week_ending_friday(date: NaiveDate) -> NaiveDate {
    let friday = Weekday::Fri.num_days_from_monday() as i64;
    let today = date.weekday().num_days_from_monday() as i64;
    date + Duration::days((friday - today).rem_euclid(7))
}

pub fn weekly(series: &Series) -> Vec<WeeklyRow> {
    let mut out: Vec<WeeklyRow> = Vec::new();
    for row in series.rows() {
        let week = WeeklyRow {
            date: week_ending_friday(row.point.date),
            price_a: row.point.price_a,
            price_b: row.point.price_b,
            ratio: row.derived.ratio,
        };
        match out.last_mut() {
            Some(last) if last.date == week.date => *last = week,
            _ => out.push(week),
        }
    }
    out
}

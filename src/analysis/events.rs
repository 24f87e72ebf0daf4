// =============================================================================
// Event Detector — large month-over-month moves of instrument A
// =============================================================================
//
// Month-end closes are compared with the previous month-end close. Moves
// strictly beyond ±threshold become events; strictly beyond ±8% they are
// rated High. Output is newest first.

use serde::Serialize;
use tracing::debug;

use crate::analysis::resample::monthly_closes;
use crate::market_data::Series;
use crate::types::{EventKind, Severity};

pub const DEFAULT_THRESHOLD: f64 = 0.05;
pub const HIGH_SEVERITY_THRESHOLD: f64 = 0.08;

/// Serialised with the dashboard's keys: `Type`, `Date`, `Description`,
/// `Significance`, plus `magnitude`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketEvent {
    #[serde(rename = "Type")]
    pub kind: EventKind,
    /// `YYYY-MM` of the month whose close completed the move.
    #[serde(rename = "Date")]
    pub period: String,
    /// Signed move in percent.
    pub magnitude: f64,
    #[serde(rename = "Significance")]
    pub severity: Severity,
    #[serde(rename = "Description")]
    pub description: String,
}

pub fn detect(series: &Series, threshold: f64) -> Vec<MarketEvent> {
    let months = monthly_closes(series);

    let mut events: Vec<MarketEvent> = months
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (pair[0], pair[1]);
            if prev.close == 0.0 {
                return None;
            }
            let change = (curr.close - prev.close) / prev.close;
            classify_move(change, threshold).map(|(kind, severity)| MarketEvent {
                kind,
                period: curr.period(),
                magnitude: change * 100.0,
                severity,
                description: describe(kind, change),
            })
        })
        .collect();

    events.reverse();
    debug!(months = months.len(), events = events.len(), "market events detected");
    events
}

fn classify_move(change: f64, threshold: f64) -> Option<(EventKind, Severity)> {
    if change > threshold {
        let severity = if change > HIGH_SEVERITY_THRESHOLD {
            Severity::High
        } else {
            Severity::Medium
        };
        Some((EventKind::Rally, severity))
    } else if change < -threshold {
        let severity = if change < -HIGH_SEVERITY_THRESHOLD {
            Severity::High
        } else {
            Severity::Medium
        };
        Some((EventKind::Correction, severity))
    } else {
        None
    }
}

fn describe(kind: EventKind, change: f64) -> String {
    match kind {
        EventKind::Rally => format!("Strong monthly gain of {:.1}%", change * 100.0),
        EventKind::Correction => format!("Market correction of {:.1}%", change * 100.0),
    }
}

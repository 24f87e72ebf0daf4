// =============================================================================
// Level Detector — support / resistance over a trailing window
// =============================================================================

use std::collections::BTreeMap;

use serde::Serialize;

use crate::market_data::Series;

pub const DEFAULT_WINDOW: usize = 300;

/// Support and resistance for one instrument. Each list holds at most one
/// level and is empty when there is no data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstrumentLevels {
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
}

impl InstrumentLevels {
    fn from_prices(prices: impl Iterator<Item = f64>) -> Self {
        let finite = prices.filter(|p| p.is_finite());
        let bounds = finite.fold(None, |acc: Option<(f64, f64)>, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        });
        match bounds {
            Some((lo, hi)) => Self {
                supports: vec![lo],
                resistances: vec![hi],
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
impl InstrumentLevels {
    pub(crate) fn support(&self) -> Option<f64> {
        self.supports.first().copied()
    }

    pub(crate) fn resistance(&self) -> Option<f64> {
        self.resistances.first().copied()
    }
}

/// Levels keyed by lowercase instrument label (e.g. `xau`, `xag`).
pub type Levels = BTreeMap<String, InstrumentLevels>;

pub fn levels(series: &Series, window: usize) -> Levels {
    let recent = series.tail(window);
    let pair = series.instruments();

    let mut out = Levels::new();
    out.insert(
        pair.a.to_lowercase(),
        InstrumentLevels::from_prices(recent.iter().map(|r| r.point.price_a)),
    );
    out.insert(
        pair.b.to_lowercase(),
        InstrumentLevels::from_prices(recent.iter().map(|r| r.point.price_b)),
    );
    out
}

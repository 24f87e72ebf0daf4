pub mod cache;
pub mod series;
pub mod store;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Series`).
pub use series::{Derived, InstrumentPair, PricePoint, Series, SeriesRow};
pub use store::SeriesStore;

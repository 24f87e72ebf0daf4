// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators attached to each
// series row. Outputs are index-aligned with their inputs and use `Option` for
// positions where a value is not yet defined.

pub mod enrich;
pub mod returns;
pub mod sma;

pub use enrich::enrich;

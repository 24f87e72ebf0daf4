// =============================================================================
// Shared types used across the Bullion Lens analysis pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

/// Discrete market state derived from the latest MA alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    Bullish,
    Bearish,
    Sideways,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Sideways => write!(f, "Sideways"),
            Self::InsufficientData => write!(f, "Insufficient Data"),
        }
    }
}

/// Direction of a large monthly move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Rally,
    Correction,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rally => write!(f, "Rally"),
            Self::Correction => write!(f, "Correction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
}

/// Forecast bias label. `InsufficientData` is the no-projection sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outlook {
    #[serde(rename = "Bullish Bias")]
    BullishBias,
    #[serde(rename = "Bearish Bias")]
    BearishBias,
    Neutral,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl std::fmt::Display for Outlook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BullishBias => write!(f, "Bullish Bias"),
            Self::BearishBias => write!(f, "Bearish Bias"),
            Self::Neutral => write!(f, "Neutral"),
            Self::InsufficientData => write!(f, "Insufficient Data"),
        }
    }
}

/// Per-row educational signal based on where price sits relative to MA50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "Technical Bullish Zone (Entry Watch)")]
    BullishZone,
    #[serde(rename = "Technical Bearish Zone (Exit/Wait)")]
    BearishZone,
    #[default]
    #[serde(rename = "Hold/Neutral")]
    Neutral,
}

//! Market-context verdict computed from the anchor instrument.

use super::StructureBias;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendState {
    StrongBull,
    StrongBear,
    Sideways,
    Unstable,
}

impl fmt::Display for TrendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendState::StrongBull => "STRONG_BULL",
            TrendState::StrongBear => "STRONG_BEAR",
            TrendState::Sideways => "SIDEWAYS",
            TrendState::Unstable => "UNSTABLE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityRegime {
    High,
    Normal,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionQuality {
    High,
    Medium,
    Low,
}

impl fmt::Display for SessionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionQuality::High => "HIGH",
            SessionQuality::Medium => "MEDIUM",
            SessionQuality::Low => "LOW",
        })
    }
}

/// Raw anchor readings the verdict was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextMetrics {
    pub price: f64,
    pub adx: f64,
    pub atr: f64,
    pub atr_ratio: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub bias: StructureBias,
    /// Epoch seconds of the anchor's latest trigger-timeframe candle.
    pub as_of: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextVerdict {
    pub anchor: String,
    pub trend: TrendState,
    /// ADX of the structure timeframe, clamped to [0, 100].
    pub trend_strength: f64,
    pub volatility: VolatilityRegime,
    pub session_quality: SessionQuality,
    pub should_trade: bool,
    pub metrics: ContextMetrics,
}

//! Trend classification of the anchor instrument.
//!
//! Decision table, first match wins:
//! 0. ATR / close above `blowout_ratio` → Unstable
//! 1. ADX ≥ `strong_trend_adx`: fast EMA above slow → StrongBull, below → StrongBear
//! 2. ADX < `weak_trend_adx` → Sideways
//! 3. anything else → Unstable
//!
//! The blow-out check runs first: an unstable tape overrides any trend reading.

use crate::config::ContextParams;
use crate::domain::TrendState;

/// Structure-timeframe readings the trend is classified from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendReading {
    pub adx: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub atr: f64,
    pub close: f64,
}

impl TrendReading {
    pub fn atr_ratio(&self) -> f64 {
        super::volatility::atr_ratio(self.atr, self.close)
    }
}

pub fn classify_trend(reading: &TrendReading, params: &ContextParams) -> TrendState {
    let values = [
        reading.adx,
        reading.ema_fast,
        reading.ema_slow,
        reading.atr,
        reading.close,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return TrendState::Unstable;
    }

    if reading.atr_ratio() > params.blowout_ratio {
        return TrendState::Unstable;
    }

    if reading.adx >= params.strong_trend_adx {
        if reading.ema_fast > reading.ema_slow {
            return TrendState::StrongBull;
        }
        if reading.ema_fast < reading.ema_slow {
            return TrendState::StrongBear;
        }
    }

    if reading.adx < params.weak_trend_adx {
        return TrendState::Sideways;
    }

    TrendState::Unstable
}

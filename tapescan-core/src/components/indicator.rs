//! Indicator trait and the typed per-pair indicator record.
//!
//! Indicators are pure functions: candle history in, numeric series out.
//! They are computed once per (instrument, timeframe) pair during the
//! INDICATE stage and only read afterwards.

use crate::config::IndicatorParams;
use crate::domain::Candle;
use crate::indicators::adx::directional_movement;
use crate::indicators::{Atr, Ema, Rsi, SessionVwap, Vwap};
use serde::Serialize;

/// Trait for indicators.
///
/// Indicators take a full candle series and produce a numeric output series
/// of the same length. The first `lookback()` values are `f64::NAN` (warm-up).
///
/// # Look-ahead contamination guard
/// No indicator value at candle t may depend on data from candle t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of candles needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire candle series.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Every indicator the engine reads, aligned index-for-index with the candles.
///
/// Warm-up positions hold NaN internally and surface as `None` through the
/// accessors, so a missing value can never be mistaken for a zero reading.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndicatorSet {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub atr: Vec<f64>,
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub rsi: Vec<f64>,
    pub vwap: Vec<f64>,
    pub session_vwap: Vec<f64>,
}

/// Selects one series of an `IndicatorSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    EmaFast,
    EmaSlow,
    Atr,
    Adx,
    PlusDi,
    MinusDi,
    Rsi,
    Vwap,
    SessionVwap,
}

impl Series {
    pub const ALL: [Series; 9] = [
        Series::EmaFast,
        Series::EmaSlow,
        Series::Atr,
        Series::Adx,
        Series::PlusDi,
        Series::MinusDi,
        Series::Rsi,
        Series::Vwap,
        Series::SessionVwap,
    ];
}

impl IndicatorSet {
    /// Compute every series for one candle window.
    pub fn compute(candles: &[Candle], params: &IndicatorParams) -> Self {
        let directional = directional_movement(candles, params.adx_period);
        Self {
            ema_fast: Ema::new(params.ema_fast).compute(candles),
            ema_slow: Ema::new(params.ema_slow).compute(candles),
            atr: Atr::new(params.atr_period).compute(candles),
            adx: directional.adx,
            plus_di: directional.plus_di,
            minus_di: directional.minus_di,
            rsi: Rsi::new(params.rsi_period).compute(candles),
            vwap: Vwap::new().compute(candles),
            session_vwap: SessionVwap::new(params.session_start_hour).compute(candles),
        }
    }

    pub fn len(&self) -> usize {
        self.ema_fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_fast.is_empty()
    }

    pub fn series(&self, series: Series) -> &[f64] {
        match series {
            Series::EmaFast => &self.ema_fast,
            Series::EmaSlow => &self.ema_slow,
            Series::Atr => &self.atr,
            Series::Adx => &self.adx,
            Series::PlusDi => &self.plus_di,
            Series::MinusDi => &self.minus_di,
            Series::Rsi => &self.rsi,
            Series::Vwap => &self.vwap,
            Series::SessionVwap => &self.session_vwap,
        }
    }

    /// Value at `index`, `None` during warm-up or out of bounds.
    pub fn value_at(&self, series: Series, index: usize) -> Option<f64> {
        self.series(series)
            .get(index)
            .copied()
            .filter(|v| !v.is_nan())
    }

    /// Latest value of a series.
    pub fn last(&self, series: Series) -> Option<f64> {
        self.len()
            .checked_sub(1)
            .and_then(|i| self.value_at(series, i))
    }

    /// Index of the first candle at which every series is defined.
    pub fn first_complete_index(&self) -> Option<usize> {
        (0..self.len()).find(|&i| Series::ALL.iter().all(|&s| self.value_at(s, i).is_some()))
    }

    pub fn last_ema_fast(&self) -> Option<f64> {
        self.last(Series::EmaFast)
    }

    pub fn last_ema_slow(&self) -> Option<f64> {
        self.last(Series::EmaSlow)
    }

    pub fn last_atr(&self) -> Option<f64> {
        self.last(Series::Atr)
    }

    pub fn last_adx(&self) -> Option<f64> {
        self.last(Series::Adx)
    }

    pub fn last_rsi(&self) -> Option<f64> {
        self.last(Series::Rsi)
    }

    /// Change of the fast EMA over the last `lookback` candles.
    pub fn ema_fast_slope(&self, lookback: usize) -> Option<f64> {
        let last = self.len().checked_sub(1)?;
        let earlier = last.checked_sub(lookback)?;
        Some(self.value_at(Series::EmaFast, last)? - self.value_at(Series::EmaFast, earlier)?)
    }
}

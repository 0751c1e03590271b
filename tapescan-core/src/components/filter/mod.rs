//! Master context filter: classifies the anchor instrument's tape and gates
//! every setup in the run.
//!
//! Passed when the trend is directional, the session is liquid enough and
//! volatility is not extreme. Rejected otherwise; the verdict still carries
//! every reading so a suppressed run can be inspected.

pub mod session;
pub mod trend;
pub mod volatility;

pub use session::session_quality;
pub use trend::{classify_trend, TrendReading};
pub use volatility::{atr_ratio, classify_volatility};

use crate::components::indicator::IndicatorSet;
use crate::config::ContextParams;
use crate::domain::{
    Candle, ContextMetrics, ContextVerdict, MarketStructure, SessionQuality, TrendState,
    VolatilityRegime,
};

/// Anchor data the verdict is computed from.
#[derive(Debug, Clone, Copy)]
pub struct ContextInputs<'a> {
    pub anchor: &'a str,
    pub structure_candles: &'a [Candle],
    pub structure_indicators: &'a IndicatorSet,
    pub structure: &'a MarketStructure,
    /// The latest trigger candle fixes the run's as-of time and session.
    pub trigger_candles: &'a [Candle],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextFilter {
    params: ContextParams,
}

impl ContextFilter {
    pub fn new(params: ContextParams) -> Self {
        Self { params }
    }

    pub fn default_params() -> Self {
        Self::new(ContextParams::default())
    }

    pub fn name(&self) -> &str {
        "context_filter"
    }

    pub fn params(&self) -> &ContextParams {
        &self.params
    }

    pub fn evaluate(&self, inputs: &ContextInputs<'_>) -> ContextVerdict {
        let ind = inputs.structure_indicators;
        let price = inputs
            .structure_candles
            .last()
            .map_or(f64::NAN, |c| c.close);
        let reading = TrendReading {
            adx: ind.last_adx().unwrap_or(f64::NAN),
            ema_fast: ind.last_ema_fast().unwrap_or(f64::NAN),
            ema_slow: ind.last_ema_slow().unwrap_or(f64::NAN),
            atr: ind.last_atr().unwrap_or(f64::NAN),
            close: price,
        };

        let trend = classify_trend(&reading, &self.params);
        let ratio = reading.atr_ratio();
        let volatility = classify_volatility(ratio, &self.params);

        let as_of_candle = inputs.trigger_candles.last();
        let session = as_of_candle.map_or(SessionQuality::Low, |c| {
            session_quality(c.utc_hour(), &self.params)
        });
        let trend_strength = if reading.adx.is_finite() {
            reading.adx.clamp(0.0, 100.0)
        } else {
            0.0
        };

        ContextVerdict {
            anchor: inputs.anchor.to_string(),
            trend,
            trend_strength,
            volatility,
            session_quality: session,
            should_trade: should_trade(trend, volatility, session),
            metrics: ContextMetrics {
                price,
                adx: reading.adx,
                atr: reading.atr,
                atr_ratio: ratio,
                ema_fast: reading.ema_fast,
                ema_slow: reading.ema_slow,
                bias: inputs.structure.bias,
                as_of: as_of_candle.map_or(0, |c| c.timestamp),
            },
        }
    }
}

/// The trade gate: directional trend, tradable session, volatility not High.
pub fn should_trade(
    trend: TrendState,
    volatility: VolatilityRegime,
    session: SessionQuality,
) -> bool {
    matches!(trend, TrendState::StrongBull | TrendState::StrongBear)
        && session != SessionQuality::Low
        && volatility != VolatilityRegime::High
}

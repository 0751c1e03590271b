//! Concrete indicator implementations.
//!
//! Every indicator implements the `Indicator` trait from `components::indicator`.
//! They are computed once per (instrument, timeframe) pair into a typed
//! `IndicatorSet` before structure and setup detection read them.
//!
//! ADX exposes its directional lines as separate `DirectionalIndex`
//! instances, keeping the single-series `Indicator` trait unchanged.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod rsi;
pub mod vwap;

pub use adx::{Adx, DirectionalIndex};
pub use atr::Atr;
pub use ema::Ema;
pub use rsi::Rsi;
pub use vwap::{SessionVwap, Vwap};

/// Epoch seconds of 2024-01-01T00:00:00Z, the first timestamp of test candles.
#[cfg(test)]
pub const TEST_EPOCH: i64 = 1_704_067_200;

/// Create synthetic hourly candles from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: TEST_EPOCH + i as i64 * 3600,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create hourly candles from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Candle {
            timestamp: TEST_EPOCH + i as i64 * 3600,
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Ramp to 194, then a range whose lows revisit ~186 three times.
#[cfg(test)]
pub fn ramp_then_range() -> Vec<(f64, f64, f64, f64)> {
    let mut data: Vec<(f64, f64, f64, f64)> = (0..48)
        .map(|i| {
            let close = 100.0 + 2.0 * i as f64;
            let open = close - 2.0;
            (open, close + 0.5, open - 0.5, close)
        })
        .collect();
    data.extend_from_slice(&[
        (194.0, 194.5, 186.0, 188.0),
        (188.0, 192.0, 187.5, 191.0),
        (191.0, 194.0, 189.0, 193.0),
        (193.0, 195.0, 190.0, 191.0),
        (191.0, 191.5, 186.2, 188.0),
        (188.0, 192.0, 187.6, 191.5),
        (191.5, 195.5, 190.5, 194.5),
        (194.5, 195.0, 189.5, 190.0),
        (190.0, 190.5, 185.9, 188.5),
        (188.5, 193.0, 188.0, 192.5),
        (192.5, 194.0, 189.0, 190.0),
        (190.0, 190.5, 186.5, 187.5),
    ]);
    data
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

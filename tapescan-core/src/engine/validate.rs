//! Candle sequence validation. Bad input aborts the run; nothing is repaired.

use crate::domain::{Candle, Timeframe};
use crate::error::EngineError;

/// Reject non-ascending or duplicate timestamps, gaps wider than one step,
/// and candles with impossible prices or volume.
pub fn validate_candles(
    instrument: &str,
    timeframe: Timeframe,
    candles: &[Candle],
) -> Result<(), EngineError> {
    let invalid = |index: usize, reason: String| EngineError::InvalidCandleSequence {
        instrument: instrument.to_string(),
        timeframe,
        index,
        reason,
    };
    let step = timeframe.step_secs();

    for (i, candle) in candles.iter().enumerate() {
        if !candle.is_sane() {
            return Err(invalid(
                i,
                format!(
                    "malformed candle o={} h={} l={} c={} v={}",
                    candle.open, candle.high, candle.low, candle.close, candle.volume
                ),
            ));
        }
        if i == 0 {
            continue;
        }
        let delta = candle.timestamp - candles[i - 1].timestamp;
        if delta <= 0 {
            return Err(invalid(
                i,
                format!("timestamp {} does not advance", candle.timestamp),
            ));
        }
        if delta > step {
            return Err(invalid(
                i,
                format!("gap of {delta}s exceeds one {timeframe} step"),
            ));
        }
    }
    Ok(())
}

/// The window must be long enough for every indicator to produce a value.
pub fn ensure_sufficient(
    instrument: &str,
    timeframe: Timeframe,
    candles: &[Candle],
    required: usize,
) -> Result<(), EngineError> {
    if candles.len() < required {
        return Err(EngineError::InsufficientData {
            instrument: instrument.to_string(),
            timeframe,
            required,
            available: candles.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn index_of(err: EngineError) -> usize {
        match err {
            EngineError::InvalidCandleSequence { index, .. } => index,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn contiguous_series_passes() {
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        assert!(validate_candles("BTC", Timeframe::H1, &candles).is_ok());
        assert!(validate_candles("BTC", Timeframe::H1, &[]).is_ok());
    }

    #[test]
    fn gap_is_rejected() {
        let mut candles = make_candles(&[100.0, 101.0, 102.0, 103.0]);
        candles[3].timestamp += 3600;
        let err = validate_candles("BTC", Timeframe::H1, &candles).unwrap_err();
        assert!(err.to_string().contains("gap of 7200s"));
        assert_eq!(index_of(err), 3);
    }

    #[test]
    fn duplicate_timestamp_is_rejected() {
        let mut candles = make_candles(&[100.0, 101.0, 102.0]);
        candles[2].timestamp = candles[1].timestamp;
        assert_eq!(index_of(validate_candles("BTC", Timeframe::H1, &candles).unwrap_err()), 2);
    }

    #[test]
    fn malformed_candle_is_rejected() {
        let mut candles = make_candles(&[100.0, 101.0, 102.0]);
        candles[1].close = f64::NAN;
        assert_eq!(index_of(validate_candles("BTC", Timeframe::H1, &candles).unwrap_err()), 1);

        let mut negative = make_candles(&[100.0, 101.0]);
        negative[0].volume = -1.0;
        assert_eq!(index_of(validate_candles("BTC", Timeframe::H1, &negative).unwrap_err()), 0);
    }

    #[test]
    fn wider_timeframe_allows_wider_step() {
        let mut candles = make_candles(&[100.0, 101.0, 102.0]);
        for (i, c) in candles.iter_mut().enumerate() {
            c.timestamp = i as i64 * Timeframe::H4.step_secs();
        }
        assert!(validate_candles("BTC", Timeframe::H4, &candles).is_ok());
        assert!(validate_candles("BTC", Timeframe::H1, &candles).is_err());
    }

    #[test]
    fn short_window_is_insufficient() {
        let candles = make_candles(&[100.0; 10]);
        let err = ensure_sufficient("ETH", Timeframe::H4, &candles, 50).unwrap_err();
        match err {
            EngineError::InsufficientData {
                required,
                available,
                ..
            } => {
                assert_eq!(required, 50);
                assert_eq!(available, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(ensure_sufficient("ETH", Timeframe::H4, &candles, 10).is_ok());
    }
}

//! Candle source trait and the in-memory implementation.
//!
//! The engine never fetches or stores data itself; callers hand it a source.

use crate::domain::{Candle, Timeframe};
use crate::error::SourceError;
use std::collections::BTreeMap;

/// Supplier of ascending candle windows.
pub trait CandleSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// The most recent `limit` candles, oldest first.
    fn get_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError>;
}

/// Candles held in memory, keyed by (instrument, timeframe).
#[derive(Debug, Clone, Default)]
pub struct MemoryCandleSource {
    series: BTreeMap<(String, Timeframe), Vec<Candle>>,
}

impl MemoryCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a series, replacing any previous one for the same pair.
    pub fn insert(&mut self, instrument: impl Into<String>, timeframe: Timeframe, candles: Vec<Candle>) {
        self.series.insert((instrument.into(), timeframe), candles);
    }

    pub fn with(mut self, instrument: impl Into<String>, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        self.insert(instrument, timeframe, candles);
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Distinct instruments, sorted.
    pub fn instruments(&self) -> Vec<String> {
        let mut names: Vec<String> = self.series.keys().map(|(i, _)| i.clone()).collect();
        names.dedup();
        names
    }
}

impl CandleSource for MemoryCandleSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn get_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let candles = self
            .series
            .get(&(instrument.to_string(), timeframe))
            .ok_or_else(|| SourceError::NotFound {
                instrument: instrument.to_string(),
                timeframe,
            })?;
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn returns_trailing_window() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let source = MemoryCandleSource::new().with("BTC", Timeframe::H1, make_candles(&closes));
        let window = source.get_candles("BTC", Timeframe::H1, 3).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].close, 107.0);
        assert_eq!(window[2].close, 109.0);

        let all = source.get_candles("BTC", Timeframe::H1, 500).unwrap();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn missing_pair_is_not_found() {
        let source = MemoryCandleSource::new().with("BTC", Timeframe::H1, make_candles(&[1.0]));
        let err = source.get_candles("BTC", Timeframe::H4, 10).unwrap_err();
        assert!(matches!(err, SourceError::NotFound { timeframe: Timeframe::H4, .. }));
    }

    #[test]
    fn instruments_are_distinct() {
        let source = MemoryCandleSource::new()
            .with("ETH", Timeframe::H1, Vec::new())
            .with("BTC", Timeframe::H4, Vec::new())
            .with("BTC", Timeframe::H1, Vec::new());
        assert_eq!(source.instruments(), vec!["BTC".to_string(), "ETH".to_string()]);
        assert_eq!(source.len(), 3);
    }
}

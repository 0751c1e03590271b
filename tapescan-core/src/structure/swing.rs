//! Swing point detection.
//!
//! A candle is a swing high when its high strictly exceeds every other high
//! within `±lookback` candles, and a swing low when its low is strictly below
//! every other low in that window. Candles without a full window on both
//! sides are never swings, so the last `lookback` candles are unconfirmed.

use crate::domain::{Candle, StructureBias, SwingKind, SwingPoint};

/// Swing highs and lows of one window, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Swings {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
}

impl Swings {
    /// Every swing price, highs and lows together.
    pub fn all(&self) -> impl Iterator<Item = &SwingPoint> {
        self.highs.iter().chain(self.lows.iter())
    }
}

/// Detect strict local extrema. `index_offset` is added to each swing's
/// index so callers analysing a sub-window keep positions of the full series.
pub fn detect_swings(candles: &[Candle], lookback: usize, index_offset: usize) -> Swings {
    let mut swings = Swings::default();
    let n = candles.len();
    if lookback == 0 || n < 2 * lookback + 1 {
        return swings;
    }

    for i in lookback..n - lookback {
        let window = || (i - lookback..=i + lookback).filter(move |&j| j != i);
        let c = &candles[i];

        if window().all(|j| c.high > candles[j].high) {
            swings.highs.push(SwingPoint {
                price: c.high,
                timestamp: c.timestamp,
                index: i + index_offset,
                kind: SwingKind::High,
            });
        }
        if window().all(|j| c.low < candles[j].low) {
            swings.lows.push(SwingPoint {
                price: c.low,
                timestamp: c.timestamp,
                index: i + index_offset,
                kind: SwingKind::Low,
            });
        }
    }

    swings.highs.reverse();
    swings.lows.reverse();
    swings
}

/// Compare the two most recent swing highs and lows.
pub fn structure_bias(swings: &Swings) -> StructureBias {
    let (Some(h0), Some(h1), Some(l0), Some(l1)) = (
        swings.highs.first(),
        swings.highs.get(1),
        swings.lows.first(),
        swings.lows.get(1),
    ) else {
        return StructureBias::Mixed;
    };

    if h0.price > h1.price && l0.price > l1.price {
        StructureBias::HigherHighsHigherLows
    } else if h0.price < h1.price && l0.price < l1.price {
        StructureBias::LowerHighsLowerLows
    } else {
        StructureBias::Mixed
    }
}

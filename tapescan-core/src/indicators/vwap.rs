//! Volume-Weighted Average Price.
//!
//! VWAP[t] = Σ(typical_price × volume) / Σ(volume) over candles `0..=t`, with
//! typical_price = (high + low + close) / 3. Positions where the cumulative
//! volume is still zero are undefined.
//!
//! `SessionVwap` restarts both sums at every daily boundary `start_hour:00` UTC.

use crate::components::indicator::Indicator;
use crate::domain::Candle;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        anchored_vwap(candles, |_| 0)
    }
}

#[derive(Debug, Clone)]
pub struct SessionVwap {
    start_hour: u32,
    name: String,
}

impl SessionVwap {
    /// Hours above 23 wrap around the day.
    pub fn new(start_hour: u32) -> Self {
        let start_hour = start_hour % 24;
        Self {
            start_hour,
            name: format!("session_vwap_{start_hour:02}"),
        }
    }

    /// Index of the session a timestamp belongs to.
    fn session_of(&self, timestamp: i64) -> i64 {
        (timestamp - i64::from(self.start_hour) * 3600).div_euclid(SECONDS_PER_DAY)
    }
}

impl Indicator for SessionVwap {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        anchored_vwap(candles, |c| self.session_of(c.timestamp))
    }
}

/// Cumulative VWAP that resets whenever `anchor_key` changes between candles.
fn anchored_vwap<F>(candles: &[Candle], anchor_key: F) -> Vec<f64>
where
    F: Fn(&Candle) -> i64,
{
    let mut result = vec![f64::NAN; candles.len()];
    let mut pv = 0.0;
    let mut vol = 0.0;
    let mut current = None;

    for (i, candle) in candles.iter().enumerate() {
        let key = anchor_key(candle);
        if current != Some(key) {
            current = Some(key);
            pv = 0.0;
            vol = 0.0;
        }
        if candle.volume.is_nan() || candle.volume < 0.0 {
            continue;
        }
        pv += candle.typical_price() * candle.volume;
        vol += candle.volume;
        if vol > 0.0 {
            result[i] = pv / vol;
        }
    }

    result
}

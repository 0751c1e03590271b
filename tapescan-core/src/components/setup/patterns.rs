//! Candlestick patterns and liquidity sweeps on the trigger timeframe.
//!
//! All detectors look at the last one to three candles of the slice only.

use crate::config::SetupParams;
use crate::domain::{Candle, Direction};
use std::fmt;

/// Maximum relative distance between a hammer/shooting-star close and its zone.
const PIN_BAR_ZONE_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    BullishEngulfing,
    BearishEngulfing,
    Hammer,
    ShootingStar,
    ThreeBullish,
    ThreeBearish,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pattern::BullishEngulfing => "bullish engulfing",
            Pattern::BearishEngulfing => "bearish engulfing",
            Pattern::Hammer => "hammer",
            Pattern::ShootingStar => "shooting star",
            Pattern::ThreeBullish => "three bullish candles",
            Pattern::ThreeBearish => "three bearish candles",
        })
    }
}

fn last_two(candles: &[Candle]) -> Option<(&Candle, &Candle)> {
    match candles {
        [.., prev, curr] => Some((prev, curr)),
        _ => None,
    }
}

/// Bearish candle followed by a larger bullish body that engulfs it.
pub fn bullish_engulfing(candles: &[Candle], body_ratio: f64) -> bool {
    let Some((prev, curr)) = last_two(candles) else {
        return false;
    };
    prev.is_bearish()
        && curr.is_bullish()
        && curr.body() > prev.body() * body_ratio
        && curr.open <= prev.close
        && curr.close >= prev.open
}

pub fn bearish_engulfing(candles: &[Candle], body_ratio: f64) -> bool {
    let Some((prev, curr)) = last_two(candles) else {
        return false;
    };
    prev.is_bullish()
        && curr.is_bearish()
        && curr.body() > prev.body() * body_ratio
        && curr.open >= prev.close
        && curr.close <= prev.open
}

fn near_zone(close: f64, zone: Option<f64>) -> bool {
    match zone {
        Some(z) if z > 0.0 => (close - z).abs() / z <= PIN_BAR_ZONE_DISTANCE,
        Some(_) => false,
        None => true,
    }
}

/// Long lower wick (≥ 2× body), small upper wick, body in the upper part of
/// the range. With a zone, the close must also sit within 1% of it.
pub fn hammer(candle: &Candle, support: Option<f64>) -> bool {
    let body = candle.body();
    if body == 0.0 {
        return false;
    }
    let body_top = candle.open.max(candle.close);
    let lower_wick = candle.open.min(candle.close) - candle.low;
    let upper_wick = candle.high - body_top;
    lower_wick >= body * 2.0
        && upper_wick <= body * 0.5
        && body_top >= candle.high - body * 0.5
        && near_zone(candle.close, support)
}

pub fn shooting_star(candle: &Candle, resistance: Option<f64>) -> bool {
    let body = candle.body();
    if body == 0.0 {
        return false;
    }
    let body_bottom = candle.open.min(candle.close);
    let upper_wick = candle.high - candle.open.max(candle.close);
    let lower_wick = body_bottom - candle.low;
    upper_wick >= body * 2.0
        && lower_wick <= body * 0.5
        && body_bottom <= candle.low + body * 0.5
        && near_zone(candle.close, resistance)
}

/// Three candles in the trade direction with volume never dropping below
/// `volume_step_ratio` of the previous candle.
pub fn three_consecutive(candles: &[Candle], direction: Direction, volume_step_ratio: f64) -> bool {
    let Some(last3) = candles.len().checked_sub(3).map(|start| &candles[start..]) else {
        return false;
    };
    let colour_ok = last3.iter().all(|c| match direction {
        Direction::Long => c.is_bullish(),
        Direction::Short => c.is_bearish(),
    });
    let volume_ok = last3
        .windows(2)
        .all(|w| w[1].volume >= w[0].volume * volume_step_ratio);
    colour_ok && volume_ok
}

/// Every pattern on the last candles that agrees with `direction`.
pub fn patterns_for(
    candles: &[Candle],
    direction: Direction,
    zone: Option<f64>,
    params: &SetupParams,
) -> Vec<Pattern> {
    let Some(last) = candles.last() else {
        return Vec::new();
    };
    let mut found = Vec::new();
    match direction {
        Direction::Long => {
            if bullish_engulfing(candles, params.engulfing_body_ratio) {
                found.push(Pattern::BullishEngulfing);
            }
            if hammer(last, zone) {
                found.push(Pattern::Hammer);
            }
            if three_consecutive(candles, direction, params.volume_step_ratio) {
                found.push(Pattern::ThreeBullish);
            }
        }
        Direction::Short => {
            if bearish_engulfing(candles, params.engulfing_body_ratio) {
                found.push(Pattern::BearishEngulfing);
            }
            if shooting_star(last, zone) {
                found.push(Pattern::ShootingStar);
            }
            if three_consecutive(candles, direction, params.volume_step_ratio) {
                found.push(Pattern::ThreeBearish);
            }
        }
    }
    found
}

/// A wick through the zone by more than `fraction` in the last two candles,
/// with the latest close back on the trade side of the zone.
pub fn liquidity_sweep(candles: &[Candle], zone: f64, direction: Direction, fraction: f64) -> bool {
    let Some(last) = candles.last() else {
        return false;
    };
    if candles.len() < 2 {
        return false;
    }
    let recent = &candles[candles.len() - 2..];
    match direction {
        Direction::Long => {
            let low = recent.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            low < zone * (1.0 - fraction) && last.close > zone
        }
        Direction::Short => {
            let high = recent.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
            high > zone * (1.0 + fraction) && last.close < zone
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
        Candle::new(0, open, high, low, close, volume)
    }

    #[test]
    fn engulfing_both_ways() {
        let bull = [
            candle(101.0, 101.5, 99.5, 100.0, 1.0),
            candle(99.8, 102.5, 99.5, 102.0, 1.0),
        ];
        assert!(bullish_engulfing(&bull, 1.05));
        assert!(!bearish_engulfing(&bull, 1.05));

        let bear = [
            candle(100.0, 101.5, 99.5, 101.0, 1.0),
            candle(101.2, 101.5, 98.5, 99.0, 1.0),
        ];
        assert!(bearish_engulfing(&bear, 1.05));
        assert!(!bullish_engulfing(&bear, 1.05));
    }

    #[test]
    fn engulfing_needs_larger_body() {
        // Same-sized body does not clear the 1.05 ratio.
        let candles = [
            candle(101.0, 101.5, 99.5, 100.0, 1.0),
            candle(100.0, 101.5, 99.5, 101.0, 1.0),
        ];
        assert!(!bullish_engulfing(&candles, 1.05));
        assert!(!bullish_engulfing(&candles[..1], 1.05));
    }

    #[test]
    fn hammer_and_shooting_star() {
        let h = candle(100.0, 101.1, 97.0, 101.0, 1.0);
        assert!(hammer(&h, None));
        assert!(hammer(&h, Some(100.5)));
        assert!(!hammer(&h, Some(90.0)));
        assert!(!shooting_star(&h, None));

        let s = candle(101.0, 104.0, 99.9, 100.0, 1.0);
        assert!(shooting_star(&s, None));
        assert!(!hammer(&s, None));

        let doji = candle(100.0, 101.0, 99.0, 100.0, 1.0);
        assert!(!hammer(&doji, None));
        assert!(!shooting_star(&doji, None));
    }

    #[test]
    fn three_candles_with_volume() {
        let rising = [
            candle(100.0, 101.5, 99.5, 101.0, 1000.0),
            candle(101.0, 102.5, 100.5, 102.0, 960.0),
            candle(102.0, 103.5, 101.5, 103.0, 1100.0),
        ];
        assert!(three_consecutive(&rising, Direction::Long, 0.95));
        assert!(!three_consecutive(&rising, Direction::Short, 0.95));

        let mut fading = rising;
        fading[2].volume = 800.0;
        assert!(!three_consecutive(&fading, Direction::Long, 0.95));
    }

    #[test]
    fn sweep_requires_reclaim() {
        let swept = [
            candle(101.0, 101.5, 99.5, 100.5, 1.0),
            candle(100.5, 101.5, 100.2, 101.0, 1.0),
        ];
        assert!(liquidity_sweep(&swept, 100.0, Direction::Long, 0.002));

        let mut lost = swept;
        lost[1].close = 99.9;
        assert!(!liquidity_sweep(&lost, 100.0, Direction::Long, 0.002));

        let short = [
            candle(99.0, 100.5, 98.5, 99.5, 1.0),
            candle(99.5, 99.8, 99.0, 99.2, 1.0),
        ];
        assert!(liquidity_sweep(&short, 100.0, Direction::Short, 0.002));
        assert!(!liquidity_sweep(&short[..1], 100.0, Direction::Short, 0.002));
    }

    #[test]
    fn pattern_labels() {
        let h = [candle(100.0, 101.1, 97.0, 101.0, 1.0)];
        let found = patterns_for(&h, Direction::Long, None, &SetupParams::default());
        assert_eq!(found, vec![Pattern::Hammer]);
        assert_eq!(found[0].to_string(), "hammer");
    }
}

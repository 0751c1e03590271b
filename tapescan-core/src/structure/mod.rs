//! Market-structure detection: swings, volatility-scaled zones, bias.
//!
//! Zone tolerance is `ATR × tolerance_multiplier`, so the same parameters work
//! for instruments of very different price magnitude.

pub mod swing;
pub mod zone;

pub use swing::{detect_swings, structure_bias, Swings};
pub use zone::{cluster_zones, strength_for, ZoneSet};

use crate::config::StructureParams;
use crate::domain::{Candle, MarketStructure, Zone};

/// Analyse the trailing `zone_window` candles.
///
/// Swing highs and lows are clustered together, then split by the last close:
/// zones above become resistances and zones below become supports, each list
/// nearest first. A zone sitting exactly on the close belongs to neither.
pub fn analyze(candles: &[Candle], atr: f64, params: &StructureParams) -> MarketStructure {
    let start = candles.len().saturating_sub(params.zone_window);
    let window = &candles[start..];
    let last_close = window.last().map_or(f64::NAN, |c| c.close);

    let tolerance = if atr.is_finite() && atr > 0.0 {
        atr * params.tolerance_multiplier
    } else {
        0.0
    };

    let swings = detect_swings(window, params.swing_lookback, start);
    let zones = cluster_zones(swings.all(), tolerance, params.strong_touch_threshold);
    let (resistances, supports) = split_zones(zones, last_close);
    let bias = structure_bias(&swings);

    MarketStructure {
        swing_highs: swings.highs,
        swing_lows: swings.lows,
        resistances,
        supports,
        tolerance,
        bias,
        last_close,
    }
}

/// Partition ascending zones into (resistances, supports), nearest first.
fn split_zones(zones: Vec<Zone>, close: f64) -> (Vec<Zone>, Vec<Zone>) {
    let mut resistances: Vec<Zone> = zones.iter().copied().filter(|z| z.price > close).collect();
    let mut supports: Vec<Zone> = zones.into_iter().filter(|z| z.price < close).collect();
    resistances.sort_by(|a, b| a.price.total_cmp(&b.price));
    supports.sort_by(|a, b| b.price.total_cmp(&a.price));
    (resistances, supports)
}

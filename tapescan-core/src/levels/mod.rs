//! Key price levels derived from a candle window: daily volume profile,
//! previous day/week extremes and recent session extremes.
//!
//! All periods are anchored on the window's last candle, never the wall clock.

pub mod confluence;
pub mod profile;

pub use confluence::confluent_levels;
pub use profile::{ProfileBin, VolumeProfile};

use crate::config::SetupParams;
use crate::domain::{Candle, KeyLevel, KeyLevelKind, MarketSession};
use chrono::{DateTime, Datelike};

const DAY: i64 = 86_400;
const HOUR: i64 = 3_600;

/// Trailing span covered by the volume profile.
pub const PROFILE_WINDOW_SECS: i64 = DAY;

/// Every key level available in the window.
pub fn key_levels(candles: &[Candle], params: &SetupParams) -> Vec<KeyLevel> {
    let Some(last) = candles.last() else {
        return Vec::new();
    };
    let mut levels = Vec::new();

    let since = last.timestamp - PROFILE_WINDOW_SECS;
    let recent = &candles[candles.partition_point(|c| c.timestamp <= since)..];
    if let Some(profile) = VolumeProfile::build(recent, params.profile_bins) {
        if let Some(poc) = profile.point_of_control() {
            levels.push(KeyLevel {
                kind: KeyLevelKind::PointOfControl,
                price: poc,
            });
        }
        if let Some((vah, val)) = profile.value_area(params.value_area) {
            levels.push(KeyLevel {
                kind: KeyLevelKind::ValueAreaHigh,
                price: vah,
            });
            levels.push(KeyLevel {
                kind: KeyLevelKind::ValueAreaLow,
                price: val,
            });
        }
    }

    let day_start = last.timestamp.div_euclid(DAY) * DAY;
    if let Some((high, low)) = extremes_between(candles, day_start - DAY, day_start) {
        levels.push(KeyLevel {
            kind: KeyLevelKind::PreviousDayHigh,
            price: high,
        });
        levels.push(KeyLevel {
            kind: KeyLevelKind::PreviousDayLow,
            price: low,
        });
    }

    let week_start = day_start - i64::from(weekday_from_monday(day_start)) * DAY;
    if let Some((high, low)) = extremes_between(candles, week_start - 7 * DAY, week_start) {
        levels.push(KeyLevel {
            kind: KeyLevelKind::PreviousWeekHigh,
            price: high,
        });
        levels.push(KeyLevel {
            kind: KeyLevelKind::PreviousWeekLow,
            price: low,
        });
    }

    for session in MarketSession::ALL {
        if let Some((high, low)) = latest_session_extremes(candles, day_start, session) {
            levels.push(KeyLevel {
                kind: KeyLevelKind::SessionHigh(session),
                price: high,
            });
            levels.push(KeyLevel {
                kind: KeyLevelKind::SessionLow(session),
                price: low,
            });
        }
    }

    levels
}

/// Highest high and lowest low of candles opening in `[start, end)`.
fn extremes_between(candles: &[Candle], start: i64, end: i64) -> Option<(f64, f64)> {
    candles
        .iter()
        .filter(|c| c.timestamp >= start && c.timestamp < end)
        .fold(None, |acc, c| match acc {
            None => Some((c.high, c.low)),
            Some((h, l)) => Some((f64::max(h, c.high), f64::min(l, c.low))),
        })
}

/// Extremes of the most recent occurrence of `session` among today and the
/// two previous days.
fn latest_session_extremes(
    candles: &[Candle],
    day_start: i64,
    session: MarketSession,
) -> Option<(f64, f64)> {
    let (start_hour, end_hour) = session.hours();
    (0..3).find_map(|back| {
        let day = day_start - back * DAY;
        extremes_between(
            candles,
            day + i64::from(start_hour) * HOUR,
            day + i64::from(end_hour) * HOUR,
        )
    })
}

fn weekday_from_monday(timestamp: i64) -> u32 {
    DateTime::from_timestamp(timestamp, 0)
        .map(|d| d.weekday().num_days_from_monday())
        .unwrap_or(0)
}

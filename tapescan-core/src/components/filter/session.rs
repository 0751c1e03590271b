//! Session quality from the UTC hour of the run's as-of candle.

use crate::config::ContextParams;
use crate::domain::SessionQuality;

/// High-liquidity window → High, overlap window → Medium, otherwise Low.
pub fn session_quality(utc_hour: u32, params: &ContextParams) -> SessionQuality {
    if params.high_liquidity_session.contains(utc_hour) {
        SessionQuality::High
    } else if params.medium_liquidity_session.contains(utc_hour) {
        SessionQuality::Medium
    } else {
        SessionQuality::Low
    }
}

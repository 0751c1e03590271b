//! Market structure value types: swing points, zones, key levels.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwingKind {
    High,
    Low,
}

/// A local price extremum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub price: f64,
    pub timestamp: i64,
    /// Position within the candle slice the swing was detected on.
    pub index: usize,
    pub kind: SwingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneStrength {
    Medium,
    Strong,
}

impl ZoneStrength {
    /// Numeric quality used by the scorer.
    pub fn weight(self) -> f64 {
        match self {
            ZoneStrength::Strong => 1.0,
            ZoneStrength::Medium => 0.5,
        }
    }
}

impl fmt::Display for ZoneStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ZoneStrength::Strong => "strong",
            ZoneStrength::Medium => "medium",
        })
    }
}

/// A clustered support/resistance level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Running mean of every touch registered into the zone.
    pub price: f64,
    pub touches: u32,
    pub strength: ZoneStrength,
    /// Latest timestamp among the zone's touches.
    pub last_touch: i64,
}

/// Direction implied by the two most recent swing highs and swing lows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureBias {
    HigherHighsHigherLows,
    LowerHighsLowerLows,
    Mixed,
}

impl fmt::Display for StructureBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StructureBias::HigherHighsHigherLows => "HH/HL",
            StructureBias::LowerHighsLowerLows => "LH/LL",
            StructureBias::Mixed => "mixed",
        })
    }
}

/// Swings and zones of one candle window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStructure {
    /// Newest first.
    pub swing_highs: Vec<SwingPoint>,
    /// Newest first.
    pub swing_lows: Vec<SwingPoint>,
    /// Zones above the last close, nearest first.
    pub resistances: Vec<Zone>,
    /// Zones below the last close, nearest first.
    pub supports: Vec<Zone>,
    /// Merge tolerance in price units the zones were clustered with.
    pub tolerance: f64,
    pub bias: StructureBias,
    pub last_close: f64,
}

impl MarketStructure {
    pub fn nearest_support(&self) -> Option<&Zone> {
        self.supports.first()
    }

    pub fn nearest_resistance(&self) -> Option<&Zone> {
        self.resistances.first()
    }
}

/// Named trading sessions (UTC hours).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketSession {
    Asia,
    London,
    NewYork,
}

impl MarketSession {
    pub const ALL: [MarketSession; 3] =
        [MarketSession::Asia, MarketSession::London, MarketSession::NewYork];

    /// `[start, end)` hours UTC.
    pub fn hours(self) -> (u32, u32) {
        match self {
            MarketSession::Asia => (0, 9),
            MarketSession::London => (7, 16),
            MarketSession::NewYork => (13, 21),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyLevelKind {
    PointOfControl,
    ValueAreaHigh,
    ValueAreaLow,
    PreviousDayHigh,
    PreviousDayLow,
    PreviousWeekHigh,
    PreviousWeekLow,
    SessionHigh(MarketSession),
    SessionLow(MarketSession),
}

impl fmt::Display for KeyLevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = |s: &MarketSession| match s {
            MarketSession::Asia => "Asia",
            MarketSession::London => "London",
            MarketSession::NewYork => "New York",
        };
        match self {
            KeyLevelKind::PointOfControl => f.write_str("POC"),
            KeyLevelKind::ValueAreaHigh => f.write_str("VAH"),
            KeyLevelKind::ValueAreaLow => f.write_str("VAL"),
            KeyLevelKind::PreviousDayHigh => f.write_str("PDH"),
            KeyLevelKind::PreviousDayLow => f.write_str("PDL"),
            KeyLevelKind::PreviousWeekHigh => f.write_str("PWH"),
            KeyLevelKind::PreviousWeekLow => f.write_str("PWL"),
            KeyLevelKind::SessionHigh(s) => write!(f, "{} high", session(s)),
            KeyLevelKind::SessionLow(s) => write!(f, "{} low", session(s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyLevel {
    pub kind: KeyLevelKind,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_ordering_and_weight() {
        assert!(ZoneStrength::Strong > ZoneStrength::Medium);
        assert_eq!(ZoneStrength::Strong.weight(), 1.0);
        assert_eq!(ZoneStrength::Medium.weight(), 0.5);
    }

    #[test]
    fn key_level_labels() {
        assert_eq!(KeyLevelKind::PointOfControl.to_string(), "POC");
        assert_eq!(
            KeyLevelKind::SessionHigh(MarketSession::NewYork).to_string(),
            "New York high"
        );
    }
}

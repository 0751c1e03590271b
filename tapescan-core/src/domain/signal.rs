//! Candidates and scored signals.

use super::{KeyLevel, SessionQuality, TrendState, Zone};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    /// The context trend this direction trades with.
    pub fn aligned_trend(self) -> TrendState {
        match self {
            Direction::Long => TrendState::StrongBull,
            Direction::Short => TrendState::StrongBear,
        }
    }

    /// The context trend that vetoes this direction.
    pub fn opposing_trend(self) -> TrendState {
        match self {
            Direction::Long => TrendState::StrongBear,
            Direction::Short => TrendState::StrongBull,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        })
    }
}

/// Confidence tier. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        })
    }
}

/// Trigger-timeframe readings captured when a candidate fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateMetrics {
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    /// Change of the fast EMA over the scorer's slope window; `None` when the
    /// window reaches into warm-up.
    pub ema_fast_slope: Option<f64>,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub rsi: f64,
    pub atr: f64,
    pub vwap: Option<f64>,
    pub session_vwap: Option<f64>,
    /// Absolute distance from the close to the zone centroid.
    pub distance_to_zone: f64,
    /// Zone merge tolerance in price units.
    pub tolerance: f64,
}

/// Price band in which the entry is considered valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryZone {
    pub low: f64,
    pub high: f64,
}

impl EntryZone {
    /// Band around a zone price: `[zone·0.998, zone·1.004]` for longs and
    /// `[zone·0.996, zone·1.002]` for shorts.
    pub fn around(zone_price: f64, direction: Direction) -> Self {
        match direction {
            Direction::Long => Self {
                low: zone_price * 0.998,
                high: zone_price * 1.004,
            },
            Direction::Short => Self {
                low: zone_price * 0.996,
                high: zone_price * 1.002,
            },
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        (self.low..=self.high).contains(&price)
    }
}

/// An unscored setup with the evidence that fired it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub instrument: String,
    pub direction: Direction,
    /// Reasons in the order the rules fired.
    pub evidence: Vec<String>,
    pub metrics: CandidateMetrics,
    /// The support (long) or resistance (short) zone the setup trades from.
    pub zone: Zone,
    /// Key levels within the confluence tolerance of the entry.
    pub key_levels: Vec<KeyLevel>,
    pub confluence: usize,
    pub entry_zone: EntryZone,
    /// Epoch seconds of the trigger candle.
    pub as_of: i64,
}

/// Points contributed by each score component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScoreBreakdown {
    pub trend: f64,
    pub structure: f64,
    pub momentum: f64,
    pub context: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.trend + self.structure + self.momentum + self.context
    }
}

/// A scored, actionable trade signal. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: f64,
    pub confidence: Confidence,
    pub breakdown: ScoreBreakdown,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,
    pub take_profit_3: f64,
    pub risk_percent: f64,
    /// Percent of capital.
    pub suggested_position_size: f64,
    pub timestamp: i64,
    pub valid_until: i64,
    pub context_trend: TrendState,
    pub session_quality: SessionQuality,
}

impl Signal {
    pub fn instrument(&self) -> &str {
        &self.candidate.instrument
    }

    pub fn direction(&self) -> Direction {
        self.candidate.direction
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = |ts: i64| {
            DateTime::from_timestamp(ts, 0)
                .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| ts.to_string())
        };
        let pct = |price: f64| (price - self.entry_price) / self.entry_price * 100.0;

        writeln!(
            f,
            "{} {} | score {:.1} ({})",
            self.direction(),
            self.instrument(),
            self.score,
            self.confidence
        )?;
        writeln!(f, "  entry   {:.4}", self.entry_price)?;
        writeln!(
            f,
            "  stop    {:.4} ({:+.2}%)",
            self.stop_loss,
            pct(self.stop_loss)
        )?;
        for (i, tp) in [self.take_profit_1, self.take_profit_2, self.take_profit_3]
            .into_iter()
            .enumerate()
        {
            writeln!(f, "  tp{}     {:.4} ({:+.2}%)", i + 1, tp, pct(tp))?;
        }
        writeln!(
            f,
            "  risk    {:.2}% | size {:.1}% of capital",
            self.risk_percent, self.suggested_position_size
        )?;
        writeln!(
            f,
            "  context {} | session {}",
            self.context_trend, self.session_quality
        )?;
        writeln!(
            f,
            "  score   trend {:.1} | structure {:.1} | momentum {:.1} | context {:+.1}",
            self.breakdown.trend,
            self.breakdown.structure,
            self.breakdown.momentum,
            self.breakdown.context
        )?;
        for reason in &self.candidate.evidence {
            writeln!(f, "  - {reason}")?;
        }
        write!(f, "  valid until {}", time(self.valid_until))
    }
}

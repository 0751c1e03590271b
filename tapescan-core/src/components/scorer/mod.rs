//! Scoring: a weighted sum of four features, confidence tiers, trade levels.
//!
//! Features lie in [0, 1] except context, which is +1 aligned with the
//! verdict trend, -1 opposing and 0 otherwise. The weighted sum is clamped to
//! [0, 100]; candidates under `min_score` are dropped rather than emitted as
//! low-confidence noise.

pub mod levels;
pub mod rank;

pub use levels::{trade_levels, TradeLevels};
pub use rank::{compare_signals, rank_signals};

use crate::config::ScoringParams;
use crate::domain::{
    Candidate, Confidence, ContextVerdict, Direction, ScoreBreakdown, Signal, TrendState,
};
use tracing::debug;

/// Touch count at which the touch component of structure quality saturates.
const FULL_TOUCHES: f64 = 5.0;

/// Unweighted feature values of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub trend: f64,
    pub structure: f64,
    pub momentum: f64,
    pub context: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scorer {
    params: ScoringParams,
}

impl Scorer {
    pub fn new(params: ScoringParams) -> Self {
        Self { params }
    }

    pub fn default_params() -> Self {
        Self::new(ScoringParams::default())
    }

    pub fn name(&self) -> &str {
        "weighted_scorer"
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    pub fn features(&self, candidate: &Candidate, verdict: &ContextVerdict) -> Features {
        Features {
            trend: self.trend_feature(candidate),
            structure: structure_feature(candidate),
            momentum: self.momentum_feature(candidate.direction, candidate.metrics.rsi),
            context: context_feature(candidate.direction, verdict.trend),
        }
    }

    pub fn breakdown(&self, features: &Features) -> ScoreBreakdown {
        let w = &self.params.weights;
        ScoreBreakdown {
            trend: w.trend * features.trend,
            structure: w.structure * features.structure,
            momentum: w.momentum * features.momentum,
            context: w.context * features.context,
        }
    }

    pub fn confidence_for(&self, score: f64) -> Confidence {
        if score >= self.params.high_confidence {
            Confidence::High
        } else if score >= self.params.medium_confidence {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Score a candidate into a signal, or `None` when it falls under
    /// `min_score` or has no usable stop distance.
    pub fn score(&self, candidate: &Candidate, verdict: &ContextVerdict) -> Option<Signal> {
        let features = self.features(candidate, verdict);
        let breakdown = self.breakdown(&features);
        let score = breakdown.total().clamp(0.0, 100.0);

        if score < self.params.min_score {
            debug!(
                instrument = %candidate.instrument,
                direction = %candidate.direction,
                score,
                "candidate below minimum score"
            );
            return None;
        }

        let multiplier = self.params.stop_multiplier_for(&candidate.instrument);
        let Some(levels) = trade_levels(
            candidate.metrics.close,
            candidate.metrics.atr,
            candidate.direction,
            multiplier,
            &self.params,
        ) else {
            debug!(instrument = %candidate.instrument, "candidate without a usable stop distance");
            return None;
        };
        let [tp1, tp2, tp3] = levels.take_profits;

        Some(Signal {
            candidate: candidate.clone(),
            score,
            confidence: self.confidence_for(score),
            breakdown,
            entry_price: levels.entry,
            stop_loss: levels.stop_loss,
            take_profit_1: tp1,
            take_profit_2: tp2,
            take_profit_3: tp3,
            risk_percent: levels.risk_percent,
            suggested_position_size: levels.position_size,
            timestamp: candidate.as_of,
            valid_until: candidate.as_of + self.params.validity_secs,
            context_trend: verdict.trend,
            session_quality: verdict.session_quality,
        })
    }

    /// Half EMA (slope in the trade direction, fast/slow ordering), half ADX.
    fn trend_feature(&self, candidate: &Candidate) -> f64 {
        let m = &candidate.metrics;
        let sign = candidate.direction.sign();
        let slope = match m.ema_fast_slope {
            Some(s) if s * sign > 0.0 => 1.0,
            _ => 0.0,
        };
        let ordering = if (m.ema_fast - m.ema_slow) * sign > 0.0 {
            1.0
        } else {
            0.0
        };
        let adx = if m.adx.is_finite() {
            (m.adx / self.params.adx_full_scale).clamp(0.0, 1.0)
        } else {
            0.0
        };
        0.5 * (0.5 * slope + 0.5 * ordering) + 0.5 * adx
    }

    /// Long: `[midline, overbought)` is ideal, `[oversold, midline)` fair,
    /// oversold weak, overbought worthless. Short mirrors around 50.
    fn momentum_feature(&self, direction: Direction, rsi: f64) -> f64 {
        if !rsi.is_finite() {
            return 0.0;
        }
        let p = &self.params;
        let rsi = match direction {
            Direction::Long => rsi,
            Direction::Short => 100.0 - rsi,
        };
        let (oversold, overbought) = match direction {
            Direction::Long => (p.rsi_oversold, p.rsi_overbought),
            Direction::Short => (100.0 - p.rsi_overbought, 100.0 - p.rsi_oversold),
        };
        if rsi >= overbought {
            0.0
        } else if rsi >= p.rsi_midline {
            1.0
        } else if rsi >= oversold {
            0.6
        } else {
            0.3
        }
    }
}

/// `0.6 · zone strength + 0.4 · min(touches / 5, 1)`.
fn structure_feature(candidate: &Candidate) -> f64 {
    let zone = &candidate.zone;
    let touches = (f64::from(zone.touches) / FULL_TOUCHES).min(1.0);
    0.6 * zone.strength.weight() + 0.4 * touches
}

fn context_feature(direction: Direction, trend: TrendState) -> f64 {
    if trend == direction.aligned_trend() {
        1.0
    } else if trend == direction.opposing_trend() {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{
        CandidateMetrics, ContextMetrics, EntryZone, SessionQuality, StructureBias,
        VolatilityRegime, Zone, ZoneStrength,
    };
    use crate::indicators::assert_approx;

    pub(crate) fn candidate(instrument: &str, direction: Direction) -> Candidate {
        let zone = Zone {
            price: 186.0,
            touches: 3,
            strength: ZoneStrength::Strong,
            last_touch: 0,
        };
        Candidate {
            instrument: instrument.to_string(),
            direction,
            evidence: vec!["price at strong support zone (3 touches)".into()],
            metrics: CandidateMetrics {
                close: 187.5,
                ema_fast: if direction == Direction::Long { 185.7 } else { 189.0 },
                ema_slow: if direction == Direction::Long { 162.5 } else { 200.0 },
                ema_fast_slope: Some(2.5 * direction.sign()),
                adx: 68.6,
                plus_di: 30.0,
                minus_di: 10.0,
                rsi: if direction == Direction::Long { 59.3 } else { 40.7 },
                atr: 4.19,
                vwap: None,
                session_vwap: None,
                distance_to_zone: 1.5,
                tolerance: 2.1,
            },
            zone,
            key_levels: Vec::new(),
            confluence: 0,
            entry_zone: EntryZone::around(zone.price, direction),
            as_of: 1_704_117_600,
        }
    }

    pub(crate) fn verdict(trend: TrendState) -> ContextVerdict {
        ContextVerdict {
            anchor: "BTC".into(),
            trend,
            trend_strength: 68.6,
            volatility: VolatilityRegime::Normal,
            session_quality: SessionQuality::High,
            should_trade: true,
            metrics: ContextMetrics {
                price: 187.5,
                adx: 68.6,
                atr: 4.19,
                atr_ratio: 0.022,
                ema_fast: 185.7,
                ema_slow: 162.5,
                bias: StructureBias::Mixed,
                as_of: 1_704_117_600,
            },
        }
    }

    /// A signal with the given ranking keys.
    pub(crate) fn scored(
        instrument: &str,
        direction: Direction,
        score: f64,
        confidence: Confidence,
        risk_percent: f64,
    ) -> Signal {
        let mut signal = Scorer::default_params()
            .score(
                &candidate(instrument, direction),
                &verdict(direction.aligned_trend()),
            )
            .unwrap();
        signal.score = score;
        signal.confidence = confidence;
        signal.risk_percent = risk_percent;
        signal
    }

    #[test]
    fn aligned_long_scores_high() {
        let scorer = Scorer::default_params();
        let s = scorer
            .score(&candidate("BTC", Direction::Long), &verdict(TrendState::StrongBull))
            .unwrap();
        assert_approx(s.breakdown.trend, 30.0, 1e-9);
        assert_approx(s.breakdown.structure, 25.2, 1e-9);
        assert_approx(s.breakdown.momentum, 20.0, 1e-9);
        assert_approx(s.breakdown.context, 20.0, 1e-9);
        assert_approx(s.score, 95.2, 1e-9);
        assert_eq!(s.confidence, Confidence::High);
        assert!(s.stop_loss < s.entry_price);
        // BTC override: 1.5 × ATR.
        assert_approx(s.entry_price - s.stop_loss, 4.19 * 1.5, 1e-9);
        assert_eq!(s.valid_until, s.timestamp + 3600);
        assert_eq!(s.context_trend, TrendState::StrongBull);
    }

    #[test]
    fn short_mirrors_long() {
        let scorer = Scorer::default_params();
        let s = scorer
            .score(&candidate("SOL", Direction::Short), &verdict(TrendState::StrongBear))
            .unwrap();
        assert_approx(s.score, 95.2, 1e-9);
        assert!(s.stop_loss > s.entry_price);
        assert!(s.take_profit_1 < s.entry_price);
        assert!(s.take_profit_3 < s.take_profit_2);
        // Default multiplier for instruments without an override.
        assert_approx(s.stop_loss - s.entry_price, 4.19 * 2.5, 1e-9);
    }

    #[test]
    fn neutral_context_scores_zero_context_points() {
        let scorer = Scorer::default_params();
        let s = scorer
            .score(&candidate("BTC", Direction::Long), &verdict(TrendState::Sideways))
            .unwrap();
        assert_eq!(s.breakdown.context, 0.0);
        assert_approx(s.score, 75.2, 1e-9);
        assert_eq!(s.confidence, Confidence::High);
    }

    #[test]
    fn opposing_context_penalises() {
        let scorer = Scorer::default_params();
        let f = scorer.features(&candidate("BTC", Direction::Long), &verdict(TrendState::StrongBear));
        assert_eq!(f.context, -1.0);
        let s = scorer
            .score(&candidate("BTC", Direction::Long), &verdict(TrendState::StrongBear))
            .unwrap();
        assert_approx(s.score, 55.2, 1e-9);
        assert_eq!(s.confidence, Confidence::Medium);
    }

    #[test]
    fn weak_candidates_are_discarded() {
        let scorer = Scorer::default_params();
        let mut c = candidate("BTC", Direction::Long);
        c.metrics.ema_fast_slope = Some(-1.0);
        c.metrics.adx = 5.0;
        c.metrics.rsi = 75.0;
        c.zone.strength = ZoneStrength::Medium;
        c.zone.touches = 1;
        // trend 0.5·0.5 + 0.5·0.1 = 0.3 → 9, structure 0.38 → 11.4, momentum 0.
        assert!(scorer.score(&c, &verdict(TrendState::Sideways)).is_none());
    }

    #[test]
    fn momentum_bands() {
        let scorer = Scorer::default_params();
        let long = |rsi| scorer.momentum_feature(Direction::Long, rsi);
        assert_eq!(long(50.0), 1.0);
        assert_eq!(long(45.0), 1.0);
        assert_eq!(long(35.0), 0.6);
        assert_eq!(long(20.0), 0.3);
        assert_eq!(long(70.0), 0.0);

        let short = |rsi| scorer.momentum_feature(Direction::Short, rsi);
        assert_eq!(short(50.0), 1.0);
        assert_eq!(short(65.0), 0.6);
        assert_eq!(short(80.0), 0.3);
        assert_eq!(short(30.0), 0.0);
        assert_eq!(short(f64::NAN), 0.0);
    }

    #[test]
    fn tiers() {
        let scorer = Scorer::default_params();
        assert_eq!(scorer.confidence_for(75.0), Confidence::High);
        assert_eq!(scorer.confidence_for(74.9), Confidence::Medium);
        assert_eq!(scorer.confidence_for(50.0), Confidence::Medium);
        assert_eq!(scorer.confidence_for(49.9), Confidence::Low);
    }

    #[test]
    fn score_is_clamped() {
        let scorer = Scorer::new(ScoringParams {
            weights: crate::config::ScoreWeights {
                trend: 80.0,
                structure: 80.0,
                momentum: 0.0,
                context: 0.0,
            },
            ..ScoringParams::default()
        });
        let s = scorer
            .score(&candidate("BTC", Direction::Long), &verdict(TrendState::StrongBull))
            .unwrap();
        assert_eq!(s.score, 100.0);
    }
}

//! Setup detection: long and short candidates for one instrument.
//!
//! Long requires all of:
//! - trigger close above the fast and slow EMA
//! - close within zone tolerance above a support or resistance zone
//!   (nearest zone wins, more touches on ties)
//! - ADX at or above the participation threshold
//! - context trend not StrongBear
//!
//! Short mirrors with a zone at or above the close and StrongBull. Both directions are
//! evaluated independently. Structure bias, session VWAP, candlestick
//! patterns, liquidity sweeps and key-level confluence only add evidence.

pub mod patterns;

pub use patterns::{liquidity_sweep, patterns_for, Pattern};

use crate::components::indicator::{IndicatorSet, Series};
use crate::config::{EngineConfig, SetupParams};
use crate::domain::{
    Candidate, CandidateMetrics, Candle, ContextVerdict, Direction, EntryZone, KeyLevel,
    MarketStructure, StructureBias, Timeframe, Zone,
};
use crate::levels::{confluent_levels, key_levels};

/// Everything the detector reads for one instrument.
#[derive(Debug, Clone, Copy)]
pub struct SetupInputs<'a> {
    pub instrument: &'a str,
    pub trigger_candles: &'a [Candle],
    pub trigger_indicators: &'a IndicatorSet,
    pub structure: &'a MarketStructure,
    pub verdict: &'a ContextVerdict,
}

/// Last-candle trigger readings; `None` from `read` while any is in warm-up.
#[derive(Debug, Clone, Copy)]
struct Trigger {
    close: f64,
    ema_fast: f64,
    ema_slow: f64,
    adx: f64,
    plus_di: f64,
    minus_di: f64,
    rsi: f64,
    atr: f64,
    vwap: Option<f64>,
    session_vwap: Option<f64>,
    ema_fast_slope: Option<f64>,
    as_of: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupDetector {
    params: SetupParams,
    ema_fast: usize,
    ema_slow: usize,
    slope_lookback: usize,
    structure_timeframe: Timeframe,
    trigger_timeframe: Timeframe,
}

impl SetupDetector {
    pub fn new(params: SetupParams) -> Self {
        Self::from_config(&EngineConfig {
            setup: params,
            ..EngineConfig::default()
        })
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            params: config.setup.clone(),
            ema_fast: config.indicators.ema_fast,
            ema_slow: config.indicators.ema_slow,
            slope_lookback: config.scoring.slope_lookback,
            structure_timeframe: config.run.structure_timeframe,
            trigger_timeframe: config.run.trigger_timeframe,
        }
    }

    pub fn name(&self) -> &str {
        "setup_detector"
    }

    /// Candidates for one instrument, long first.
    pub fn detect(&self, inputs: &SetupInputs<'_>) -> Vec<Candidate> {
        let Some(trigger) = self.read(inputs.trigger_candles, inputs.trigger_indicators) else {
            return Vec::new();
        };
        let levels = key_levels(inputs.trigger_candles, &self.params);

        [Direction::Long, Direction::Short]
            .into_iter()
            .filter_map(|direction| self.evaluate(direction, inputs, &trigger, &levels))
            .collect()
    }

    fn read(&self, candles: &[Candle], ind: &IndicatorSet) -> Option<Trigger> {
        let last = candles.last()?;
        Some(Trigger {
            close: last.close,
            ema_fast: ind.last(Series::EmaFast)?,
            ema_slow: ind.last(Series::EmaSlow)?,
            adx: ind.last(Series::Adx)?,
            plus_di: ind.last(Series::PlusDi)?,
            minus_di: ind.last(Series::MinusDi)?,
            rsi: ind.last(Series::Rsi)?,
            atr: ind.last(Series::Atr)?,
            vwap: ind.last(Series::Vwap),
            session_vwap: ind.last(Series::SessionVwap),
            ema_fast_slope: ind.ema_fast_slope(self.slope_lookback),
            as_of: last.timestamp,
        })
    }

    fn evaluate(
        &self,
        direction: Direction,
        inputs: &SetupInputs<'_>,
        t: &Trigger,
        levels: &[KeyLevel],
    ) -> Option<Candidate> {
        let tf = self.trigger_timeframe;
        let tolerance = inputs.structure.tolerance;
        let mut evidence = Vec::new();

        let (zone, distance) = match direction {
            Direction::Long => {
                if !(t.close > t.ema_fast && t.close > t.ema_slow) {
                    return None;
                }
                evidence.push(format!(
                    "close above EMA{} and EMA{} ({tf})",
                    self.ema_fast, self.ema_slow
                ));
                zone_within(inputs.structure, t.close, tolerance, direction)?
            }
            Direction::Short => {
                if !(t.close < t.ema_fast && t.close < t.ema_slow) {
                    return None;
                }
                evidence.push(format!(
                    "close below EMA{} and EMA{} ({tf})",
                    self.ema_fast, self.ema_slow
                ));
                zone_within(inputs.structure, t.close, tolerance, direction)?
            }
        };
        evidence.push(zone_evidence(direction, &zone));

        if t.adx < self.params.min_participation_adx {
            return None;
        }
        evidence.push(format!("ADX {:.1} confirms participation", t.adx));

        let trend = inputs.verdict.trend;
        if trend == direction.opposing_trend() {
            return None;
        }
        evidence.push(if trend == direction.aligned_trend() {
            format!("{} context {trend} aligned", inputs.verdict.anchor)
        } else {
            format!("{} context {trend} not opposing", inputs.verdict.anchor)
        });

        self.supplement(direction, inputs, t, &zone, &mut evidence);

        let key_levels = confluent_levels(t.close, levels, self.params.confluence_tolerance);
        if !key_levels.is_empty() {
            let names: Vec<String> = key_levels.iter().map(|l| l.kind.to_string()).collect();
            evidence.push(format!("confluence with {}", names.join(", ")));
        }

        Some(Candidate {
            instrument: inputs.instrument.to_string(),
            direction,
            evidence,
            metrics: CandidateMetrics {
                close: t.close,
                ema_fast: t.ema_fast,
                ema_slow: t.ema_slow,
                ema_fast_slope: t.ema_fast_slope,
                adx: t.adx,
                plus_di: t.plus_di,
                minus_di: t.minus_di,
                rsi: t.rsi,
                atr: t.atr,
                vwap: t.vwap,
                session_vwap: t.session_vwap,
                distance_to_zone: distance,
                tolerance,
            },
            zone,
            confluence: key_levels.len(),
            key_levels,
            entry_zone: EntryZone::around(zone.price, direction),
            as_of: t.as_of,
        })
    }

    /// Evidence that never gates a candidate.
    fn supplement(
        &self,
        direction: Direction,
        inputs: &SetupInputs<'_>,
        t: &Trigger,
        zone: &Zone,
        evidence: &mut Vec<String>,
    ) {
        let bias = inputs.structure.bias;
        let agreeing = match direction {
            Direction::Long => StructureBias::HigherHighsHigherLows,
            Direction::Short => StructureBias::LowerHighsLowerLows,
        };
        if bias == agreeing {
            evidence.push(format!("{} structure {bias}", self.structure_timeframe));
        }

        if let Some(vwap) = t.session_vwap {
            match direction {
                Direction::Long if t.close >= vwap => {
                    evidence.push("holding above session VWAP".to_string())
                }
                Direction::Short if t.close <= vwap => {
                    evidence.push("holding below session VWAP".to_string())
                }
                _ => {}
            }
        }

        for pattern in patterns_for(inputs.trigger_candles, direction, Some(zone.price), &self.params)
        {
            evidence.push(format!("pattern: {pattern}"));
        }

        if liquidity_sweep(
            inputs.trigger_candles,
            zone.price,
            direction,
            self.params.sweep_fraction,
        ) {
            evidence.push(match direction {
                Direction::Long => "liquidity sweep below support".to_string(),
                Direction::Short => "liquidity sweep above resistance".to_string(),
            });
        }
    }
}

/// Nearest zone on the trade side of `close`, within `tolerance`. Both zone
/// lists are searched: they are split by the structure close, which can
/// disagree with the trigger close.
fn zone_within(
    structure: &MarketStructure,
    close: f64,
    tolerance: f64,
    direction: Direction,
) -> Option<(Zone, f64)> {
    structure
        .supports
        .iter()
        .chain(&structure.resistances)
        .map(|zone| {
            let distance = match direction {
                Direction::Long => close - zone.price,
                Direction::Short => zone.price - close,
            };
            (*zone, distance)
        })
        .filter(|(_, distance)| (0.0..=tolerance).contains(distance))
        .min_by(|(a, da), (b, db)| da.total_cmp(db).then(b.touches.cmp(&a.touches)))
}

fn zone_evidence(direction: Direction, zone: &Zone) -> String {
    let side = match direction {
        Direction::Long => "support",
        Direction::Short => "resistance",
    };
    format!(
        "price at {} {side} zone ({} touches)",
        zone.strength, zone.touches
    )
}

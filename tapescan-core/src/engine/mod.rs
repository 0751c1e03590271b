//! Signal engine: one stateless scan over a universe of instruments.
//!
//! FETCH → INDICATE → STRUCTURE → CONTEXT → DETECT → SCORE → RANK → DONE
//!
//! 1. Fetch: pull structure and trigger windows per instrument, validate them
//! 2. Indicate / Structure: per-pair fan-out on the rayon pool
//! 3. Context: anchor verdict from its structure and trigger windows
//! 4. Detect / Score: candidates for every instrument, anchor included
//! 5. Rank: global sort and truncation, suppressed entirely by a closed gate
//!
//! Any error aborts the run; there is no partial result.

pub mod precompute;
pub mod source;
pub mod state;
pub mod validate;

pub use precompute::{analyze_structures, precompute_indicators, PairKey};
pub use source::{CandleSource, MemoryCandleSource};
pub use state::{RunOutcome, SignalReport, Stage};
pub use validate::{ensure_sufficient, validate_candles};

use crate::components::filter::{ContextFilter, ContextInputs};
use crate::components::scorer::{rank_signals, Scorer};
use crate::components::setup::{SetupDetector, SetupInputs};
use crate::config::EngineConfig;
use crate::domain::{Candidate, Candle, MarketStructure, Signal, Timeframe};
use crate::error::{EngineError, SourceError};
use crate::fingerprint::{DatasetHash, DatasetHasher, RunFingerprint};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Immutable scan engine. Safe to share across threads and reuse across runs.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
    filter: ContextFilter,
    detector: SetupDetector,
    scorer: Scorer,
}

/// Validated input windows of one run.
struct Fetched {
    candles: BTreeMap<PairKey, Vec<Candle>>,
    dataset_hash: DatasetHash,
}

impl SignalEngine {
    /// Validate the configuration and build every stage from it.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            filter: ContextFilter::new(config.context.clone()),
            detector: SetupDetector::from_config(&config),
            scorer: Scorer::new(config.scoring.clone()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline. `universe` may list instruments in any order and
    /// with repeats; the anchor must be one of them.
    pub fn generate_signals<S: AsRef<str>>(
        &self,
        source: &dyn CandleSource,
        universe: &[S],
        anchor: &str,
    ) -> Result<SignalReport, EngineError> {
        let instruments: BTreeSet<String> =
            universe.iter().map(|s| s.as_ref().to_string()).collect();
        if !instruments.contains(anchor) {
            return Err(EngineError::NoAnchorData {
                anchor: anchor.to_string(),
            });
        }
        info!(
            source = source.name(),
            instruments = instruments.len(),
            anchor,
            "starting signal scan"
        );

        enter(Stage::Fetch);
        let fetched = self.fetch(source, &instruments, anchor)?;

        enter(Stage::Indicate);
        let indicators = precompute_indicators(&fetched.candles, &self.config.indicators);

        enter(Stage::Structure);
        let structures = analyze_structures(
            &fetched.candles,
            &indicators,
            self.structure_tf(),
            &self.config.structure,
        );

        enter(Stage::Context);
        let anchor_structure = lookup(&structures, anchor, self.structure_tf())?;
        let anchor_key = (anchor.to_string(), self.structure_tf());
        let anchor_trigger = (anchor.to_string(), self.trigger_tf());
        let verdict = self.filter.evaluate(&ContextInputs {
            anchor,
            structure_candles: pair(&fetched.candles, &anchor_key)?,
            structure_indicators: pair(&indicators, &anchor_key)?,
            structure: anchor_structure,
            trigger_candles: pair(&fetched.candles, &anchor_trigger)?,
        });
        info!(
            anchor,
            trend = %verdict.trend,
            strength = verdict.trend_strength,
            volatility = ?verdict.volatility,
            session = %verdict.session_quality,
            should_trade = verdict.should_trade,
            "context verdict"
        );

        enter(Stage::Detect);
        let mut candidates: Vec<Candidate> = Vec::new();
        for instrument in &instruments {
            let key = (instrument.clone(), self.trigger_tf());
            let found = self.detector.detect(&SetupInputs {
                instrument,
                trigger_candles: pair(&fetched.candles, &key)?,
                trigger_indicators: pair(&indicators, &key)?,
                structure: lookup(&structures, instrument, self.structure_tf())?,
                verdict: &verdict,
            });
            debug!(instrument = %instrument, candidates = found.len(), "setups evaluated");
            candidates.extend(found);
        }

        enter(Stage::Score);
        let scored: Vec<Signal> = candidates
            .iter()
            .filter_map(|c| self.scorer.score(c, &verdict))
            .collect();

        enter(Stage::Rank);
        let signals = if verdict.should_trade {
            rank_signals(scored, self.config.scoring.max_signals)
        } else {
            if !scored.is_empty() {
                info!(
                    suppressed = scored.len(),
                    "context gate closed, suppressing signals"
                );
            }
            Vec::new()
        };

        enter(Stage::Done);
        let fingerprint = RunFingerprint {
            config_hash: self.config.fingerprint(),
            dataset_hash: fetched.dataset_hash,
            as_of: verdict.metrics.as_of,
        };
        let run_id = fingerprint.run_id();
        for (rank, s) in signals.iter().enumerate() {
            info!(
                rank = rank + 1,
                instrument = s.instrument(),
                direction = %s.direction(),
                score = s.score,
                confidence = %s.confidence,
                "signal"
            );
        }
        info!(
            run_id = %run_id,
            candidates = candidates.len(),
            signals = signals.len(),
            "scan complete"
        );

        Ok(SignalReport {
            context: verdict,
            candidates,
            signals,
            fingerprint,
            run_id,
        })
    }

    /// `generate_signals` with every error folded into a reason code.
    pub fn run<S: AsRef<str>>(
        &self,
        source: &dyn CandleSource,
        universe: &[S],
        anchor: &str,
    ) -> RunOutcome {
        let result = self.generate_signals(source, universe, anchor);
        if let Err(e) = &result {
            warn!(code = %e.reason_code(), "scan aborted: {e}");
        }
        RunOutcome::from(result)
    }

    fn structure_tf(&self) -> Timeframe {
        self.config.run.structure_timeframe
    }

    fn trigger_tf(&self) -> Timeframe {
        self.config.run.trigger_timeframe
    }

    fn fetch(
        &self,
        source: &dyn CandleSource,
        instruments: &BTreeSet<String>,
        anchor: &str,
    ) -> Result<Fetched, EngineError> {
        let required = self.config.indicators.required_candles();
        let limit = self.config.run.candle_limit;
        let mut candles = BTreeMap::new();
        let mut hasher = DatasetHasher::new();

        for instrument in instruments {
            for timeframe in [self.structure_tf(), self.trigger_tf()] {
                let series = match source.get_candles(instrument, timeframe, limit) {
                    Ok(series) => series,
                    Err(SourceError::NotFound { .. }) if instrument == anchor => {
                        return Err(EngineError::NoAnchorData {
                            anchor: anchor.to_string(),
                        })
                    }
                    Err(e) => return Err(e.into()),
                };
                if series.is_empty() && instrument == anchor {
                    return Err(EngineError::NoAnchorData {
                        anchor: anchor.to_string(),
                    });
                }
                validate_candles(instrument, timeframe, &series)?;
                ensure_sufficient(instrument, timeframe, &series, required)?;
                debug!(
                    instrument = %instrument,
                    timeframe = %timeframe,
                    candles = series.len(),
                    "candles fetched"
                );
                hasher.update(instrument, timeframe, &series);
                candles.insert((instrument.clone(), timeframe), series);
            }
        }

        Ok(Fetched {
            candles,
            dataset_hash: hasher.finish(),
        })
    }
}

fn enter(stage: Stage) {
    debug!(stage = %stage, "entering stage");
}

/// Fetch stores every requested pair; a miss surfaces as a missing series.
fn pair<'a, T>(map: &'a BTreeMap<PairKey, T>, key: &PairKey) -> Result<&'a T, EngineError> {
    map.get(key).ok_or_else(|| missing(&key.0, key.1))
}

fn lookup<'a>(
    map: &'a BTreeMap<String, MarketStructure>,
    instrument: &str,
    timeframe: Timeframe,
) -> Result<&'a MarketStructure, EngineError> {
    map.get(instrument).ok_or_else(|| missing(instrument, timeframe))
}

fn missing(instrument: &str, timeframe: Timeframe) -> EngineError {
    EngineError::Source(SourceError::NotFound {
        instrument: instrument.to_string(),
        timeframe,
    })
}

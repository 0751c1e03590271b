//! TapeScan Core: multi-timeframe OHLCV signal engine.
//!
//! This crate turns candle windows into ranked trade signals:
//! - Domain types (candles, timeframes, zones, verdicts, candidates, signals)
//! - Causal indicator library (EMA, ATR, ADX/±DI, RSI, VWAP, session VWAP)
//! - Market structure (swings, ATR-tolerance zones, bias) and key levels
//! - Anchor context filter, setup detector and weighted scorer
//! - Staged, stateless signal engine with deterministic run fingerprints

pub mod components;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod levels;
pub mod structure;

pub use config::EngineConfig;
pub use engine::{CandleSource, MemoryCandleSource, RunOutcome, SignalEngine, SignalReport};
pub use error::{ConfigError, EngineError, ReasonCode, SourceError};

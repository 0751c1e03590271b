//! Engine error taxonomy and the stable reason codes handed to API callers.

use crate::domain::Timeframe;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a `CandleSource`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no candles stored for {instrument} {timeframe}")]
    NotFound {
        instrument: String,
        timeframe: Timeframe,
    },

    #[error("candle source unavailable: {0}")]
    Unavailable(String),
}

/// Invalid or unreadable engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors that abort a signal run. No partial result is ever produced.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "insufficient data for {instrument} {timeframe}: need at least {required} candles, got {available}"
    )]
    InsufficientData {
        instrument: String,
        timeframe: Timeframe,
        required: usize,
        available: usize,
    },

    #[error("invalid candle sequence for {instrument} {timeframe} at index {index}: {reason}")]
    InvalidCandleSequence {
        instrument: String,
        timeframe: Timeframe,
        index: usize,
        reason: String,
    },

    #[error("no candle data for anchor instrument {anchor}")]
    NoAnchorData { anchor: String },

    #[error("candle source error: {0}")]
    Source(#[from] SourceError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn reason_code(&self) -> ReasonCode {
        match self {
            EngineError::InsufficientData { .. } => ReasonCode::InsufficientData,
            EngineError::InvalidCandleSequence { .. } => ReasonCode::InvalidCandleSequence,
            EngineError::NoAnchorData { .. } => ReasonCode::NoAnchorData,
            EngineError::Source(_) => ReasonCode::SourceUnavailable,
            EngineError::Config(_) => ReasonCode::InvalidConfig,
        }
    }
}

/// Stable machine-readable reason for "no signals available".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    InsufficientData,
    InvalidCandleSequence,
    NoAnchorData,
    SourceUnavailable,
    InvalidConfig,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::InsufficientData => "INSUFFICIENT_DATA",
            ReasonCode::InvalidCandleSequence => "INVALID_CANDLE_SEQUENCE",
            ReasonCode::NoAnchorData => "NO_ANCHOR_DATA",
            ReasonCode::SourceUnavailable => "SOURCE_UNAVAILABLE",
            ReasonCode::InvalidConfig => "INVALID_CONFIG",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_are_stable() {
        let err = EngineError::NoAnchorData {
            anchor: "BTC".into(),
        };
        assert_eq!(err.reason_code(), ReasonCode::NoAnchorData);
        assert_eq!(err.reason_code().to_string(), "NO_ANCHOR_DATA");

        let err = EngineError::from(SourceError::Unavailable("down".into()));
        assert_eq!(err.reason_code(), ReasonCode::SourceUnavailable);

        let json = serde_json::to_string(&ReasonCode::InvalidCandleSequence).unwrap();
        assert_eq!(json, "\"INVALID_CANDLE_SEQUENCE\"");
    }

    #[test]
    fn error_messages_name_the_pair() {
        let err = EngineError::InsufficientData {
            instrument: "ETH".into(),
            timeframe: Timeframe::H4,
            required: 50,
            available: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("ETH 4h"), "{msg}");
        assert!(msg.contains("50"));
        assert!(msg.contains("12"));
    }
}

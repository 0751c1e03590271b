//! Run fingerprinting: deterministic identification of scan inputs.
//!
//! - `ConfigHash`: BLAKE3 of the canonical JSON form of an `EngineConfig`.
//! - `DatasetHash`: BLAKE3 over every candle the run consumed, in pair order.
//! - `RunFingerprint`: both hashes plus the run's as-of time.
//!
//! Two runs with equal fingerprints produce identical reports.

use crate::domain::{Candle, Timeframe};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    /// Hash any serializable value through its JSON form.
    ///
    /// Struct fields serialize in declaration order and maps are `BTreeMap`s,
    /// so the JSON is canonical.
    pub fn of<T: Serialize>(value: &T) -> Self {
        // Serializing plain config structs cannot fail; an empty payload still hashes.
        let json = serde_json::to_vec(value).unwrap_or_default();
        Self(blake3::hash(&json).to_hex().to_string())
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Incremental dataset hasher. Feed pairs in a deterministic order.
#[derive(Default)]
pub struct DatasetHasher {
    hasher: blake3::Hasher,
}

impl DatasetHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, instrument: &str, timeframe: Timeframe, candles: &[Candle]) {
        self.hasher.update(instrument.as_bytes());
        self.hasher.update(&[0]);
        self.hasher.update(timeframe.label().as_bytes());
        self.hasher.update(&(candles.len() as u64).to_le_bytes());
        for c in candles {
            self.hasher.update(&c.timestamp.to_le_bytes());
            for v in [c.open, c.high, c.low, c.close, c.volume] {
                self.hasher.update(&v.to_bits().to_le_bytes());
            }
        }
    }

    pub fn finish(self) -> DatasetHash {
        DatasetHash(self.hasher.finalize().to_hex().to_string())
    }
}

/// Identity of one scan: what configuration ran over which data, as of when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    /// Epoch seconds of the latest trigger-timeframe candle of the anchor.
    pub as_of: i64,
}

impl RunFingerprint {
    /// Combined run id.
    pub fn run_id(&self) -> String {
        let canonical = serde_json::json!({
            "config_hash": &self.config_hash.0,
            "dataset_hash": &self.dataset_hash.0,
            "as_of": self.as_of,
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }
}

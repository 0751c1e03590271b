//! Domain types for the signal engine.

pub mod candle;
pub mod context;
pub mod market;
pub mod signal;
pub mod timeframe;

pub use candle::Candle;
pub use context::{ContextMetrics, ContextVerdict, SessionQuality, TrendState, VolatilityRegime};
pub use market::{
    KeyLevel, KeyLevelKind, MarketSession, MarketStructure, StructureBias, SwingKind, SwingPoint,
    Zone, ZoneStrength,
};
pub use signal::{
    Candidate, CandidateMetrics, Confidence, Direction, EntryZone, ScoreBreakdown, Signal,
};
pub use timeframe::{ParseTimeframeError, Timeframe};

/// Instrument identifier, e.g. `"BTC"`.
pub type Instrument = String;

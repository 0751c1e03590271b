//! Pipeline components, one per engine stage after INDICATE:
//! - Indicator set: typed per-pair series computed once per run
//! - Context filter: anchor verdict that gates the whole run
//! - Setup detector: long/short candidates with evidence
//! - Scorer: weighted score, tiers, trade levels and ranking

pub mod filter;
pub mod indicator;
pub mod scorer;
pub mod setup;

pub use filter::ContextFilter;
pub use indicator::{Indicator, IndicatorSet, Series};
pub use scorer::{rank_signals, Scorer};
pub use setup::SetupDetector;

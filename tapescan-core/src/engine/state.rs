//! Run stages and run results.

use crate::domain::{Candidate, ContextVerdict, Signal};
use crate::error::{EngineError, ReasonCode};
use crate::fingerprint::RunFingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Fetch,
    Indicate,
    Structure,
    Context,
    Detect,
    Score,
    Rank,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Fetch,
        Stage::Indicate,
        Stage::Structure,
        Stage::Context,
        Stage::Detect,
        Stage::Score,
        Stage::Rank,
        Stage::Done,
    ];

    /// The following stage; `Done` is terminal.
    pub fn next(self) -> Option<Stage> {
        let i = Stage::ALL.iter().position(|&s| s == self)?;
        Stage::ALL.get(i + 1).copied()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "FETCH",
            Stage::Indicate => "INDICATE",
            Stage::Structure => "STRUCTURE",
            Stage::Context => "CONTEXT",
            Stage::Detect => "DETECT",
            Stage::Score => "SCORE",
            Stage::Rank => "RANK",
            Stage::Done => "DONE",
        })
    }
}

/// Complete result of one successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub context: ContextVerdict,
    /// Every candidate the detector produced, including gated ones.
    pub candidates: Vec<Candidate>,
    /// Ranked, at most `max_signals`; empty when the context gate is closed.
    pub signals: Vec<Signal>,
    pub fingerprint: RunFingerprint,
    pub run_id: String,
}

/// Caller-facing outcome: either a report or a reason code, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub report: Option<SignalReport>,
    pub signals: Vec<Signal>,
    pub error: Option<ReasonCode>,
    pub message: Option<String>,
}

impl RunOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<SignalReport, EngineError>> for RunOutcome {
    fn from(result: Result<SignalReport, EngineError>) -> Self {
        match result {
            Ok(report) => RunOutcome {
                signals: report.signals.clone(),
                report: Some(report),
                error: None,
                message: None,
            },
            Err(err) => RunOutcome {
                report: None,
                signals: Vec::new(),
                error: Some(err.reason_code()),
                message: Some(err.to_string()),
            },
        }
    }
}

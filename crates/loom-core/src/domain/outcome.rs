//! Outcome model: how a task's execution concluded.
//!
//! Every derived predicate on `TaskExecutionState` (skipped, up-to-date,
//! from-cache, no-source) is answered from the single classification table
//! in [`TaskExecutionOutcome::traits`]. Adding an outcome kind means adding
//! one variant and one row.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal classification of a task execution.
///
/// Serialized as SCREAMING_SNAKE_CASE so reports read
/// `EXECUTED` / `UP_TO_DATE` / `SKIPPED` / `NO_SOURCE` / `FROM_CACHE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskExecutionOutcome {
    /// Actions ran (successfully or not; failure is tracked separately).
    Executed,
    /// Outputs were already current.
    UpToDate,
    /// Task was disabled or its predicate said no.
    Skipped,
    /// Task had no input source to process.
    NoSource,
    /// Outputs were restored from the build cache.
    FromCache,
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeTraits {
    pub skipped: bool,
    pub up_to_date: bool,
    pub message: Option<&'static str>,
}

impl TaskExecutionOutcome {
    pub const ALL: [TaskExecutionOutcome; 5] = [
        TaskExecutionOutcome::Executed,
        TaskExecutionOutcome::UpToDate,
        TaskExecutionOutcome::Skipped,
        TaskExecutionOutcome::NoSource,
        TaskExecutionOutcome::FromCache,
    ];

    pub const fn traits(self) -> OutcomeTraits {
        match self {
            TaskExecutionOutcome::FromCache => OutcomeTraits {
                skipped: true,
                up_to_date: false,
                message: Some("FROM-CACHE"),
            },
            TaskExecutionOutcome::UpToDate => OutcomeTraits {
                skipped: true,
                up_to_date: true,
                message: Some("UP-TO-DATE"),
            },
            TaskExecutionOutcome::Skipped => OutcomeTraits {
                skipped: true,
                up_to_date: false,
                message: Some("SKIPPED"),
            },
            TaskExecutionOutcome::NoSource => OutcomeTraits {
                skipped: true,
                up_to_date: false,
                message: Some("NO-SOURCE"),
            },
            TaskExecutionOutcome::Executed => OutcomeTraits {
                skipped: false,
                up_to_date: false,
                message: None,
            },
        }
    }

    pub fn is_skipped(self) -> bool {
        self.traits().skipped
    }

    pub fn is_up_to_date(self) -> bool {
        self.traits().up_to_date
    }

    /// Human-readable label shown next to the task in build output.
    pub fn message(self) -> Option<&'static str> {
        self.traits().message
    }
}

impl fmt::Display for TaskExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().unwrap_or("EXECUTED"))
    }
}

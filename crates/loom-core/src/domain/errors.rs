//! Errors raised by illegal lifecycle transitions.
//!
//! These are scheduler bugs, not build failures. The panicking setters on
//! `TaskExecutionState` turn them into a crash; the `try_*` variants hand
//! them back to engines that want to report the bug themselves.

use thiserror::Error;

use super::outcome::TaskExecutionOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("task outcome already set to {existing}, refusing to overwrite with {attempted}")]
    OutcomeAlreadySet {
        existing: TaskExecutionOutcome,
        attempted: TaskExecutionOutcome,
    },

    #[error("task already marked as executed with a failure")]
    FailureAlreadyRecorded,

    #[error("task already executed with outcome {0}")]
    AlreadyExecuted(TaskExecutionOutcome),

    #[error("task is already executing")]
    AlreadyExecuting,
}

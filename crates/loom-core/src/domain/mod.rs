//! Domain model (ids, outcomes, failures, caching verdicts, task state).

pub mod caching;
pub mod errors;
pub mod failure;
pub mod ids;
pub mod outcome;
pub mod state;

pub use caching::{CachingDisabledReasonCategory, TaskOutputCaching};
pub use errors::StateError;
pub use failure::{Cause, TaskExecutionFailure, TaskFailure};
pub use ids::{BuildId, TaskId, TaskPath};
pub use outcome::{OutcomeTraits, TaskExecutionOutcome};
pub use state::{Execution, Lifecycle, TaskExecutionState};

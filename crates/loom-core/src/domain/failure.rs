//! Failure model: individual causes and the aggregated task failure.
//!
//! A task can accumulate several failures over its lifetime (its own action
//! failing, a finalizer failing, a validation problem reported later, ...).
//! [`merge`] folds them into one flat, ordered cause list and never drops a
//! prior cause.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One underlying error contributing to a task failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct Cause {
    message: String,

    /// Messages of the error's `source()` chain, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    chain: Vec<String>,
}

impl Cause {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            chain: Vec::new(),
        }
    }

    /// Capture an arbitrary error together with its `source()` chain.
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut next = error.source();
        while let Some(source) = next {
            chain.push(source.to_string());
            next = source.source();
        }
        Self {
            message: error.to_string(),
            chain,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }
}

impl From<&str> for Cause {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for Cause {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// The multi-cause failure kind: a headline plus an ordered list of causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct TaskExecutionFailure {
    message: String,
    causes: Vec<Cause>,
}

impl TaskExecutionFailure {
    pub fn new(message: impl Into<String>, causes: Vec<Cause>) -> Self {
        Self {
            message: message.into(),
            causes,
        }
    }

    /// Convenience for the common "one action failed" case.
    pub fn single(message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        Self::new(message, vec![cause.into()])
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn causes(&self) -> &[Cause] {
        &self.causes
    }

    fn append(&mut self, causes: Vec<Cause>) {
        self.causes.extend(causes);
    }
}

/// Aggregated failure recorded on a task.
///
/// `Single` is any one fault recorded directly as the task's outcome;
/// `Multi` is the flattened, multi-cause kind produced by [`merge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "value")]
pub enum TaskFailure {
    #[error(transparent)]
    Single(Cause),

    #[error(transparent)]
    Multi(TaskExecutionFailure),
}

impl TaskFailure {
    /// The flat, ordered list of root causes.
    pub fn causes(&self) -> Vec<&Cause> {
        match self {
            TaskFailure::Single(cause) => vec![cause],
            TaskFailure::Multi(failure) => failure.causes.iter().collect(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            TaskFailure::Single(cause) => cause.message(),
            TaskFailure::Multi(failure) => failure.message(),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, TaskFailure::Multi(_))
    }

    /// View this failure as the multi-cause kind. A single fault becomes a
    /// one-cause failure carrying its own message as headline.
    pub fn into_execution_failure(self) -> TaskExecutionFailure {
        match self {
            TaskFailure::Multi(failure) => failure,
            TaskFailure::Single(cause) => {
                TaskExecutionFailure::new(cause.message.clone(), vec![cause])
            }
        }
    }
}

impl From<Cause> for TaskFailure {
    fn from(cause: Cause) -> Self {
        TaskFailure::Single(cause)
    }
}

impl From<TaskExecutionFailure> for TaskFailure {
    fn from(failure: TaskExecutionFailure) -> Self {
        TaskFailure::Multi(failure)
    }
}

/// Fold `incoming` into `existing`.
///
/// - nothing recorded: `incoming` is stored as-is;
/// - existing multi-cause failure: keeps its headline, incoming causes appended;
/// - existing single fault: becomes the first cause of `incoming`.
pub fn merge(existing: Option<TaskFailure>, incoming: TaskExecutionFailure) -> TaskFailure {
    match existing {
        None => TaskFailure::Multi(incoming),
        Some(TaskFailure::Multi(mut failure)) => {
            failure.append(incoming.causes);
            TaskFailure::Multi(failure)
        }
        Some(TaskFailure::Single(cause)) => {
            let mut causes = Vec::with_capacity(incoming.causes.len() + 1);
            causes.push(cause);
            causes.extend(incoming.causes);
            TaskFailure::Multi(TaskExecutionFailure::new(incoming.message, causes))
        }
    }
}

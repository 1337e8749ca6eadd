//! Output caching verdict for a task.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a task's outputs may not be stored in or loaded from the build cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CachingDisabledReasonCategory {
    /// Verdict not computed yet.
    Unknown,
    BuildCacheDisabled,
    NotEnabledForTask,
    CacheIfSpecNotSatisfied,
    DoNotCacheIfSpecSatisfied,
    NoOutputsDeclared,
    NonCacheableOutput,
    OverlappingOutputs,
    NonCacheableTaskImplementation,
    NonCacheableTaskAction,
    NonCacheableInputs,
    ValidationFailure,
}

pub const NOT_DETERMINED: &str = "Cacheability was not determined";

/// Caching verdict. "Enabled" and "disabled with a reason" are exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskOutputCaching {
    Enabled,
    Disabled {
        category: CachingDisabledReasonCategory,
        reason: String,
    },
}

impl TaskOutputCaching {
    pub fn enabled() -> Self {
        TaskOutputCaching::Enabled
    }

    pub fn disabled(category: CachingDisabledReasonCategory, reason: impl Into<String>) -> Self {
        TaskOutputCaching::Disabled {
            category,
            reason: reason.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, TaskOutputCaching::Enabled)
    }

    pub fn disabled_reason(&self) -> Option<&str> {
        match self {
            TaskOutputCaching::Enabled => None,
            TaskOutputCaching::Disabled { reason, .. } => Some(reason),
        }
    }

    pub fn disabled_reason_category(&self) -> Option<CachingDisabledReasonCategory> {
        match self {
            TaskOutputCaching::Enabled => None,
            TaskOutputCaching::Disabled { category, .. } => Some(*category),
        }
    }
}

impl Default for TaskOutputCaching {
    fn default() -> Self {
        Self::disabled(CachingDisabledReasonCategory::Unknown, NOT_DETERMINED)
    }
}

impl fmt::Display for TaskOutputCaching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutputCaching::Enabled => f.write_str("Caching enabled"),
            TaskOutputCaching::Disabled { reason, .. } => {
                write!(f, "Caching disabled: {reason}")
            }
        }
    }
}

//! Read-only views handed to reporting.

use serde::{Deserialize, Serialize};

use crate::domain::{
    BuildId, TaskExecutionOutcome, TaskExecutionState, TaskId, TaskOutputCaching, TaskPath,
};

/// Serializable snapshot of one task's execution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStateView {
    pub id: TaskId,
    pub path: TaskPath,
    pub outcome: Option<TaskExecutionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_message: Option<String>,
    pub did_work: bool,
    pub actionable: bool,
    pub incremental: bool,
    pub caching: TaskOutputCaching,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl TaskStateView {
    pub fn new(id: TaskId, path: &TaskPath, state: &TaskExecutionState) -> Self {
        let failure = state.failure();
        Self {
            id,
            path: path.clone(),
            outcome: state.outcome(),
            skip_message: state.skip_message().map(str::to_string),
            did_work: state.did_work(),
            actionable: state.is_actionable(),
            incremental: state.is_incremental(),
            caching: state.task_output_caching().clone(),
            failure: failure.map(|f| f.message().to_string()),
            causes: failure
                .map(|f| {
                    f.causes()
                        .into_iter()
                        .map(|c| c.message().to_string())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Task counts by how they finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub executed: usize,
    pub failed: usize,
    pub up_to_date: usize,
    pub from_cache: usize,
    pub skipped: usize,
    pub no_source: usize,
    pub not_run: usize,
}

impl BuildSummary {
    pub fn record(&mut self, state: &TaskExecutionState) {
        if state.failure().is_some() {
            self.failed += 1;
            return;
        }
        match state.outcome() {
            None => self.not_run += 1,
            Some(TaskExecutionOutcome::Executed) => self.executed += 1,
            Some(TaskExecutionOutcome::UpToDate) => self.up_to_date += 1,
            Some(TaskExecutionOutcome::FromCache) => self.from_cache += 1,
            Some(TaskExecutionOutcome::Skipped) => self.skipped += 1,
            Some(TaskExecutionOutcome::NoSource) => self.no_source += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.executed
            + self.failed
            + self.up_to_date
            + self.from_cache
            + self.skipped
            + self.no_source
            + self.not_run
    }

    /// Tasks that had to run actions, as opposed to being avoided.
    pub fn actionable_work(&self) -> usize {
        self.executed + self.failed
    }
}

impl<'a> FromIterator<&'a TaskExecutionState> for BuildSummary {
    fn from_iter<I: IntoIterator<Item = &'a TaskExecutionState>>(iter: I) -> Self {
        let mut summary = BuildSummary::default();
        for state in iter {
            summary.record(state);
        }
        summary
    }
}

/// Whole-build report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub build_id: BuildId,
    pub successful: bool,
    pub summary: BuildSummary,
    pub tasks: Vec<TaskStateView>,
}

//! Runs a list of task nodes in order and collects their results.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use super::executer::TaskExecuter;
use super::node::{TaskNode, TaskSpec};
use crate::config::ExecutorConfig;
use crate::domain::{BuildId, StateError, TaskFailure, TaskId, TaskPath};
use crate::report::{BuildReport, BuildSummary, TaskStateView};

/// Build file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSpec {
    pub tasks: Vec<TaskSpec>,

    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("execution failed for task '{path}': {source}")]
    TaskFailed {
        path: TaskPath,
        #[source]
        source: TaskFailure,
    },

    #[error("{} tasks failed", .failures.len())]
    TasksFailed { failures: Vec<(TaskPath, TaskFailure)> },

    /// The engine drove a task through an illegal transition. This is a bug.
    #[error("illegal state transition for task '{path}': {source}")]
    IllegalTransition {
        path: TaskPath,
        #[source]
        source: StateError,
    },
}

/// One build invocation: an ordered list of tasks and their states.
#[derive(Debug)]
pub struct Build {
    id: BuildId,
    config: ExecutorConfig,
    executer: TaskExecuter,
    nodes: Vec<TaskNode>,
}

impl Build {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            id: BuildId::generate(),
            config,
            executer: TaskExecuter::new(),
            nodes: Vec::new(),
        }
    }

    pub fn from_spec(spec: BuildSpec) -> Self {
        let mut build = Self::new(spec.executor);
        for task in spec.tasks {
            build.add_task(task.into());
        }
        build
    }

    pub fn id(&self) -> BuildId {
        self.id
    }

    pub fn add_task(&mut self, node: TaskNode) -> TaskId {
        let id = node.id();
        self.nodes.push(node);
        id
    }

    pub fn tasks(&self) -> &[TaskNode] {
        &self.nodes
    }

    /// Execute every task in order.
    ///
    /// Without `continue_after_failure` the first failed task stops the build
    /// and later tasks stay configurable.
    #[instrument(name = "build_run", skip_all, fields(build = %self.id))]
    pub async fn run(&mut self) -> Result<(), BuildError> {
        info!(tasks = self.nodes.len(), "build started");
        let mut failures = Vec::new();

        for node in &mut self.nodes {
            self.executer
                .execute(node)
                .await
                .map_err(|source| BuildError::IllegalTransition {
                    path: node.path().clone(),
                    source,
                })?;

            if let Err(failure) = node.state().rethrow_failure() {
                error!(task = %node.path(), error = %failure, "task failed");
                failures.push((node.path().clone(), failure));
                if !self.config.continue_after_failure {
                    break;
                }
            }
        }

        let summary = self.summary();
        info!(
            executed = summary.executed,
            up_to_date = summary.up_to_date,
            from_cache = summary.from_cache,
            failed = summary.failed,
            "build finished"
        );

        match failures.len() {
            0 => Ok(()),
            1 => {
                let (path, source) = failures.remove(0);
                Err(BuildError::TaskFailed { path, source })
            }
            _ => Err(BuildError::TasksFailed { failures }),
        }
    }

    pub fn summary(&self) -> BuildSummary {
        self.nodes.iter().map(TaskNode::state).collect()
    }

    pub fn report(&self) -> BuildReport {
        let summary = self.summary();
        BuildReport {
            build_id: self.id,
            successful: summary.failed == 0,
            summary,
            tasks: self
                .nodes
                .iter()
                .map(|node| TaskStateView::new(node.id(), node.path(), node.state()))
                .collect(),
        }
    }
}

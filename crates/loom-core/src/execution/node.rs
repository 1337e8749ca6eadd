use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::action::{ScriptedAction, TaskAction};
use crate::domain::{TaskExecutionState, TaskId, TaskOutputCaching, TaskPath};

/// Up-to-date / cache verdict computed before the task runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionVerdict {
    #[default]
    Execute,
    UpToDate,
    FromCache,
}

/// A task as the executer sees it: inputs to the decision plus its state.
pub struct TaskNode {
    pub(crate) id: TaskId,
    pub(crate) path: TaskPath,
    pub(crate) enabled: bool,
    pub(crate) actions: Vec<Arc<dyn TaskAction>>,
    pub(crate) has_source: bool,
    pub(crate) verdict: ExecutionVerdict,
    pub(crate) caching: TaskOutputCaching,
    pub(crate) incremental: bool,
    pub(crate) state: TaskExecutionState,
}

impl TaskNode {
    pub fn new(path: impl Into<TaskPath>) -> Self {
        Self {
            id: TaskId::generate(),
            path: path.into(),
            enabled: true,
            actions: Vec::new(),
            has_source: true,
            verdict: ExecutionVerdict::Execute,
            caching: TaskOutputCaching::default(),
            incremental: false,
            state: TaskExecutionState::new(),
        }
    }

    pub fn with_action(mut self, action: Arc<dyn TaskAction>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn has_source(mut self, has_source: bool) -> Self {
        self.has_source = has_source;
        self
    }

    pub fn with_verdict(mut self, verdict: ExecutionVerdict) -> Self {
        self.verdict = verdict;
        self
    }

    pub fn with_caching(mut self, caching: TaskOutputCaching) -> Self {
        self.caching = caching;
        self
    }

    pub fn incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn path(&self) -> &TaskPath {
        &self.path
    }

    pub fn state(&self) -> &TaskExecutionState {
        &self.state
    }
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("actions", &self.actions.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Task description as written in a build file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub path: TaskPath,

    #[serde(default = "yes")]
    pub enabled: bool,

    #[serde(default)]
    pub actions: Vec<ScriptedAction>,

    #[serde(default = "yes")]
    pub has_source: bool,

    #[serde(default)]
    pub verdict: ExecutionVerdict,

    #[serde(default)]
    pub caching: TaskOutputCaching,

    #[serde(default)]
    pub incremental: bool,
}

fn yes() -> bool {
    true
}

impl From<TaskSpec> for TaskNode {
    fn from(spec: TaskSpec) -> Self {
        let node = TaskNode::new(spec.path)
            .enabled(spec.enabled)
            .has_source(spec.has_source)
            .with_verdict(spec.verdict)
            .with_caching(spec.caching)
            .incremental(spec.incremental);
        spec.actions
            .into_iter()
            .fold(node, |node, action| node.with_action(Arc::new(action)))
    }
}

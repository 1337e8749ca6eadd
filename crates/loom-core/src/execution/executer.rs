//! Drives one task node through its lifecycle.
//!
//! Order of checks:
//! 1. disabled -> SKIPPED
//! 2. no actions -> not actionable, UP-TO-DATE
//! 3. no source -> NO-SOURCE
//! 4. record caching verdict and incremental flag
//! 5. up-to-date / cache hit verdict -> that outcome
//! 6. run actions in order; the first failing action fails the task

use tracing::{debug, error, info, instrument, warn};

use super::action::WorkResult;
use super::node::{ExecutionVerdict, TaskNode};
use crate::domain::{StateError, TaskExecutionFailure, TaskExecutionOutcome};

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskExecuter;

impl TaskExecuter {
    pub fn new() -> Self {
        Self
    }

    /// Execute a node. A task failure is recorded on the node's state, not
    /// returned; `Err` means the node was driven through an illegal transition
    /// (e.g. executed twice).
    #[instrument(name = "task_execute", skip_all, fields(task = %node.path))]
    pub async fn execute(&self, node: &mut TaskNode) -> Result<(), StateError> {
        let TaskNode {
            path,
            enabled,
            actions,
            has_source,
            verdict,
            caching,
            incremental,
            state,
            ..
        } = node;

        if let Some(outcome) = state.outcome() {
            return Err(StateError::AlreadyExecuted(outcome));
        }

        if !*enabled {
            debug!("task is disabled");
            return state.try_set_outcome(TaskExecutionOutcome::Skipped);
        }

        if actions.is_empty() {
            debug!("task has no actions");
            state.set_actionable(false);
            return state.try_set_outcome(TaskExecutionOutcome::UpToDate);
        }

        if !*has_source {
            debug!("task has no source");
            return state.try_set_outcome(TaskExecutionOutcome::NoSource);
        }

        state.set_task_output_caching(caching.clone());
        state.set_incremental(*incremental);

        match verdict {
            ExecutionVerdict::UpToDate => {
                info!("task is up-to-date");
                return state.try_set_outcome(TaskExecutionOutcome::UpToDate);
            }
            ExecutionVerdict::FromCache if caching.is_enabled() => {
                info!("task outputs loaded from cache");
                return state.try_set_outcome(TaskExecutionOutcome::FromCache);
            }
            ExecutionVerdict::FromCache => {
                warn!(%caching, "cache hit reported for a task with caching disabled; executing");
            }
            ExecutionVerdict::Execute => {}
        }

        let mut execution = state.begin_execution()?;
        let mut did_work = false;
        for action in actions.iter() {
            match action.execute(path).await {
                Ok(WorkResult::DidWork) => did_work = true,
                Ok(WorkResult::DidNoWork) => {}
                Err(cause) => {
                    error!(action = action.display_name(), error = %cause, "task action failed");
                    execution.set_did_work(did_work);
                    execution.fail(TaskExecutionFailure::single(
                        format!("Execution failed for task '{path}'."),
                        cause,
                    ));
                    return Ok(());
                }
            }
        }

        execution.set_did_work(did_work);
        execution.complete(TaskExecutionOutcome::Executed);
        info!(did_work, "task executed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CachingDisabledReasonCategory, TaskOutputCaching};
    use crate::execution::action::ScriptedAction;
    use std::sync::Arc;

    fn succeed() -> Arc<ScriptedAction> {
        Arc::new(ScriptedAction::Succeed { did_work: true })
    }

    fn fail(message: &str) -> Arc<ScriptedAction> {
        Arc::new(ScriptedAction::Fail {
            message: message.to_string(),
        })
    }

    #[tokio::test]
    async fn runs_actions_and_records_executed() {
        let mut node = TaskNode::new(":app:compile").with_action(succeed());
        TaskExecuter::new().execute(&mut node).await.unwrap();

        let state = node.state();
        assert_eq!(state.outcome(), Some(TaskExecutionOutcome::Executed));
        assert!(state.did_work());
        assert!(state.failure().is_none());
        assert!(!state.executing());
    }

    #[tokio::test]
    async fn no_work_actions_leave_did_work_false() {
        let mut node = TaskNode::new(":app:check")
            .with_action(Arc::new(ScriptedAction::Succeed { did_work: false }));
        TaskExecuter::new().execute(&mut node).await.unwrap();
        assert!(!node.state().did_work());
    }

    #[tokio::test]
    async fn first_failing_action_stops_the_task() {
        let mut node = TaskNode::new(":app:test")
            .with_action(succeed())
            .with_action(fail("tests failed"))
            .with_action(fail("never runs"));
        TaskExecuter::new().execute(&mut node).await.unwrap();

        let state = node.state();
        assert_eq!(state.outcome(), Some(TaskExecutionOutcome::Executed));
        assert!(state.did_work());
        let failure = state.failure().expect("failure recorded");
        assert_eq!(failure.message(), "Execution failed for task ':app:test'.");
        let causes: Vec<_> = failure.causes().into_iter().map(|c| c.message()).collect();
        assert_eq!(causes, vec!["tests failed"]);
    }

    #[tokio::test]
    async fn disabled_task_is_skipped() {
        let mut node = TaskNode::new(":docs").with_action(succeed()).enabled(false);
        TaskExecuter::new().execute(&mut node).await.unwrap();
        assert!(node.state().skipped());
        assert_eq!(node.state().skip_message(), Some("SKIPPED"));
    }

    #[tokio::test]
    async fn task_without_actions_is_not_actionable() {
        let mut node = TaskNode::new(":assemble");
        TaskExecuter::new().execute(&mut node).await.unwrap();
        assert!(!node.state().is_actionable());
        assert!(node.state().up_to_date());
    }

    #[tokio::test]
    async fn task_without_source_is_no_source() {
        let mut node = TaskNode::new(":compileKotlin")
            .with_action(succeed())
            .has_source(false);
        TaskExecuter::new().execute(&mut node).await.unwrap();
        assert!(node.state().no_source());
    }

    #[tokio::test]
    async fn cache_hit_with_caching_enabled_is_from_cache() {
        let mut node = TaskNode::new(":jar")
            .with_action(fail("must not run"))
            .with_verdict(ExecutionVerdict::FromCache)
            .with_caching(TaskOutputCaching::enabled())
            .incremental(true);
        TaskExecuter::new().execute(&mut node).await.unwrap();

        let state = node.state();
        assert!(state.is_from_cache());
        assert!(!state.up_to_date());
        assert!(state.task_output_caching().is_enabled());
        assert!(state.is_incremental());
        assert!(state.failure().is_none());
    }

    #[tokio::test]
    async fn cache_hit_with_caching_disabled_executes() {
        let mut node = TaskNode::new(":jar")
            .with_action(succeed())
            .with_verdict(ExecutionVerdict::FromCache)
            .with_caching(TaskOutputCaching::disabled(
                CachingDisabledReasonCategory::BuildCacheDisabled,
                "Build cache is disabled",
            ));
        TaskExecuter::new().execute(&mut node).await.unwrap();
        assert_eq!(node.state().outcome(), Some(TaskExecutionOutcome::Executed));
    }

    #[tokio::test]
    async fn up_to_date_verdict_skips_actions() {
        let mut node = TaskNode::new(":processResources")
            .with_action(fail("must not run"))
            .with_verdict(ExecutionVerdict::UpToDate);
        TaskExecuter::new().execute(&mut node).await.unwrap();
        assert!(node.state().up_to_date());
        assert!(node.state().failure().is_none());
    }

    #[tokio::test]
    async fn executing_twice_is_an_illegal_transition() {
        let mut node = TaskNode::new(":app:compile").with_action(succeed());
        let executer = TaskExecuter::new();
        executer.execute(&mut node).await.unwrap();

        let err = executer.execute(&mut node).await.unwrap_err();
        assert_eq!(err, StateError::AlreadyExecuted(TaskExecutionOutcome::Executed));
        assert!(node.state().did_work());
    }
}

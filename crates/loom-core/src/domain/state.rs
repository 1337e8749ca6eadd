//! Per-task execution state.
//!
//! # Lifecycle
//! - Configurable -> Executing -> Executed(outcome)
//! - Configurable -> Executed(outcome) (skipped, up-to-date, from cache, ...)
//!
//! `Executed` is terminal. A retried task gets a fresh `TaskExecutionState`;
//! this value never un-executes.
//!
//! The engine drives the lifecycle through [`TaskExecutionState::begin_execution`],
//! whose [`Execution`] guard is consumed by the terminal write, so one guard
//! cannot record two outcomes. The setter API (`set_outcome`,
//! `set_failed_outcome`) is kept for engines that decide the outcome without
//! running actions; calling it twice is a scheduler bug and panics.

use tracing::{trace, warn};

use super::caching::TaskOutputCaching;
use super::errors::StateError;
use super::failure::{self, TaskExecutionFailure, TaskFailure};
use super::outcome::TaskExecutionOutcome;

/// Where a task is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Configurable,
    Executing,
    Executed(TaskExecutionOutcome),
}

/// Full lifecycle record of one task within one build invocation.
///
/// Single writer (the engine executing the task); readers look at it once
/// the task is executed.
#[derive(Debug, Clone)]
pub struct TaskExecutionState {
    lifecycle: Lifecycle,
    actionable: bool,
    did_work: bool,
    failure: Option<TaskFailure>,
    /// Set by the failure-outcome transition only; `add_failure` leaves it alone.
    failed_outcome_recorded: bool,
    caching: TaskOutputCaching,
    incremental: bool,
}

impl Default for TaskExecutionState {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskExecutionState {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Configurable,
            actionable: true,
            did_work: false,
            failure: None,
            failed_outcome_recorded: false,
            caching: TaskOutputCaching::default(),
            incremental: false,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Flip the executing flag. Ignored once an outcome is recorded.
    pub fn set_executing(&mut self, executing: bool) {
        self.lifecycle = match (self.lifecycle, executing) {
            (Lifecycle::Configurable, true) => Lifecycle::Executing,
            (Lifecycle::Executing, false) => Lifecycle::Configurable,
            (Lifecycle::Executed(outcome), _) => {
                trace!(%outcome, executing, "ignoring executing flag on executed task");
                Lifecycle::Executed(outcome)
            }
            (current, _) => current,
        };
    }

    /// Enter `Executing` and hand out the guard that records the outcome.
    pub fn begin_execution(&mut self) -> Result<Execution<'_>, StateError> {
        match self.lifecycle {
            Lifecycle::Executed(outcome) => Err(StateError::AlreadyExecuted(outcome)),
            Lifecycle::Executing => Err(StateError::AlreadyExecuting),
            Lifecycle::Configurable => {
                self.lifecycle = Lifecycle::Executing;
                trace!("task execution started");
                Ok(Execution {
                    state: self,
                    finished: false,
                })
            }
        }
    }

    /// Record the outcome.
    ///
    /// # Panics
    /// If an outcome was already recorded.
    pub fn set_outcome(&mut self, outcome: TaskExecutionOutcome) {
        if let Err(err) = self.try_set_outcome(outcome) {
            panic!("illegal task state transition: {err}");
        }
    }

    pub fn try_set_outcome(&mut self, outcome: TaskExecutionOutcome) -> Result<(), StateError> {
        if let Lifecycle::Executed(existing) = self.lifecycle {
            return Err(StateError::OutcomeAlreadySet {
                existing,
                attempted: outcome,
            });
        }
        self.record_outcome(outcome);
        Ok(())
    }

    /// Mark the task as executed with the given failure.
    ///
    /// # Panics
    /// If an outcome was already recorded, or this was already called.
    pub fn set_failed_outcome(&mut self, failure: impl Into<TaskFailure>) {
        if let Err(err) = self.try_set_failed_outcome(failure) {
            panic!("illegal task state transition: {err}");
        }
    }

    pub fn try_set_failed_outcome(
        &mut self,
        failure: impl Into<TaskFailure>,
    ) -> Result<(), StateError> {
        if self.failed_outcome_recorded {
            return Err(StateError::FailureAlreadyRecorded);
        }
        if let Lifecycle::Executed(existing) = self.lifecycle {
            return Err(StateError::OutcomeAlreadySet {
                existing,
                attempted: TaskExecutionOutcome::Executed,
            });
        }
        self.record_failed_outcome(failure.into());
        Ok(())
    }

    /// Merge another failure into the recorded one. Never drops a cause.
    pub fn add_failure(&mut self, failure: TaskExecutionFailure) {
        trace!(causes = failure.causes().len(), "adding task failure");
        self.failure = Some(failure::merge(self.failure.take(), failure));
    }

    fn record_outcome(&mut self, outcome: TaskExecutionOutcome) {
        trace!(%outcome, "task outcome recorded");
        self.lifecycle = Lifecycle::Executed(outcome);
    }

    fn record_failed_outcome(&mut self, failure: TaskFailure) {
        self.record_outcome(TaskExecutionOutcome::Executed);
        self.failed_outcome_recorded = true;
        self.failure = Some(match self.failure.take() {
            None => failure,
            Some(existing) => failure::merge(Some(existing), failure.into_execution_failure()),
        });
    }

    // ------------------------------------------------------------------
    // Flags
    // ------------------------------------------------------------------

    pub fn set_did_work(&mut self, did_work: bool) {
        self.did_work = did_work;
    }

    pub fn did_work(&self) -> bool {
        self.did_work
    }

    pub fn set_actionable(&mut self, actionable: bool) {
        self.actionable = actionable;
    }

    pub fn is_actionable(&self) -> bool {
        self.actionable
    }

    pub fn set_incremental(&mut self, incremental: bool) {
        self.incremental = incremental;
    }

    pub fn is_incremental(&self) -> bool {
        self.incremental
    }

    pub fn set_task_output_caching(&mut self, caching: TaskOutputCaching) {
        self.caching = caching;
    }

    pub fn task_output_caching(&self) -> &TaskOutputCaching {
        &self.caching
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn executing(&self) -> bool {
        self.lifecycle == Lifecycle::Executing
    }

    pub fn outcome(&self) -> Option<TaskExecutionOutcome> {
        match self.lifecycle {
            Lifecycle::Executed(outcome) => Some(outcome),
            Lifecycle::Configurable | Lifecycle::Executing => None,
        }
    }

    pub fn executed(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn is_configurable(&self) -> bool {
        self.lifecycle == Lifecycle::Configurable
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        self.failure.as_ref()
    }

    /// Surface the recorded failure as an error. Repeatable; does not clear it.
    pub fn rethrow_failure(&self) -> Result<(), TaskFailure> {
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    pub fn skipped(&self) -> bool {
        self.outcome().is_some_and(TaskExecutionOutcome::is_skipped)
    }

    pub fn skip_message(&self) -> Option<&'static str> {
        self.outcome().and_then(TaskExecutionOutcome::message)
    }

    pub fn up_to_date(&self) -> bool {
        self.outcome().is_some_and(TaskExecutionOutcome::is_up_to_date)
    }

    pub fn no_source(&self) -> bool {
        self.outcome() == Some(TaskExecutionOutcome::NoSource)
    }

    pub fn is_from_cache(&self) -> bool {
        self.outcome() == Some(TaskExecutionOutcome::FromCache)
    }
}

/// Exclusive handle on a task that is currently executing.
///
/// Exactly one of [`Execution::complete`] or [`Execution::fail`] ends it.
#[must_use = "an execution must be completed or failed"]
#[derive(Debug)]
pub struct Execution<'a> {
    state: &'a mut TaskExecutionState,
    finished: bool,
}

impl Execution<'_> {
    pub fn state(&self) -> &TaskExecutionState {
        self.state
    }

    pub fn set_did_work(&mut self, did_work: bool) {
        self.state.set_did_work(did_work);
    }

    pub fn add_failure(&mut self, failure: TaskExecutionFailure) {
        self.state.add_failure(failure);
    }

    pub fn complete(mut self, outcome: TaskExecutionOutcome) {
        self.state.record_outcome(outcome);
        self.finished = true;
    }

    pub fn fail(mut self, failure: impl Into<TaskFailure>) {
        self.state.record_failed_outcome(failure.into());
        self.finished = true;
    }
}

impl Drop for Execution<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("execution dropped without an outcome; task stays executing");
        }
    }
}

//! loom-core
//!
//! Execution state tracking for build tasks.
//!
//! - **domain**: task execution state, outcomes, failures, caching verdicts, ids
//! - **execution**: the engine that drives task states (executer, build runner)
//! - **report**: serializable views for build output
//! - **catalog**: version catalog import filters
//! - **config**: executor configuration and JSON loading

pub mod catalog;
pub mod config;
pub mod domain;
pub mod execution;
pub mod report;

pub use domain::{
    Cause, TaskExecutionFailure, TaskExecutionOutcome, TaskExecutionState, TaskFailure,
    TaskOutputCaching,
};

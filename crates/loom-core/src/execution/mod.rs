//! Execution engine: drives task states through their lifecycle.
//!
//! The engine is the single writer of each `TaskExecutionState`. It never
//! computes up-to-date or caching verdicts itself; those arrive on the
//! `TaskNode`.

mod action;
mod build;
mod executer;
mod node;

pub use action::{ScriptedAction, TaskAction, WorkResult};
pub use build::{Build, BuildError, BuildSpec};
pub use executer::TaskExecuter;
pub use node::{ExecutionVerdict, TaskNode, TaskSpec};

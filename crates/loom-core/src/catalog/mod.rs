//! Version catalog helpers.

pub mod import;

pub use import::{ImportConfiguration, IncludeExcludePredicate};

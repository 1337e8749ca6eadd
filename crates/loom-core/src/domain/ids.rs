//! Domain identifiers (strongly-typed IDs).
//!
//! `Id<T>` is a ULID with a phantom marker, so a `BuildId` can never be
//! passed where a `TaskId` is expected. ULIDs sort by creation time, which
//! keeps per-build task listings in registration order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Supplies the display prefix for each ID kind.
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Build {}

impl IdMarker for Build {
    fn prefix() -> &'static str {
        "build-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

/// Identifier of one build invocation.
pub type BuildId = Id<Build>;

/// Identifier of one task instance within a build.
pub type TaskId = Id<Task>;

/// Human-facing task path, e.g. `:app:compileJava`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskPath(String);

impl TaskPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment (`compileJava` for `:app:compileJava`).
    pub fn name(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TaskPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_prefix() {
        let build = BuildId::generate();
        let task = TaskId::generate();
        assert!(build.to_string().starts_with("build-"));
        assert!(task.to_string().starts_with("task-"));
        // let _: BuildId = task; // <- does not compile
    }

    #[test]
    fn ids_serialize_as_plain_ulid() {
        let ulid = Ulid::new();
        let id = TaskId::from_ulid(ulid);
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, format!("\"{ulid}\""));

        let back: TaskId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn phantom_marker_is_zero_sized() {
        assert_eq!(std::mem::size_of::<TaskId>(), std::mem::size_of::<Ulid>());
    }

    #[test]
    fn task_path_name_is_last_segment() {
        assert_eq!(TaskPath::new(":app:compileJava").name(), "compileJava");
        assert_eq!(TaskPath::new("build").name(), "build");
    }
}

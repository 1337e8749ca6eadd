//! Name filters applied when importing a version catalog.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Include/exclude rule set over plain names.
///
/// A missing include set accepts everything; an empty one accepts nothing.
/// Excludes always win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeExcludePredicate {
    #[serde(skip_serializing_if = "Option::is_none")]
    including: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    excluding: BTreeSet<String>,
}

impl IncludeExcludePredicate {
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn new<I, E, S>(including: Option<I>, excluding: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            including: including.map(|names| names.into_iter().map(Into::into).collect()),
            excluding: excluding.into_iter().map(Into::into).collect(),
        }
    }

    pub fn test(&self, name: &str) -> bool {
        let included = self
            .including
            .as_ref()
            .is_none_or(|names| names.contains(name));
        included && !self.excluding.contains(name)
    }
}

/// Which libraries, bundles and versions to take from an imported catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfiguration {
    libraries: IncludeExcludePredicate,
    bundles: IncludeExcludePredicate,
    versions: IncludeExcludePredicate,
}

impl ImportConfiguration {
    pub fn new(
        libraries: IncludeExcludePredicate,
        bundles: IncludeExcludePredicate,
        versions: IncludeExcludePredicate,
    ) -> Self {
        Self {
            libraries,
            bundles,
            versions,
        }
    }

    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn include_library(&self, name: &str) -> bool {
        self.libraries.test(name)
    }

    pub fn include_bundle(&self, name: &str) -> bool {
        self.bundles.test(name)
    }

    pub fn include_version(&self, version: &str) -> bool {
        self.versions.test(version)
    }
}

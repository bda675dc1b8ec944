//! Platform user handles and the alias table that collapses them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A review-platform login handle.
///
/// Equality is case-sensitive byte comparison. Any folding of secondary
/// handles happens through [`AliasTable::canonical`] before identities are
/// compared, never inside `Identity` itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(handle: &str) -> Self {
        Self(handle.to_string())
    }
}

impl From<String> for Identity {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

/// One-way `alias -> canonical` rewrite table.
///
/// Consulted every time a handle enters the system: change-request creators,
/// timeline actors, and tracker assignees are all rewritten before they
/// participate in any equality check or fallback selection. Handles with no
/// entry pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable(BTreeMap<String, String>);

impl AliasTable {
    /// Rewrite `raw` to its canonical identity, or echo it back unchanged.
    #[must_use]
    pub fn canonical(&self, raw: &str) -> Identity {
        self.0
            .get(raw)
            .map_or_else(|| Identity::new(raw), |canonical| Identity::new(canonical.clone()))
    }

    pub fn insert(&mut self, alias: impl Into<String>, canonical: impl Into<String>) {
        self.0.insert(alias.into(), canonical.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

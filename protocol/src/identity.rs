//! # Identity Module
//!
//! A [`Principal`] is whoever the host says is calling. Authentication,
//! address encoding and checksum validation all happen before a call reaches
//! the ledger, so here a principal is nothing more than an opaque,
//! comparable, hashable string.
//!
//! Project and grid identifiers are plain integers: projects are numbered
//! sequentially by the registry, grids are chosen by the grid operator.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Sequential project identifier. The first project is `1`.
pub type ProjectId = u64;

/// Operator-chosen grid identifier.
pub type GridId = u64;

/// An authenticated caller identity.
///
/// Two principals are the same party if and only if their strings are equal.
/// No normalization is applied: `"ST1ABC"` and `"st1abc"` are different
/// parties.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Wraps an already-authenticated identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty identity, which no host should ever hand us.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Principal {
    fn borrow(&self) -> &str {
        &self.0
    }
}

//! Textual type-strings
//!
//! A type-string is a `|`-separated union of type names (e.g. `"A|B"`),
//! used for lightweight type propagation without full inference.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A union-of-names type string
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeString(String);

impl TypeString {
    /// Create an empty type string
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the type string carries no type
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The raw textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The atomic type names of the union, trimmed, empty parts dropped
    pub fn atoms(&self) -> impl Iterator<Item = &str> {
        self.0.split('|').map(str::trim).filter(|s| !s.is_empty())
    }

    /// Union-merge another type string into this one, de-duplicating atoms
    ///
    /// Atom comparison is case-sensitive on the written text; first-seen
    /// order is preserved.
    pub fn merge(&self, other: &TypeString) -> TypeString {
        let mut atoms: Vec<&str> = Vec::new();
        for atom in self.atoms().chain(other.atoms()) {
            if !atoms.contains(&atom) {
                atoms.push(atom);
            }
        }
        TypeString(atoms.join("|"))
    }

    /// Union-merge a sequence of type strings
    pub fn merge_all<'a>(types: impl IntoIterator<Item = &'a TypeString>) -> TypeString {
        types
            .into_iter()
            .fold(TypeString::new(), |acc, t| acc.merge(t))
    }
}

impl fmt::Display for TypeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TypeString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

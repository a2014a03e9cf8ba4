//! Source positions and compact file locations
//!
//! Positions are zero-based line/character pairs. A `Location` refers to a
//! file by its interned URI hash rather than the URI string itself, keeping
//! index entries and symbol trees compact.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A zero-based line/character position in a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    /// Create a new position
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// A source range between two positions (inclusive at both ends)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Check whether a position falls within this range
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// A compact symbol location: interned URI hash plus range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub uri_hash: u32,
    pub range: Range,
}

impl Location {
    /// Create a new location
    pub fn new(uri_hash: u32, range: Range) -> Self {
        Self { uri_hash, range }
    }
}

/// Stable URI to integer-hash mapping
///
/// Interns document URIs and hands out dense `u32` ids. Ids are stable for
/// the lifetime of the registry and survive serialization, so a restored
/// store resolves the same hashes to the same URIs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UriRegistry {
    uris: Vec<String>,
    by_uri: HashMap<String, u32>,
}

impl UriRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a URI, returning its hash (existing hash if already interned)
    pub fn intern(&mut self, uri: &str) -> u32 {
        if let Some(&hash) = self.by_uri.get(uri) {
            return hash;
        }
        let hash = self.uris.len() as u32;
        self.uris.push(uri.to_string());
        self.by_uri.insert(uri.to_string(), hash);
        hash
    }

    /// Look up the hash for a URI without interning
    pub fn hash_of(&self, uri: &str) -> Option<u32> {
        self.by_uri.get(uri).copied()
    }

    /// Resolve a hash back to its URI
    pub fn uri_of(&self, hash: u32) -> Option<&str> {
        self.uris.get(hash as usize).map(|s| s.as_str())
    }

    /// Number of interned URIs
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

//! Case-fold-aware name index
//!
//! Multimap from case-folded name keys to lightweight symbol locations.
//! Buckets hold only (URI-hash, start position) stubs, never symbol copies;
//! resolving a stub back to a live symbol is a position search against the
//! owning table. Keys are kept sorted so prefix queries are range scans.

use crate::position::Position;
use crate::search;
use crate::symbol::{Symbol, SymbolKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// PHP namespace separator
pub const NAMESPACE_SEPARATOR: char = '\\';

/// A lightweight pointer to an indexed symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexedLocation {
    pub uri_hash: u32,
    pub start: Position,
}

impl IndexedLocation {
    /// Create a new indexed location
    pub fn new(uri_hash: u32, start: Position) -> Self {
        Self { uri_hash, start }
    }
}

/// One sorted bucket of the index
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Bucket {
    key: String,
    items: Vec<IndexedLocation>,
}

/// Sorted multimap from case-folded name keys to symbol locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameIndex {
    buckets: Vec<Bucket>,
}

impl NameIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index keys for a symbol: its case-folded name, plus every non-empty
    /// path segment for namespaces (so a namespace is discoverable by any
    /// segment)
    pub fn keys_for(symbol: &Symbol) -> Vec<String> {
        let folded = symbol.name.to_lowercase();
        if folded.is_empty() {
            return Vec::new();
        }

        let mut keys = vec![folded.clone()];
        if symbol.kind == SymbolKind::Namespace {
            for segment in folded.split(NAMESPACE_SEPARATOR) {
                if !segment.is_empty() && !keys.iter().any(|k| k == segment) {
                    keys.push(segment.to_string());
                }
            }
        }
        keys
    }

    /// Insert a location stub under every key
    pub fn add(&mut self, location: IndexedLocation, keys: &[String]) {
        for key in keys {
            let idx = search::rank(&self.buckets, |b| b.key.as_str().cmp(key.as_str()));
            match self.buckets.get_mut(idx) {
                Some(bucket) if bucket.key == *key => bucket.items.push(location),
                _ => self.buckets.insert(
                    idx,
                    Bucket {
                        key: key.clone(),
                        items: vec![location],
                    },
                ),
            }
        }
    }

    /// Remove a location stub from every key; empty buckets are dropped
    pub fn remove(&mut self, location: IndexedLocation, keys: &[String]) {
        for key in keys {
            if let Some(idx) =
                search::position(&self.buckets, |b| b.key.as_str().cmp(key.as_str()))
            {
                let bucket = &mut self.buckets[idx];
                if let Some(pos) = bucket.items.iter().position(|item| *item == location) {
                    bucket.items.remove(pos);
                }
                if bucket.items.is_empty() {
                    self.buckets.remove(idx);
                }
            }
        }
    }

    /// All locations whose key case-fold-equals the text
    pub fn find(&self, text: &str) -> Vec<IndexedLocation> {
        let folded = text.to_lowercase();
        search::find(&self.buckets, |b| b.key.as_str().cmp(folded.as_str()))
            .map(|bucket| bucket.items.clone())
            .unwrap_or_default()
    }

    /// Union of all locations whose key starts with the case-folded prefix
    ///
    /// Computed as a range query over the sorted keys, not a linear scan.
    /// An empty prefix matches nothing.
    pub fn matches(&self, prefix: &str) -> Vec<IndexedLocation> {
        let folded = prefix.to_lowercase();
        if folded.is_empty() {
            return Vec::new();
        }

        let buckets = search::range(
            &self.buckets,
            |b| b.key.as_str().cmp(folded.as_str()),
            |b| {
                if b.key.starts_with(&folded) {
                    Ordering::Less
                } else {
                    b.key.as_str().cmp(folded.as_str())
                }
            },
        );

        // A symbol indexed under several matching keys (namespace segments)
        // must appear once.
        let mut items: Vec<IndexedLocation> = Vec::new();
        for bucket in buckets {
            for item in &bucket.items {
                if !items.contains(item) {
                    items.push(*item);
                }
            }
        }
        items
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of stored location stubs across all buckets
    pub fn item_count(&self) -> usize {
        self.buckets.iter().map(|b| b.items.len()).sum()
    }
}

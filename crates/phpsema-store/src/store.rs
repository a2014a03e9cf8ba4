//! Project-wide symbol store
//!
//! Owns at most one symbol table per document URI plus a global name index
//! of lightweight location stubs. The index never duplicates symbol data:
//! a stub is resolved back to a live symbol by a position search into its
//! owning table, so an edit that rebuilds a table can never leave a cached
//! symbol diverging from it. Index entries are added and removed atomically
//! with table add/remove.

use crate::aggregate::{MergeStrategy, TypeAggregate};
use crate::error::StoreError;
use phpsema_core::{
    IndexedLocation, NameIndex, Range, Reference, Symbol, SymbolIdentity, SymbolKind,
    SymbolModifiers, SymbolTable, TypeString, UriRegistry,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A symbol location resolved back to a concrete document URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocation {
    pub uri: String,
    pub range: Range,
}

/// Registry of all symbol tables with a global name index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolStore {
    uris: UriRegistry,
    tables: HashMap<u32, SymbolTable>,
    index: NameIndex,
    symbol_count: usize,
}

impl SymbolStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a document URI, returning its stable hash
    pub fn intern_uri(&mut self, uri: &str) -> u32 {
        self.uris.intern(uri)
    }

    /// The URI registry
    pub fn uri_registry(&self) -> &UriRegistry {
        &self.uris
    }

    /// The table for a URI hash, if one is live
    pub fn table(&self, uri_hash: u32) -> Option<&SymbolTable> {
        self.tables.get(&uri_hash)
    }

    /// The table for a URI, if one is live
    pub fn table_for_uri(&self, uri: &str) -> Option<&SymbolTable> {
        self.uris.hash_of(uri).and_then(|hash| self.table(hash))
    }

    /// Number of live tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Running symbol count: the sum of per-table symbol counts
    pub fn symbol_count(&self) -> usize {
        self.symbol_count
    }

    /// Add a table, replacing any existing table for the same URI
    ///
    /// Replace semantics: an existing table is removed first, exactly as if
    /// the caller had called `remove` before `add`.
    pub fn add(&mut self, table: SymbolTable) {
        if self.tables.contains_key(&table.uri_hash()) {
            self.remove(table.uri_hash());
        }

        let mut indexed = 0usize;
        for sym in table.symbols() {
            if !is_indexable(sym) {
                continue;
            }
            let Some(loc) = sym.location else { continue };
            let keys = NameIndex::keys_for(sym);
            self.index
                .add(IndexedLocation::new(table.uri_hash(), loc.range.start), &keys);
            indexed += 1;
        }

        self.symbol_count += table.symbol_count();
        debug!(
            uri = table.uri(),
            symbols = table.symbol_count(),
            indexed,
            "symbol table added"
        );
        self.tables.insert(table.uri_hash(), table);
    }

    /// Remove the table for a URI hash, tearing down its index entries
    pub fn remove(&mut self, uri_hash: u32) -> Option<SymbolTable> {
        let table = self.tables.remove(&uri_hash)?;

        for sym in table.symbols() {
            if !is_indexable(sym) {
                continue;
            }
            let Some(loc) = sym.location else { continue };
            let keys = NameIndex::keys_for(sym);
            self.index
                .remove(IndexedLocation::new(uri_hash, loc.range.start), &keys);
        }

        self.symbol_count -= table.symbol_count();
        debug!(uri = table.uri(), "symbol table removed");
        Some(table)
    }

    /// Remove the table for a URI
    pub fn remove_uri(&mut self, uri: &str) -> Option<SymbolTable> {
        let hash = self.uris.hash_of(uri)?;
        self.remove(hash)
    }

    /// All symbols whose name matches the text exactly
    ///
    /// Case-sensitive for Constant and Variable kinds, case-insensitive for
    /// everything else, further filtered by the optional predicate.
    pub fn find(&self, text: &str, filter: Option<&dyn Fn(&Symbol) -> bool>) -> Vec<&Symbol> {
        if text.is_empty() {
            return Vec::new();
        }
        let folded = text.to_lowercase();

        let mut found = Vec::new();
        for stub in self.index.find(text) {
            let Some(table) = self.tables.get(&stub.uri_hash) else { continue };
            for sym in table.symbols_at_start(stub.start) {
                let name_matches = if sym.kind.is_case_sensitive() {
                    sym.name == text
                } else {
                    sym.name.to_lowercase() == folded
                };
                if name_matches && filter.map_or(true, |pred| pred(sym)) {
                    found.push(sym);
                }
            }
        }
        found
    }

    /// All symbols whose case-folded name starts with the prefix
    ///
    /// Always case-insensitive. Namespaces also match on any path segment.
    pub fn matches(&self, prefix: &str, filter: Option<&dyn Fn(&Symbol) -> bool>) -> Vec<&Symbol> {
        let folded = prefix.to_lowercase();
        if folded.is_empty() {
            return Vec::new();
        }

        let mut found = Vec::new();
        let mut seen: HashSet<SymbolIdentity> = HashSet::new();
        for stub in self.index.matches(prefix) {
            let Some(table) = self.tables.get(&stub.uri_hash) else { continue };
            for sym in table.symbols_at_start(stub.start) {
                if !prefix_matches(sym, &folded) {
                    continue;
                }
                if filter.map_or(true, |pred| pred(sym)) && seen.insert(sym.identity()) {
                    found.push(sym);
                }
            }
        }
        found
    }

    /// Merged member lists for every atomic class name of a type-string
    ///
    /// The scope type may be a union (`"A|B"`); one aggregate is built per
    /// atom and the union of member lists is de-duplicated by symbol
    /// identity.
    pub fn find_members(
        &self,
        scope_type: &str,
        strategy: MergeStrategy,
        pred: Option<&dyn Fn(&Symbol) -> bool>,
    ) -> Vec<&Symbol> {
        let scope_type = TypeString::from(scope_type);
        let mut found = Vec::new();
        let mut seen: HashSet<SymbolIdentity> = HashSet::new();
        for atom in scope_type.atoms() {
            let Some(aggregate) = TypeAggregate::by_name(self, atom) else { continue };
            for member in aggregate.members(strategy, pred) {
                if seen.insert(member.identity()) {
                    found.push(member);
                }
            }
        }
        found
    }

    /// The furthest ancestor's declaration of a non-private member
    ///
    /// Returns the input symbol unchanged when it is not a member, is
    /// private, has no owning scope, or no ancestor declares it.
    pub fn find_base_member<'a>(&'a self, symbol: &'a Symbol) -> &'a Symbol {
        if !symbol.kind.is_member() || symbol.is_private() || symbol.name.is_empty() {
            return symbol;
        }
        let Some(scope) = symbol.scope.as_deref() else { return symbol };

        let kind = symbol.kind;
        let name = symbol.name.clone();
        let is_static = symbol.modifiers.contains(SymbolModifiers::STATIC);
        let pred = move |s: &Symbol| {
            s.kind == kind
                && !s.is_private()
                && s.modifiers.contains(SymbolModifiers::STATIC) == is_static
                && if kind == SymbolKind::Method {
                    s.name.eq_ignore_ascii_case(&name)
                } else {
                    s.name == name
                }
        };

        self.find_members(scope, MergeStrategy::Base, Some(&pred))
            .into_iter()
            .next()
            .unwrap_or(symbol)
    }

    /// Candidate defining symbols for a use-site reference
    ///
    /// Always returns a (possibly empty) sequence.
    pub fn find_symbols_by_reference(
        &self,
        reference: &Reference,
        strategy: MergeStrategy,
    ) -> Vec<&Symbol> {
        match reference.kind {
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::Trait => {
                self.find(&reference.name, Some(&|s: &Symbol| s.kind.is_class_like()))
            }
            SymbolKind::Function | SymbolKind::Constant => {
                let kind = reference.kind;
                let pred = move |s: &Symbol| s.kind == kind;
                let found = self.find(&reference.name, Some(&pred));
                if found.is_empty() {
                    // Unqualified call fallback to the global namespace.
                    if let Some(alt) = reference.alt_name.as_deref() {
                        return self.find(alt, Some(&pred));
                    }
                }
                found
            }
            SymbolKind::Method => {
                let Some(scope) = reference.scope.as_deref() else { return Vec::new() };
                let name = reference.name.clone();
                let pred = move |s: &Symbol| {
                    s.kind == SymbolKind::Method && s.name.eq_ignore_ascii_case(&name)
                };
                self.find_members(scope, strategy, Some(&pred))
            }
            SymbolKind::Property | SymbolKind::ClassConstant => {
                let Some(scope) = reference.scope.as_deref() else { return Vec::new() };
                let kind = reference.kind;
                let name = reference.name.clone();
                let pred = move |s: &Symbol| s.kind == kind && s.name == name;
                self.find_members(scope, strategy, Some(&pred))
            }
            SymbolKind::Variable | SymbolKind::Parameter => self.find_scoped_variable(reference),
            SymbolKind::Constructor => {
                let pred =
                    |s: &Symbol| s.kind == SymbolKind::Method && s.name.eq_ignore_ascii_case("__construct");
                self.find_members(&reference.name, strategy, Some(&pred))
            }
            _ => Vec::new(),
        }
    }

    /// The type a reference evaluates to, as a textual union
    pub fn reference_to_type_string(&self, reference: &Reference) -> TypeString {
        match reference.kind {
            SymbolKind::Class
            | SymbolKind::Interface
            | SymbolKind::Trait
            | SymbolKind::Constructor => TypeString::from(reference.name.as_str()),
            SymbolKind::Function | SymbolKind::Method | SymbolKind::Property => {
                let symbols = self.find_symbols_by_reference(reference, MergeStrategy::Documented);
                TypeString::merge_all(symbols.iter().filter_map(|s| s.type_string.as_ref()))
            }
            SymbolKind::Variable => reference.type_string.clone().unwrap_or_default(),
            _ => TypeString::new(),
        }
    }

    /// Resolve a symbol's compact location to a concrete (URI, range)
    ///
    /// Returns `None` when the owning table is gone.
    pub fn symbol_location(&self, symbol: &Symbol) -> Option<DocumentLocation> {
        let loc = symbol.location?;
        if !self.tables.contains_key(&loc.uri_hash) {
            return None;
        }
        let uri = self.uris.uri_of(loc.uri_hash)?;
        Some(DocumentLocation {
            uri: uri.to_string(),
            range: loc.range,
        })
    }

    /// Serialize the whole store to an opaque state blob
    pub fn snapshot(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a store from a snapshot blob, enabling a warm start
    pub fn restore(blob: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(blob)?)
    }

    // Variables and parameters never touch the global index: find the
    // owning table by the reference's location, then search the lexical
    // scope's immediate children.
    fn find_scoped_variable(&self, reference: &Reference) -> Vec<&Symbol> {
        let Some(table) = self.tables.get(&reference.location.uri_hash) else {
            return Vec::new();
        };
        let scope = table.scope_at(reference.location.range.start);
        scope
            .children
            .iter()
            .filter(|child| {
                matches!(child.kind, SymbolKind::Variable | SymbolKind::Parameter)
                    && child.name == reference.name
            })
            .collect()
    }
}

/// Check whether a symbol qualifies for the global name index
///
/// Parameters, file sentinels, `use` import stubs, and variables stay out;
/// variables are scope-local and resolved through their table, which is
/// what makes `prune_scoped_vars` safe. A stub needs a location.
fn is_indexable(sym: &Symbol) -> bool {
    !sym.name.is_empty()
        && sym.location.is_some()
        && !matches!(
            sym.kind,
            SymbolKind::Parameter | SymbolKind::File | SymbolKind::Variable
        )
        && !sym.modifiers.contains(SymbolModifiers::USE)
}

fn prefix_matches(sym: &Symbol, folded_prefix: &str) -> bool {
    let folded = sym.name.to_lowercase();
    if folded.starts_with(folded_prefix) {
        return true;
    }
    sym.kind == SymbolKind::Namespace
        && folded
            .split(phpsema_core::NAMESPACE_SEPARATOR)
            .any(|segment| segment.starts_with(folded_prefix))
}

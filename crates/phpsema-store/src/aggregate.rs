//! Type aggregation over inheritance hierarchies
//!
//! A `TypeAggregate` is built per query from a store handle and one
//! class-like root symbol. It resolves the transitive closure of the root's
//! associated-type stubs through the store and merges inherited members
//! under a selectable strategy. The resolved closure is memoized only for
//! the aggregate's own lifetime.

use crate::error::StoreError;
use crate::store::SymbolStore;
use indexmap::map::Entry;
use indexmap::IndexMap;
use phpsema_core::{Symbol, SymbolIdentity, SymbolKind, SymbolStub};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::{HashSet, VecDeque};
use tracing::trace;

/// Policy for collapsing same-named inherited members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeStrategy {
    /// No collapsing: every child from every associate, duplicates included
    #[default]
    None,
    /// Prefer the most-derived declaration
    Override,
    /// Prefer the declaration carrying a real doc-comment
    Documented,
    /// Prefer the most-base ancestor's declaration
    Base,
}

/// Resolved view of a type's inheritance closure
#[derive(Debug)]
pub struct TypeAggregate<'s> {
    store: &'s SymbolStore,
    root: &'s Symbol,
    closure: OnceCell<Vec<&'s Symbol>>,
    closure_no_traits: OnceCell<Vec<&'s Symbol>>,
}

impl<'s> TypeAggregate<'s> {
    /// Build an aggregate directly from a class-like root symbol
    ///
    /// A non-class-like root is a precondition violation. Callers uncertain
    /// whether the type exists should use [`TypeAggregate::by_name`].
    pub fn new(store: &'s SymbolStore, root: &'s Symbol) -> Result<Self, StoreError> {
        if !root.kind.is_class_like() {
            return Err(StoreError::NotClassLike { kind: root.kind });
        }
        Ok(Self {
            store,
            root,
            closure: OnceCell::new(),
            closure_no_traits: OnceCell::new(),
        })
    }

    /// Look the root up by exact name, filtered to class-like kinds
    ///
    /// Returns `None` when no such type is indexed.
    pub fn by_name(store: &'s SymbolStore, name: &str) -> Option<Self> {
        let root = store
            .find(name, Some(&|s: &Symbol| s.kind.is_class_like()))
            .into_iter()
            .next()?;
        Self::new(store, root).ok()
    }

    /// The root symbol of this aggregate
    pub fn root(&self) -> &'s Symbol {
        self.root
    }

    /// The transitive closure of associated types, optionally filtered
    ///
    /// Breadth-first over the `associated` stubs; each stub is resolved to
    /// a real symbol through the store, and already-visited symbols (by
    /// resolved identity, not name) are skipped, so malformed mutually
    /// referential hierarchies terminate cleanly.
    pub fn associated(&self, filter: Option<&dyn Fn(&Symbol) -> bool>) -> Vec<&'s Symbol> {
        let closure = self
            .closure
            .get_or_init(|| self.resolve_closure(false));
        match filter {
            Some(pred) => closure.iter().copied().filter(|s| pred(s)).collect(),
            None => closure.clone(),
        }
    }

    /// The closure with Trait stubs dropped before resolution
    pub fn associated_excluding_traits(&self) -> Vec<&'s Symbol> {
        self.closure_no_traits
            .get_or_init(|| self.resolve_closure(true))
            .clone()
    }

    /// Check whether a class with this name is in the resolved closure
    pub fn is_base_class(&self, name: &str) -> bool {
        self.associated(None)
            .iter()
            .any(|s| s.kind == SymbolKind::Class && s.name.eq_ignore_ascii_case(name))
    }

    /// Check whether any associated type with this name is in the closure
    pub fn is_associated(&self, name: &str) -> bool {
        self.associated(None)
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Merged member list of the aggregate under a strategy
    ///
    /// Class roots merge `[self, ...non-trait associates]` with private
    /// members excluded on every associate; trait members are then appended
    /// unmerged (a placeholder until trait precedence and aliasing are
    /// resolved properly). Interface and trait roots concatenate children
    /// across `[self, ...associates]` with only the caller predicate.
    pub fn members(
        &self,
        strategy: MergeStrategy,
        pred: Option<&dyn Fn(&Symbol) -> bool>,
    ) -> Vec<&'s Symbol> {
        match self.root.kind {
            SymbolKind::Class => self.class_members(strategy, pred),
            _ => self.concatenated_members(pred),
        }
    }

    fn class_members(
        &self,
        strategy: MergeStrategy,
        pred: Option<&dyn Fn(&Symbol) -> bool>,
    ) -> Vec<&'s Symbol> {
        let chain = self.associated_excluding_traits();
        let bases = std::iter::once((self.root, true)).chain(chain.iter().map(|s| (*s, false)));

        let mut members = match strategy {
            MergeStrategy::None => {
                let mut all = Vec::new();
                for (owner, is_self) in bases {
                    for child in &owner.children {
                        if accepts(child, is_self, pred) {
                            all.push(child);
                        }
                    }
                }
                all
            }
            _ => {
                let mut map: IndexMap<String, &'s Symbol> = IndexMap::new();
                for (owner, is_self) in bases {
                    for child in &owner.children {
                        if !accepts(child, is_self, pred) {
                            continue;
                        }
                        match map.entry(child.name.clone()) {
                            Entry::Vacant(slot) => {
                                slot.insert(child);
                            }
                            Entry::Occupied(mut slot) => {
                                if should_overwrite(slot.get(), child, strategy) {
                                    slot.insert(child);
                                }
                            }
                        }
                    }
                }
                map.into_values().collect()
            }
        };

        // Trait members: unmerged second pass, caller predicate only.
        for trait_sym in self.associated(Some(&|s: &Symbol| s.kind == SymbolKind::Trait)) {
            for child in &trait_sym.children {
                if pred.map_or(true, |p| p(child)) {
                    members.push(child);
                }
            }
        }

        members
    }

    fn concatenated_members(&self, pred: Option<&dyn Fn(&Symbol) -> bool>) -> Vec<&'s Symbol> {
        let mut members = Vec::new();
        for owner in std::iter::once(self.root).chain(self.associated(None)) {
            for child in &owner.children {
                if pred.map_or(true, |p| p(child)) {
                    members.push(child);
                }
            }
        }
        members
    }

    fn resolve_closure(&self, exclude_traits: bool) -> Vec<&'s Symbol> {
        let mut resolved: Vec<&'s Symbol> = Vec::new();
        let mut visited: HashSet<SymbolIdentity> = HashSet::new();
        visited.insert(self.root.identity());

        let mut queue: VecDeque<&SymbolStub> = self
            .root
            .associated
            .iter()
            .filter(|stub| !(exclude_traits && stub.kind == SymbolKind::Trait))
            .collect();

        while let Some(stub) = queue.pop_front() {
            let found = self
                .store
                .find(&stub.name, Some(&|s: &Symbol| s.kind == stub.kind));
            let Some(sym) = found.into_iter().next() else {
                trace!(name = %stub.name, kind = ?stub.kind, "unresolved associated stub");
                continue;
            };
            if !visited.insert(sym.identity()) {
                continue;
            }
            resolved.push(sym);
            for next in &sym.associated {
                if !(exclude_traits && next.kind == SymbolKind::Trait) {
                    queue.push_back(next);
                }
            }
        }

        resolved
    }
}

fn accepts(child: &Symbol, is_self: bool, pred: Option<&dyn Fn(&Symbol) -> bool>) -> bool {
    // Private members are never inherited.
    if !is_self && child.is_private() {
        return false;
    }
    pred.map_or(true, |p| p(child))
}

fn should_overwrite(existing: &Symbol, later: &Symbol, strategy: MergeStrategy) -> bool {
    // A real member always wins over a synthetic doc-tag one.
    if existing.is_magic() && !later.is_magic() {
        return true;
    }
    match strategy {
        MergeStrategy::Base => true,
        MergeStrategy::Documented => lacks_real_doc(existing) && has_doc(later),
        _ => false,
    }
}

fn has_doc(symbol: &Symbol) -> bool {
    symbol
        .doc_comment
        .as_deref()
        .map_or(false, |doc| !doc.trim().is_empty())
}

fn lacks_real_doc(symbol: &Symbol) -> bool {
    match symbol.doc_comment.as_deref() {
        None => true,
        Some(doc) => {
            let folded = doc.trim().to_lowercase();
            folded.is_empty() || folded == "@inheritdoc" || folded == "{@inheritdoc}"
        }
    }
}

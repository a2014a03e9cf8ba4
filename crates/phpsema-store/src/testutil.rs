//! Shared helpers for store and aggregate tests

use crate::store::SymbolStore;
use phpsema_core::{Location, Position, Range, Symbol, SymbolKind, SymbolTable};

pub(crate) fn class_like(kind: SymbolKind, name: &str) -> Symbol {
    Symbol::new(kind, name)
}

pub(crate) fn member(kind: SymbolKind, name: &str, scope: &str) -> Symbol {
    Symbol::new(kind, name).with_scope(scope)
}

/// Wrap declarations in a file root, assign distinct locations, and add the
/// resulting table to the store. Returns the interned URI hash.
///
/// Every symbol without an explicit location gets its own line, so index
/// stubs resolve unambiguously.
pub(crate) fn add_document(store: &mut SymbolStore, uri: &str, decls: Vec<Symbol>) -> u32 {
    let hash = store.intern_uri(uri);
    let mut root = Symbol::file_root().with_location(Location::new(
        hash,
        Range::new(Position::new(0, 0), Position::new(u32::MAX, 0)),
    ));
    root.children = decls;

    let mut line = 1;
    for child in &mut root.children {
        assign_locations(child, hash, &mut line);
    }

    store.add(SymbolTable::new(uri, hash, root));
    hash
}

fn assign_locations(sym: &mut Symbol, hash: u32, line: &mut u32) {
    if sym.location.is_none() {
        sym.location = Some(Location::new(
            hash,
            Range::new(Position::new(*line, 0), Position::new(*line, 120)),
        ));
    }
    *line += 1;
    for child in &mut sym.children {
        assign_locations(child, hash, line);
    }
}

//! Per-document symbol table
//!
//! Wraps the symbol tree the external extraction pass produced for one
//! document and answers position, scope, and name-resolution queries over
//! it. Tables are never diffed: an edit rebuilds the whole table and the
//! store swaps it in wholesale.
//!
//! Input contract: children are in source order, and a class-like symbol's
//! `associated` list holds one stub per extends/implements/use clause. A
//! `use` import statement appears as a node with the `USE` modifier whose
//! `name` is the alias visible in the file and whose first `associated`
//! stub carries the fully qualified name.

use crate::position::Position;
use crate::symbol::{Symbol, SymbolIdentity, SymbolKind, SymbolModifiers};
use serde::{Deserialize, Serialize};

/// Kinds that open a lexical scope
const SCOPE_KINDS: [SymbolKind; 6] = [
    SymbolKind::Class,
    SymbolKind::Interface,
    SymbolKind::Trait,
    SymbolKind::Function,
    SymbolKind::Method,
    SymbolKind::File,
];

/// Symbol tree and queries for a single document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolTable {
    uri: String,
    uri_hash: u32,
    root: Symbol,
}

impl SymbolTable {
    /// Create a table from an extracted symbol tree
    pub fn new(uri: impl Into<String>, uri_hash: u32, root: Symbol) -> Self {
        Self {
            uri: uri.into(),
            uri_hash,
            root,
        }
    }

    /// Document URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Interned URI hash
    pub fn uri_hash(&self) -> u32 {
        self.uri_hash
    }

    /// The root symbol (File sentinel)
    pub fn root(&self) -> &Symbol {
        &self.root
    }

    /// Pre-order walk over every node, root included
    pub fn traverse<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Symbol),
    {
        fn walk<'a, F: FnMut(&'a Symbol)>(node: &'a Symbol, visit: &mut F) {
            visit(node);
            for child in &node.children {
                walk(child, visit);
            }
        }
        walk(&self.root, visit);
    }

    /// Collect every node matching the predicate, in pre-order
    pub fn filter<F>(&self, pred: F) -> Vec<&Symbol>
    where
        F: Fn(&Symbol) -> bool,
    {
        let mut matched = Vec::new();
        self.traverse(&mut |sym| {
            if pred(sym) {
                matched.push(sym);
            }
        });
        matched
    }

    /// First node matching the predicate, in pre-order
    pub fn find<F>(&self, pred: F) -> Option<&Symbol>
    where
        F: Fn(&Symbol) -> bool,
    {
        fn walk<'a, F: Fn(&Symbol) -> bool>(node: &'a Symbol, pred: &F) -> Option<&'a Symbol> {
            if pred(node) {
                return Some(node);
            }
            node.children.iter().find_map(|child| walk(child, pred))
        }
        walk(&self.root, &pred)
    }

    /// Every symbol in the document, root excluded
    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut all = Vec::new();
        self.traverse(&mut |sym| all.push(sym));
        all.remove(0);
        all
    }

    /// Number of symbols, root excluded
    pub fn symbol_count(&self) -> usize {
        self.root.subtree_len() - 1
    }

    /// Innermost enclosing scope node at a position
    ///
    /// Considers only scope-opening kinds (class-likes, functions, methods,
    /// the file root). Falls back to the root when nothing else encloses
    /// the position.
    pub fn scope_at(&self, pos: Position) -> &Symbol {
        self.scope_symbol(pos, |_| true)
    }

    /// Innermost enclosing scope node, skipping anonymous-function scopes
    ///
    /// Finds the scope that truly owns `$this`, ignoring intervening
    /// closures.
    pub fn absolute_scope_at(&self, pos: Position) -> &Symbol {
        self.scope_symbol(pos, |sym| {
            !(sym.kind == SymbolKind::Function
                && sym.modifiers.contains(SymbolModifiers::ANONYMOUS))
        })
    }

    fn scope_symbol<F>(&self, pos: Position, accept: F) -> &Symbol
    where
        F: Fn(&Symbol) -> bool,
    {
        let mut scope = &self.root;
        self.traverse(&mut |sym| {
            if SCOPE_KINDS.contains(&sym.kind)
                && sym
                    .location
                    .map_or(false, |loc| loc.range.contains(pos))
                && accept(sym)
            {
                // Pre-order: a later match is an inner scope.
                scope = sym;
            }
        });
        scope
    }

    /// Replay namespace, class-entry, and import nodes up to a position
    ///
    /// A stable simulation of "what imports are in effect here": nodes are
    /// consumed in source order and the replay halts at the first node that
    /// starts after the position.
    pub fn name_resolver_at(&self, pos: Position) -> NameResolver {
        let mut resolver = NameResolver::default();
        let mut halted = false;

        self.traverse(&mut |sym| {
            if halted {
                return;
            }
            let start = match sym.location {
                Some(loc) => loc.range.start,
                None => return,
            };
            if start > pos {
                halted = true;
                return;
            }

            if sym.modifiers.contains(SymbolModifiers::USE) {
                if let Some(stub) = sym.associated.first() {
                    resolver.rules.push(ImportRule {
                        kind: sym.kind,
                        alias: sym.name.clone(),
                        full_name: stub.name.clone(),
                    });
                }
            } else if sym.kind == SymbolKind::Namespace {
                resolver.namespace = Some(sym.name.clone());
            } else if sym.kind.is_class_like() {
                resolver.class = Some(sym.name.clone());
            }
        });

        resolver
    }

    /// Last (innermost) symbol whose range starts exactly at the position
    pub fn symbol_at_position(&self, pos: Position) -> Option<&Symbol> {
        self.symbols_at_start(pos).last().copied()
    }

    /// All symbols whose range starts exactly at the position
    ///
    /// Index stubs carry only a start position; this is the re-resolution
    /// path from a stub back to live symbols.
    pub fn symbols_at_start(&self, pos: Position) -> Vec<&Symbol> {
        self.filter(|sym| {
            sym.location
                .map_or(false, |loc| loc.range.start == pos)
        })
    }

    /// Check whether a symbol with this identity lives in the table
    pub fn contains(&self, identity: &SymbolIdentity) -> bool {
        self.find(|sym| sym.identity() == *identity).is_some()
    }

    /// Strip Variable children from every Function and Method node
    ///
    /// Applied when a document is closed but its externally visible
    /// declarations must remain indexable. Variables carrying a location
    /// are never indexed, so the name index stays consistent.
    pub fn prune_scoped_vars(&mut self) {
        fn walk(node: &mut Symbol) {
            if matches!(node.kind, SymbolKind::Function | SymbolKind::Method) {
                node.children.retain(|c| c.kind != SymbolKind::Variable);
            }
            for child in &mut node.children {
                walk(child);
            }
        }
        walk(&mut self.root);
    }
}

/// Namespace, class, and import state in effect at a position
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    /// Active namespace name
    pub namespace: Option<String>,
    /// Innermost class-like declaration entered so far
    pub class: Option<String>,
    /// Import rules in source order
    pub rules: Vec<ImportRule>,
}

/// One `use` import in effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRule {
    /// Kind of the imported entity (Class, Function, or Constant)
    pub kind: SymbolKind,
    /// Alias visible in the file
    pub alias: String,
    /// Fully qualified name
    pub full_name: String,
}

impl NameResolver {
    /// Resolve a possibly relative name to a fully qualified one
    ///
    /// Leading `\` means already fully qualified. Otherwise the first path
    /// segment is matched against import aliases (case-insensitively,
    /// except for constants), falling back to prefixing the active
    /// namespace.
    pub fn resolve_relative(&self, name: &str, kind: SymbolKind) -> String {
        if let Some(stripped) = name.strip_prefix('\\') {
            return stripped.to_string();
        }

        let first_part = name.split('\\').next().unwrap_or(name);
        for rule in &self.rules {
            if rule.kind != kind {
                continue;
            }
            let matched = if kind.is_case_sensitive() {
                rule.alias == first_part
            } else {
                rule.alias.eq_ignore_ascii_case(first_part)
            };
            if matched {
                if name.len() > first_part.len() {
                    return format!("{}{}", rule.full_name, &name[first_part.len()..]);
                }
                return rule.full_name.clone();
            }
        }

        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, name),
            None => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Location, Range};
    use crate::symbol::SymbolStub;

    fn loc(line_start: u32, line_end: u32) -> Location {
        Location::new(
            0,
            Range::new(Position::new(line_start, 0), Position::new(line_end, 0)),
        )
    }

    fn sample_table() -> SymbolTable {
        // file
        //   namespace App        (1..1)
        //   use Vendor\Helper    (2..2, alias "Helper")
        //   class Foo            (4..12)
        //     method bar         (5..8)
        //       $x               (6..6)
        //       closure          (7..7, anonymous fn)
        //     property $baz      (10..10)
        //   function qux         (14..16)
        //     $y                 (15..15)
        let closure = Symbol::new(SymbolKind::Function, "")
            .with_modifiers(SymbolModifiers::ANONYMOUS)
            .with_location(loc(7, 7));
        let bar = Symbol::new(SymbolKind::Method, "bar")
            .with_scope("App\\Foo")
            .with_location(loc(5, 8))
            .with_child(
                Symbol::new(SymbolKind::Variable, "$x").with_location(loc(6, 6)),
            )
            .with_child(closure);
        let foo = Symbol::new(SymbolKind::Class, "App\\Foo")
            .with_location(loc(4, 12))
            .with_child(bar)
            .with_child(
                Symbol::new(SymbolKind::Property, "$baz")
                    .with_scope("App\\Foo")
                    .with_location(loc(10, 10)),
            );
        let qux = Symbol::new(SymbolKind::Function, "App\\qux")
            .with_location(loc(14, 16))
            .with_child(
                Symbol::new(SymbolKind::Variable, "$y").with_location(loc(15, 15)),
            );

        let root = Symbol::file_root()
            .with_location(loc(0, 20))
            .with_child(
                Symbol::new(SymbolKind::Namespace, "App").with_location(loc(1, 1)),
            )
            .with_child(
                Symbol::new(SymbolKind::Class, "Helper")
                    .with_modifiers(SymbolModifiers::USE)
                    .with_associated(SymbolStub::new(SymbolKind::Class, "Vendor\\Helper"))
                    .with_location(loc(2, 2)),
            )
            .with_child(foo)
            .with_child(qux);

        SymbolTable::new("file:///sample.php", 0, root)
    }

    #[test]
    fn test_symbol_count_excludes_root() {
        let table = sample_table();
        assert_eq!(table.symbol_count(), table.symbols().len());
        assert_eq!(table.symbol_count(), 9);
    }

    #[test]
    fn test_filter_and_find() {
        let table = sample_table();
        let methods = table.filter(|s| s.kind == SymbolKind::Method);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "bar");

        let first_var = table.find(|s| s.kind == SymbolKind::Variable).unwrap();
        assert_eq!(first_var.name, "$x");
    }

    #[test]
    fn test_scope_at_innermost() {
        let table = sample_table();
        assert_eq!(table.scope_at(Position::new(6, 2)).name, "bar");
        assert_eq!(table.scope_at(Position::new(10, 2)).name, "App\\Foo");
        assert_eq!(table.scope_at(Position::new(15, 0)).name, "App\\qux");
        // Outside everything: file root
        assert_eq!(table.scope_at(Position::new(18, 0)).kind, SymbolKind::File);
    }

    #[test]
    fn test_absolute_scope_skips_closures() {
        let table = sample_table();
        let pos = Position::new(7, 0);
        assert!(table
            .scope_at(pos)
            .modifiers
            .contains(SymbolModifiers::ANONYMOUS));
        assert_eq!(table.absolute_scope_at(pos).name, "bar");
    }

    #[test]
    fn test_name_resolver_replay() {
        let table = sample_table();
        let resolver = table.name_resolver_at(Position::new(6, 0));
        assert_eq!(resolver.namespace.as_deref(), Some("App"));
        assert_eq!(resolver.class.as_deref(), Some("App\\Foo"));
        assert_eq!(resolver.rules.len(), 1);

        assert_eq!(
            resolver.resolve_relative("helper", SymbolKind::Class),
            "Vendor\\Helper"
        );
        assert_eq!(
            resolver.resolve_relative("Helper\\Sub", SymbolKind::Class),
            "Vendor\\Helper\\Sub"
        );
        assert_eq!(resolver.resolve_relative("Bar", SymbolKind::Class), "App\\Bar");
        assert_eq!(
            resolver.resolve_relative("\\DateTime", SymbolKind::Class),
            "DateTime"
        );
    }

    #[test]
    fn test_name_resolver_halts_at_position() {
        let table = sample_table();
        // Before the use statement takes effect
        let resolver = table.name_resolver_at(Position::new(1, 5));
        assert!(resolver.rules.is_empty());
        assert_eq!(resolver.namespace.as_deref(), Some("App"));
        assert!(resolver.class.is_none());
    }

    #[test]
    fn test_symbol_at_position_exact_start() {
        let table = sample_table();
        let sym = table.symbol_at_position(Position::new(5, 0)).unwrap();
        assert_eq!(sym.name, "bar");
        assert!(table.symbol_at_position(Position::new(5, 1)).is_none());
    }

    #[test]
    fn test_prune_scoped_vars() {
        let mut table = sample_table();
        let before = table.symbol_count();
        table.prune_scoped_vars();
        assert_eq!(table.symbol_count(), before - 2);
        assert!(table.find(|s| s.kind == SymbolKind::Variable).is_none());
        // Declarations remain
        assert!(table.find(|s| s.name == "bar").is_some());
        assert!(table.find(|s| s.name == "App\\qux").is_some());
    }
}

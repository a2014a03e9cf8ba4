//! Symbol model for PHP declarations
//!
//! A `Symbol` is one node of a per-document declaration tree produced by the
//! external extraction pass. Children are exclusively owned by their parent
//! (a strict tree); relationships to base classes, implemented interfaces,
//! and used traits are recorded as weak `SymbolStub` entries resolved by
//! name at query time, which keeps cyclic hierarchies from becoming
//! ownership cycles.

use crate::position::Location;
use crate::typestring::TypeString;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Kind of declared or referenced program entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    #[default]
    None,
    File,
    Namespace,
    Class,
    Interface,
    Trait,
    Constant,
    Function,
    Method,
    Property,
    ClassConstant,
    Variable,
    Parameter,
    Constructor,
}

impl SymbolKind {
    /// Check if this kind is a class-like type (class, interface, trait)
    pub fn is_class_like(self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Interface | SymbolKind::Trait)
    }

    /// Check if this kind is a class member
    pub fn is_member(self) -> bool {
        matches!(
            self,
            SymbolKind::Method | SymbolKind::Property | SymbolKind::ClassConstant
        )
    }

    /// Check if names of this kind compare case-sensitively in PHP
    ///
    /// Constants and variables are case-sensitive; classes, functions and
    /// methods are not.
    pub fn is_case_sensitive(self) -> bool {
        matches!(self, SymbolKind::Constant | SymbolKind::Variable)
    }
}

bitflags! {
    /// Modifier bit-set for a symbol
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SymbolModifiers: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const ABSTRACT = 1 << 4;
        const FINAL = 1 << 5;
        const READONLY = 1 << 6;
        /// Anonymous class or closure
        const ANONYMOUS = 1 << 7;
        /// Synthetic member from `@method`/`@property` doc tags
        const MAGIC = 1 << 8;
        /// A `use` import statement node, not a declaration
        const USE = 1 << 9;
    }
}

/// Weak reference to an associated type: identity by kind and name only
///
/// One stub is recorded per extends/implements/use clause. Stubs are
/// resolved through the symbol store at query time and never hold a link to
/// the resolved node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolStub {
    pub kind: SymbolKind,
    pub name: String,
}

impl SymbolStub {
    /// Create a new stub
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        Self { kind, name: name.into() }
    }
}

/// Value identity of a resolved symbol
///
/// Distinguishes same-named symbols from different files and is stable
/// across borrows, unlike pointer identity. Used for closure cycle
/// detection and member de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolIdentity {
    pub kind: SymbolKind,
    pub name: String,
    pub location: Option<Location>,
}

/// One node of a document's symbol tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Kind of entity
    pub kind: SymbolKind,
    /// Qualified name (empty only for unindexed sentinels)
    pub name: String,
    /// Modifier bit-set
    pub modifiers: SymbolModifiers,
    /// Owning type name, for members
    pub scope: Option<String>,
    /// Declared or documented type
    pub type_string: Option<TypeString>,
    /// Doc comment text, if any
    pub doc_comment: Option<String>,
    /// Weak references to base/implemented/used types
    pub associated: Vec<SymbolStub>,
    /// Child symbols in source order
    pub children: Vec<Symbol>,
    /// Location of the declaration
    pub location: Option<Location>,
}

impl Symbol {
    /// Create a new symbol with minimal information
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            modifiers: SymbolModifiers::empty(),
            scope: None,
            type_string: None,
            doc_comment: None,
            associated: Vec::new(),
            children: Vec::new(),
            location: None,
        }
    }

    /// Create the File sentinel root for a document
    pub fn file_root() -> Self {
        Self::new(SymbolKind::File, "")
    }

    /// Set modifiers
    pub fn with_modifiers(mut self, modifiers: SymbolModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the owning type name
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the type string
    pub fn with_type(mut self, type_string: impl Into<TypeString>) -> Self {
        self.type_string = Some(type_string.into());
        self
    }

    /// Set the doc comment
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    /// Add an associated-type stub
    pub fn with_associated(mut self, stub: SymbolStub) -> Self {
        self.associated.push(stub);
        self
    }

    /// Add a child symbol
    pub fn with_child(mut self, child: Symbol) -> Self {
        self.children.push(child);
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Value identity of this symbol
    pub fn identity(&self) -> SymbolIdentity {
        SymbolIdentity {
            kind: self.kind,
            name: self.name.clone(),
            location: self.location,
        }
    }

    /// Check if the symbol carries a visibility or synthetic modifier
    pub fn is_private(&self) -> bool {
        self.modifiers.contains(SymbolModifiers::PRIVATE)
    }

    /// Check if the symbol is a doc-tag synthesized member
    pub fn is_magic(&self) -> bool {
        self.modifiers.contains(SymbolModifiers::MAGIC)
    }

    /// Count all nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Symbol::subtree_len).sum::<usize>()
    }
}

/// A use-site reference to be resolved against the store
///
/// Produced by an external reference-discovery pass; consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Kind of entity referenced
    pub kind: SymbolKind,
    /// Resolved (fully qualified) name at the use site
    pub name: String,
    /// Global fallback name for unqualified function/constant references
    pub alt_name: Option<String>,
    /// Owning type name for member references
    pub scope: Option<String>,
    /// Type carried by the reference itself (variables)
    pub type_string: Option<TypeString>,
    /// Use-site location
    pub location: Location,
}

impl Reference {
    /// Create a new reference
    pub fn new(kind: SymbolKind, name: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            name: name.into(),
            alt_name: None,
            scope: None,
            type_string: None,
            location,
        }
    }

    /// Set the global fallback name
    pub fn with_alt_name(mut self, alt_name: impl Into<String>) -> Self {
        self.alt_name = Some(alt_name.into());
        self
    }

    /// Set the owning type name
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the carried type
    pub fn with_type(mut self, type_string: impl Into<TypeString>) -> Self {
        self.type_string = Some(type_string.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Position, Range};

    fn loc(uri_hash: u32, line: u32) -> Location {
        Location::new(uri_hash, Range::new(Position::new(line, 0), Position::new(line, 10)))
    }

    #[test]
    fn test_kind_predicates() {
        assert!(SymbolKind::Class.is_class_like());
        assert!(SymbolKind::Trait.is_class_like());
        assert!(!SymbolKind::Function.is_class_like());
        assert!(SymbolKind::Property.is_member());
        assert!(SymbolKind::Constant.is_case_sensitive());
        assert!(!SymbolKind::Method.is_case_sensitive());
    }

    #[test]
    fn test_symbol_builder() {
        let sym = Symbol::new(SymbolKind::Method, "getName")
            .with_scope("App\\User")
            .with_type("string")
            .with_modifiers(SymbolModifiers::PUBLIC | SymbolModifiers::FINAL)
            .with_location(loc(0, 3));

        assert_eq!(sym.scope.as_deref(), Some("App\\User"));
        assert!(sym.modifiers.contains(SymbolModifiers::FINAL));
        assert!(!sym.is_private());
    }

    #[test]
    fn test_subtree_len() {
        let class = Symbol::new(SymbolKind::Class, "Foo")
            .with_child(Symbol::new(SymbolKind::Method, "a"))
            .with_child(
                Symbol::new(SymbolKind::Method, "b")
                    .with_child(Symbol::new(SymbolKind::Variable, "$x")),
            );
        assert_eq!(class.subtree_len(), 4);
    }

    #[test]
    fn test_identity_distinguishes_files() {
        let a = Symbol::new(SymbolKind::Class, "Foo").with_location(loc(0, 1));
        let b = Symbol::new(SymbolKind::Class, "Foo").with_location(loc(1, 1));
        assert_ne!(a.identity(), b.identity());
        assert_eq!(a.identity(), a.clone().identity());
    }
}

//! phpsema-core: symbol model and per-document indexing for PHP
//!
//! This crate provides the leaf layer of the phpsema semantic core:
//!
//! - Positions, ranges, and compact URI-hashed locations
//! - The `Symbol` tree model with kinds, modifier bit-sets, and weak
//!   associated-type stubs
//! - Textual type-strings (`A|B` unions) with de-duplicating merge
//! - Binary search primitives and the case-fold-aware `NameIndex`
//! - The per-document `SymbolTable` with position, scope, and
//!   name-resolution queries
//!
//! Parsing and symbol extraction are external: the table consumes an
//! already-built symbol tree whose children are in source order.

pub mod name_index;
pub mod position;
pub mod search;
pub mod symbol;
pub mod table;
pub mod typestring;

pub use name_index::{IndexedLocation, NameIndex, NAMESPACE_SEPARATOR};
pub use position::{Location, Position, Range, UriRegistry};
pub use symbol::{Reference, Symbol, SymbolIdentity, SymbolKind, SymbolModifiers, SymbolStub};
pub use table::{ImportRule, NameResolver, SymbolTable};
pub use typestring::TypeString;

//! phpsema-store: project-wide symbol store and type aggregation
//!
//! Builds on `phpsema-core` to answer whole-project questions: exact and
//! prefix name lookup across every document, inheritance-aware member
//! lists, base-declaration search, and resolution of use-site references
//! to their defining symbols.
//!
//! Typical flow: intern a URI, add the extracted table, then query.
//!
//! ```
//! use phpsema_core::{Location, Position, Range, Symbol, SymbolKind, SymbolTable};
//! use phpsema_store::{MergeStrategy, SymbolStore};
//!
//! let mut store = SymbolStore::new();
//! let hash = store.intern_uri("file:///src/User.php");
//! let class = Symbol::new(SymbolKind::Class, "App\\User").with_location(Location::new(
//!     hash,
//!     Range::new(Position::new(2, 0), Position::new(10, 1)),
//! ));
//! let root = Symbol::file_root().with_child(class);
//! store.add(SymbolTable::new("file:///src/User.php", hash, root));
//!
//! let classes = store.find("app\\user", Some(&|s: &Symbol| s.kind == SymbolKind::Class));
//! assert_eq!(classes.len(), 1);
//! let members = store.find_members("App\\User", MergeStrategy::Override, None);
//! assert!(members.is_empty());
//! ```

pub mod aggregate;
pub mod error;
pub mod store;

#[cfg(test)]
mod testutil;

pub use aggregate::{MergeStrategy, TypeAggregate};
pub use error::StoreError;
pub use store::{DocumentLocation, SymbolStore};

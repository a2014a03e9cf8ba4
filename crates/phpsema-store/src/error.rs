//! Error types for the symbol store

use phpsema_core::SymbolKind;

/// Errors that can occur in store and aggregate operations
///
/// Lookups that can routinely miss return empty results instead of raising;
/// these errors cover precondition violations and persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("expected a class-like symbol, got {kind:?}")]
    NotClassLike { kind: SymbolKind },

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

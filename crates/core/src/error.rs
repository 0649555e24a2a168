//! Catalog error model.

use thiserror::Error;

/// Result type used across the catalog crates.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog-level error.
///
/// Validation, reference and cycle checks run before any write is issued;
/// a `Persistence` error means the underlying store call itself failed and
/// prior steps of a multi-step operation may have taken effect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A value failed validation (e.g. empty name, negative price).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A foreign key is dangling or crosses a store boundary.
    #[error("invalid reference: {0}")]
    Reference(String),

    /// A raw-material chain is self-referential or circular.
    #[error("raw-material cycle: {0}")]
    Cycle(String),

    /// A deletion is blocked by dependent records.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The underlying store call failed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// A requested record was not found.
    #[error("not found")]
    NotFound,
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    pub fn cycle(msg: impl Into<String>) -> Self {
        Self::Cycle(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

//! Error types for query composition and execution.

use thiserror::Error;

/// Errors raised while composing a query tree into text and bind parameters.
///
/// Every variant is fatal to the build attempt that raised it; no partial
/// query text is ever returned alongside an error.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// A string destined for unescaped placement in query text failed the
    /// identifier pattern
    #[error("Unsafe identifier: {0:?}")]
    UnsafeIdentifier(String),

    /// A child field name collides with the row alias or another child
    #[error("Duplicate field name: {0}")]
    DuplicateFieldName(String),

    /// An alias is bound twice in one query: a child reuses an ancestor's
    /// alias, or a generated variable name equals a caller-chosen alias
    #[error("Alias {0} is already bound in this query")]
    ShadowedAlias(String),

    /// The base node was prepared without a concrete selector
    #[error("Selector not implemented for the base query node")]
    NotImplemented,

    /// A starting vertex is not in `collection/key` form
    #[error("Invalid vertex reference: {0:?}")]
    InvalidVertexReference(String),

    /// A traversal has no explicit start, no root selector, and no parent
    #[error("Traversal has no starting vertex")]
    MissingStartingVertex,

    /// A traversal was given no edge collections
    #[error("Traversal requires at least one edge collection")]
    MissingEdgeCollection,

    /// Traversal depth must be at least one hop
    #[error("Invalid traversal depth: {0}")]
    InvalidDepth(u32),

    /// A filter operator outside the supported comparison set
    #[error("Unsupported filter operator: {0:?}")]
    UnsupportedOperator(String),

    /// A filter value that is not a scalar or an array of scalars
    #[error("Invalid filter value at {path}: expected scalar or array of scalars")]
    InvalidFilterValue { path: String },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(#[from] arbor_config::ConfigError),

    /// The execution collaborator failed
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// A result row could not be decoded into the requested type
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors reported by a [`QueryExecutor`](crate::execute::QueryExecutor)
/// implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The driver rejected the query or could not reach the database
    #[error("Driver error: {0}")]
    Driver(String),

    /// Reading the next batch from a cursor failed
    #[error("Cursor error: {0}")]
    Cursor(String),
}

/// Result type for composition operations
pub type ComposeResult<T> = Result<T, ComposeError>;

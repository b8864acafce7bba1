//! Error types for docbase operations.

use thiserror::Error;

/// Result alias used across the docbase crates.
pub type Result<T> = std::result::Result<T, DocbaseError>;

/// Top-level error for store, backend, and serialization failures.
#[derive(Debug, Error)]
pub enum DocbaseError {
    /// A typed-content boundary rejected the input.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// An operation needed a credential that was never configured.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// A backend answered with a non-success HTTP status.
    #[error("backend HTTP {status}: {body}")]
    BackendStatus { status: u16, body: String },

    /// Transport-level backend failure (connect, timeout, TLS).
    #[error("backend error: {0}")]
    Backend(String),

    /// A backend answered 200 but the body was not usable.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// The store file could not be written.
    #[error("store error: {0}")]
    Store(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors raised when parsing user input into typed document content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The document type string is outside the known set.
    #[error("unknown document type: {0}")]
    UnknownType(String),

    /// A content field name does not belong to the document type.
    #[error("unknown field '{field}' for document type '{doc_type}'")]
    UnknownField { doc_type: String, field: String },

    /// Content must be a JSON object.
    #[error("content must be a JSON object, got {0}")]
    NotAnObject(String),

    /// A content patch targeted a different document type.
    #[error("content variant mismatch: expected {expected}, got {actual}")]
    VariantMismatch { expected: String, actual: String },

    /// A block kind outside the supported set.
    #[error("unsupported content type: {0}")]
    UnsupportedBlock(String),
}

//! Error taxonomy for the translation engine.
//!
//! Only structural failures surface as `Err` values: a document missing a
//! required top-level section aborts the whole call with no partial result.
//! Malformed individual entries and unmappable types are logged and skipped
//! by the components that encounter them.

/// Errors that can occur during schema translation.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Top-level document is missing a required section (fatal to the call)
    #[error("document missing required section: {0}")]
    MissingSection(&'static str),

    /// Top-level document has the wrong shape (fatal to the call)
    #[error("malformed document structure: {0}")]
    Structure(String),

    /// Wire type signature text could not be parsed
    #[error("invalid type signature: {0}")]
    Signature(String),

    /// An encoded identifier is outside the codec's domain
    #[error("invalid identifier: {0}")]
    Identifier(String),

    /// Binary document encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

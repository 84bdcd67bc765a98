//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, WeftError>`. Structural errors (a record
//! referencing an id that was never registered, a document without scenes)
//! are fatal for the load that raised them; transport and per-record
//! failures are local and are reported through the session's failure list
//! without aborting the rest of the pipeline.

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum WeftError {
    // ========================================================================
    // Document & Reference Errors
    // ========================================================================
    /// An id referenced by another record was never registered.
    #[error("no entry registered for id `{0}`")]
    MissingEntry(String),

    /// A registered entry resolved to a different record kind than the
    /// reference expected.
    #[error("entry `{id}` is not a {expected} record")]
    WrongKind {
        /// The entry id that was looked up
        id: String,
        /// The record kind the caller expected
        expected: &'static str,
    },

    /// The description document is structurally unusable.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A scene record carried no root nodes.
    #[error("scene `{0}` has no root nodes")]
    EmptyScene(String),

    /// A mesh record carried no usable primitives.
    #[error("mesh `{0}` has no primitives")]
    MissingPrimitives(String),

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// A byte-range fetch came back with a non-success status.
    #[error("transport error: status {status} for `{id}`")]
    TransportStatus {
        /// HTTP-style status code (0 for non-HTTP transport failures)
        status: u16,
        /// The logical resource id the fetch was issued for
        id: String,
    },

    // ========================================================================
    // Data Conversion Errors
    // ========================================================================
    /// A fetched payload was too short for the typed view requested of it.
    #[error("byte payload for `{id}` is {actual} bytes, expected at least {expected}")]
    ShortPayload {
        /// The logical resource id
        id: String,
        /// Bytes required by the converter
        expected: usize,
        /// Bytes actually delivered
        actual: usize,
    },

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// An animation channel description failed validation.
    #[error("animation channel: {0}")]
    InvalidChannel(String),

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// The transport ran dry before the scene finished resolving.
    #[error("load stalled with {pending_meshes} mesh(es) still pending")]
    LoadStalled {
        /// Meshes that never reached their completion gate
        pending_meshes: usize,
    },

    // ========================================================================
    // Wrapped I/O & Parsing Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, WeftError>`.
pub type Result<T> = std::result::Result<T, WeftError>;

//! Error types for blog-writer
//!
//! This module provides the error handling surface for the library:
//! - One [`Error`] enum covering storage, pipeline, and commit failures
//! - A [`Result`] alias used throughout the crate
//! - Context information (paths, attempt counts, underlying causes)
//!
//! "Record not found" is deliberately not an error: lookup operations
//! return `Option`/`bool` so callers can treat a missing record as an
//! ordinary, non-fatal result.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for blog-writer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for blog-writer
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "root_dir")
        key: Option<String>,
    },

    /// Storage root could not be created or is not writable; fatal
    #[error("storage root {path} is not usable: {source}")]
    StorageInit {
        /// The storage root that could not be initialized
        path: PathBuf,
        /// The underlying I/O failure
        source: std::io::Error,
    },

    /// Underlying generation pipeline failed for this attempt
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Pipeline completed without leaving a discoverable output artifact
    ///
    /// Raised when neither the final-stage nor the draft-stage artifact
    /// exists after an invocation, or when the discovered artifact is empty.
    /// Guards against silent non-production by the pipeline.
    #[error("pipeline produced no output artifact")]
    NoArtifact,

    /// Output-file write or storage commit failed after a successful pipeline run
    ///
    /// The attempt is treated as failed and retried; it is never reported
    /// as a success-with-warning.
    #[error("failed to commit generated content to {path}: {reason}")]
    PartialWrite {
        /// The destination that could not be written
        path: PathBuf,
        /// Why the write failed
        reason: String,
    },

    /// All generation attempts failed; wraps the last underlying error
    #[error("all {attempts} generation attempts failed; last error: {last}")]
    ExhaustedRetries {
        /// How many attempts were made before giving up
        attempts: u32,
        /// The failure from the final attempt
        #[source]
        last: Box<Error>,
    },

    /// Run was cancelled (e.g., Ctrl-C during a retry pause)
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (metadata index or config file)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

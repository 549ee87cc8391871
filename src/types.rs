//! Core types for blog-writer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline stage a stored artifact came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Intermediate output of the writing stage
    Draft,
    /// Proofread output, ready for publication
    Final,
}

impl Stage {
    /// Stage label as used in filenames and the metadata index
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Draft => "draft",
            Stage::Final => "final",
        }
    }

    /// Filename of the stored artifact for this stage
    pub fn artifact_filename(&self) -> String {
        format!("{}_blog_post.md", self.as_str())
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one stored blog post
///
/// A record is the sole pointer from the metadata index to on-disk content.
/// `directory` is unique per record and doubles as the record key: saving
/// into an existing directory updates that record in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlogRecord {
    /// The blog topic as entered by the caller
    pub topic: String,
    /// Directory name under the storage root (slug + timestamp, unique)
    pub directory: String,
    /// Pipeline stage of the stored content
    pub stage: Stage,
    /// Filename of the content file inside `directory`
    pub filename: String,
    /// When this record was created or last updated (ISO-8601)
    pub created_at: DateTime<Utc>,
    /// Full path to the content file
    pub file_path: PathBuf,
}

/// The persisted metadata index
///
/// One JSON document at `<root>/metadata.json` holding every record in
/// insertion order. The storage engine is the single writer; the document
/// is rewritten as a whole after each mutation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MetadataIndex {
    /// All records, insertion order preserved
    #[serde(default)]
    pub blogs: Vec<BlogRecord>,
}

/// Statistics about the blog storage
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageStats {
    /// Number of records in the index
    pub total_blogs: usize,
    /// Sum of existing content file sizes in bytes (missing files skipped)
    pub total_size_bytes: u64,
    /// `total_size_bytes` in megabytes, rounded to two decimals
    pub total_size_mb: f64,
    /// The storage root directory
    pub storage_directory: PathBuf,
}

/// Progress events emitted during a generation run
///
/// The generator broadcasts these over a `tokio::sync::broadcast` channel so
/// embedders can observe a run without polling. Missing an event is harmless;
/// the run result carries the authoritative outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A generation attempt is starting
    AttemptStarted {
        /// Attempt number, starting at 1
        attempt: u32,
        /// Configured attempt bound
        max_attempts: u32,
    },

    /// An attempt failed; a retry may follow
    AttemptFailed {
        /// Attempt number that failed
        attempt: u32,
        /// Error message for this attempt
        error: String,
    },

    /// An output artifact was found after a pipeline invocation
    ArtifactDiscovered {
        /// Which stage's artifact was found
        stage: Stage,
    },

    /// Content was written to the output file and committed to storage
    Committed {
        /// Path of the per-run output file
        output_path: PathBuf,
        /// Path of the content file inside the storage root
        storage_path: PathBuf,
    },
}

//! # blog-writer
//!
//! Retry-driven blog generation pipeline with durable local storage.
//!
//! ## Design Philosophy
//!
//! blog-writer is designed to be:
//! - **Pipeline-agnostic** - The generative backend (research, writing,
//!   proofreading) sits behind a trait and communicates only through
//!   artifacts on disk
//! - **Failure-tolerant** - One logical run survives transient pipeline
//!   failures via sequential, cancellable retries
//! - **Durable** - Committed posts live in a directory tree indexed by a
//!   single human-diffable JSON document
//! - **Event-driven** - Consumers subscribe to run progress, no polling
//!   required
//!
//! ## Quick Start
//!
//! ```no_run
//! use blog_writer::{BlogStorage, CommandPipeline, Config, Generator};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let storage = BlogStorage::open(&config.storage.root_dir)?;
//!     let pipeline = Arc::new(CommandPipeline::new(
//!         PathBuf::from("crew-runner"),
//!         vec!["--profile".to_string(), "blog".to_string()],
//!         config.output.work_dir.clone(),
//!     ));
//!
//!     let generator = Generator::new(pipeline, storage, config);
//!     let outcome = generator.generate("Rust in production").await?;
//!     println!("Saved to {}", outcome.storage_path.display());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Command-line interface
pub mod cli;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Generation orchestration (retry loop, commit protocol)
pub mod generator;
/// Artifact content normalization
pub mod normalize;
/// Pipeline abstraction and command-backed adapter
pub mod pipeline;
/// Retry logic with fixed delay and cancellation
pub mod retry;
/// Durable blog storage with a JSON metadata index
pub mod storage;
/// Core types (records, index, events)
pub mod types;
/// Topic slug utilities
pub mod utils;

// Re-export commonly used types
pub use config::{Config, OutputConfig, RetryConfig, StorageConfig};
pub use error::{Error, Result};
pub use generator::{GenerateOutcome, Generator};
pub use pipeline::{ArtifactPaths, BlogPipeline, CommandPipeline};
pub use retry::IsRetryable;
pub use storage::BlogStorage;
pub use types::{BlogRecord, Event, MetadataIndex, Stage, StorageStats};

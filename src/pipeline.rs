//! Generation pipeline abstraction
//!
//! The multi-stage generative process (research, writing, proofreading) is
//! a black box behind the [`BlogPipeline`] trait. An implementation is
//! invoked with a topic and communicates its result exclusively through
//! artifacts written to a working directory; the orchestrator never
//! inspects a return value for content.
//!
//! ## Architecture
//!
//! - [`BlogPipeline`]: the capability interface; test doubles implement it
//!   deterministically
//! - [`CommandPipeline`]: runs an external generator program
//! - [`ArtifactPaths`]: the two discovery locations inside the working
//!   directory, in priority order

use crate::error::{Error, Result};
use crate::types::Stage;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Transient artifact locations for one pipeline run
///
/// The proofreading stage writes `final_blog_post.md`; the writing stage
/// writes `blog_post.md`. Discovery prefers the final artifact and falls
/// back to the draft, so a run whose proofreading step died still yields
/// usable content.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// Proofread, final-stage artifact (checked first)
    pub final_post: PathBuf,
    /// Draft-stage artifact (fallback)
    pub draft_post: PathBuf,
}

impl ArtifactPaths {
    /// Artifact locations inside `work_dir`
    #[must_use]
    pub fn in_dir(work_dir: &Path) -> Self {
        Self {
            final_post: work_dir.join("final_blog_post.md"),
            draft_post: work_dir.join("blog_post.md"),
        }
    }

    /// Find the first existing artifact, final stage before draft
    #[must_use]
    pub fn discover(&self) -> Option<(Stage, &Path)> {
        if self.final_post.is_file() {
            Some((Stage::Final, self.final_post.as_path()))
        } else if self.draft_post.is_file() {
            Some((Stage::Draft, self.draft_post.as_path()))
        } else {
            None
        }
    }

    /// Remove both artifacts if present
    ///
    /// Cleanup runs after content has been committed, so a failure here
    /// must not fail the run; it is logged and ignored.
    pub fn cleanup(&self) {
        for path in [&self.final_post, &self.draft_post] {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Removed transient artifact");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove transient artifact");
                }
            }
        }
    }
}

/// Trait for blog generation pipelines
///
/// Implementations run the full research/write/proofread process for a
/// topic and report only success or failure. Content is handed over by
/// writing artifacts into the working directory the orchestrator watches;
/// a succeeding invocation that wrote nothing is treated as a failed
/// attempt by the caller.
#[async_trait]
pub trait BlogPipeline: Send + Sync {
    /// Run one generation pass for `topic`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pipeline`] when the underlying process fails. A
    /// clean return with no artifact on disk is equally a failed attempt,
    /// but that judgement belongs to the orchestrator.
    async fn invoke(&self, topic: &str) -> Result<()>;
}

/// Pipeline backed by an external generator command
///
/// Executes a configured program with the topic appended as the final
/// argument, with the working directory set so relative artifact paths
/// land where discovery looks for them.
///
/// # Examples
///
/// ```no_run
/// use blog_writer::pipeline::{BlogPipeline, CommandPipeline};
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = CommandPipeline::new(
///     PathBuf::from("crew-runner"),
///     vec!["--profile".to_string(), "blog".to_string()],
///     PathBuf::from("."),
/// );
/// pipeline.invoke("Rust in production").await?;
/// # Ok(())
/// # }
/// ```
pub struct CommandPipeline {
    program: PathBuf,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl CommandPipeline {
    /// Create a pipeline that runs `program` with `args` in `work_dir`
    pub fn new(program: PathBuf, args: Vec<String>, work_dir: PathBuf) -> Self {
        Self {
            program,
            args,
            work_dir,
        }
    }
}

#[async_trait]
impl BlogPipeline for CommandPipeline {
    async fn invoke(&self, topic: &str) -> Result<()> {
        tracing::info!(
            program = %self.program.display(),
            topic = topic,
            "Invoking generation pipeline"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(topic)
            .current_dir(&self.work_dir)
            .output()
            .await
            .map_err(|e| {
                Error::Pipeline(format!(
                    "failed to execute {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.chars().take(400).collect();
            return Err(Error::Pipeline(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                excerpt.trim()
            )));
        }

        Ok(())
    }
}

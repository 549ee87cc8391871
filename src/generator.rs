//! Generation orchestration
//!
//! Drives exactly one logical "generate a blog" operation to success or
//! exhaustion: invoke the pipeline, discover and normalize its artifact,
//! commit the content to the output directory and the storage engine, then
//! clean up transient files. Failed attempts are retried by
//! [`run_with_retry`](crate::retry::run_with_retry); either commit write
//! failing marks the whole attempt as failed, never as a partial success.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::normalize::strip_code_fence;
use crate::pipeline::{ArtifactPaths, BlogPipeline};
use crate::retry::run_with_retry;
use crate::storage::BlogStorage;
use crate::types::{Event, Stage};
use crate::utils::timestamped_slug;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;

/// Event channel capacity; a run emits a handful of events per attempt
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Result of a successful generation run
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    /// Directory name of the committed record in storage
    pub directory: String,
    /// Per-run output file path
    pub output_path: PathBuf,
    /// Content file path inside the storage root
    pub storage_path: PathBuf,
    /// Which artifact was discovered; `Draft` means the final-stage
    /// artifact was missing and the fallback was committed
    pub discovered_stage: Stage,
    /// Attempt number that succeeded, starting at 1
    pub attempts: u32,
}

/// Orchestrator for blog generation runs
///
/// Owns the pipeline, the storage engine, and a broadcast channel of
/// progress [`Event`]s. Cloneable; all state is shared behind `Arc`.
#[derive(Clone)]
pub struct Generator {
    pipeline: Arc<dyn BlogPipeline>,
    storage: Arc<Mutex<BlogStorage>>,
    config: Arc<Config>,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
}

impl Generator {
    /// Create a generator from a pipeline, an opened storage engine, and
    /// configuration
    pub fn new(pipeline: Arc<dyn BlogPipeline>, storage: BlogStorage, config: Config) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            pipeline,
            storage: Arc::new(Mutex::new(storage)),
            config: Arc::new(config),
            event_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to progress events for runs on this generator
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Token that cancels an in-flight run
    ///
    /// Cancelling during a retry pause ends the run with
    /// [`Error::Cancelled`] instead of spending further attempts.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drive one generation run for `topic` to success or exhaustion
    ///
    /// Attempts are strictly sequential; the configured fixed delay
    /// separates them.
    ///
    /// # Errors
    ///
    /// [`Error::ExhaustedRetries`] once every attempt failed,
    /// [`Error::Cancelled`] when the run was interrupted, or the first
    /// non-retryable error encountered.
    pub async fn generate(&self, topic: &str) -> Result<GenerateOutcome> {
        let max_attempts = self.config.retry.max_attempts.max(1);
        let ctx = self.clone();
        let topic = topic.to_string();

        run_with_retry(&self.config.retry, &self.cancel, move |attempt| {
            let ctx = ctx.clone();
            let topic = topic.clone();
            async move { ctx.attempt_once(&topic, attempt, max_attempts).await }
        })
        .await
    }

    async fn attempt_once(
        &self,
        topic: &str,
        attempt: u32,
        max_attempts: u32,
    ) -> Result<GenerateOutcome> {
        self.event_tx
            .send(Event::AttemptStarted {
                attempt,
                max_attempts,
            })
            .ok();
        tracing::info!(
            attempt = attempt,
            max_attempts = max_attempts,
            topic = topic,
            "Running blog generation pipeline"
        );

        let result = self.run_and_commit(topic, attempt).await;
        if let Err(e) = &result {
            self.event_tx
                .send(Event::AttemptFailed {
                    attempt,
                    error: e.to_string(),
                })
                .ok();
        }
        result
    }

    async fn run_and_commit(&self, topic: &str, attempt: u32) -> Result<GenerateOutcome> {
        self.pipeline.invoke(topic).await?;

        // The pipeline's return value is not trusted for content; only
        // artifacts on disk count.
        let artifacts = ArtifactPaths::in_dir(&self.config.output.work_dir);
        let Some((stage, artifact_path)) = artifacts.discover() else {
            tracing::warn!(
                work_dir = %self.config.output.work_dir.display(),
                "Pipeline reported success but produced no artifact"
            );
            return Err(Error::NoArtifact);
        };

        let content = match std::fs::read_to_string(artifact_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %artifact_path.display(),
                    error = %e,
                    "Discovered artifact could not be read"
                );
                return Err(Error::NoArtifact);
            }
        };
        if content.trim().is_empty() {
            tracing::warn!(path = %artifact_path.display(), "Discovered artifact is empty");
            return Err(Error::NoArtifact);
        }

        self.event_tx.send(Event::ArtifactDiscovered { stage }).ok();
        if stage == Stage::Draft {
            tracing::warn!(
                "Final-stage artifact missing; committing the draft-stage artifact instead"
            );
        }

        let normalized = strip_code_fence(&content);

        // Commit protocol: output file first, then storage, cleanup last.
        // A failure in either write fails the attempt as a whole.
        let output_path = self.write_output_file(topic, &normalized)?;
        let storage_path = {
            let mut storage = self.storage.lock().await;
            let root = storage.root().to_path_buf();
            storage
                .save(topic, &normalized, Stage::Final)
                .map_err(|e| Error::PartialWrite {
                    path: root,
                    reason: e.to_string(),
                })?
        };

        artifacts.cleanup();

        self.event_tx
            .send(Event::Committed {
                output_path: output_path.clone(),
                storage_path: storage_path.clone(),
            })
            .ok();
        tracing::info!(
            output = %output_path.display(),
            storage = %storage_path.display(),
            attempt = attempt,
            "Blog post committed"
        );

        let directory = storage_path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(GenerateOutcome {
            directory,
            output_path,
            storage_path,
            discovered_stage: stage,
            attempts: attempt,
        })
    }

    fn write_output_file(&self, topic: &str, content: &str) -> Result<PathBuf> {
        let output_dir = &self.config.output.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|e| Error::PartialWrite {
            path: output_dir.clone(),
            reason: e.to_string(),
        })?;

        let filename = format!("{}.md", timestamped_slug(topic, Utc::now()));
        let output_path = output_dir.join(filename);
        std::fs::write(&output_path, content).map_err(|e| Error::PartialWrite {
            path: output_path.clone(),
            reason: e.to_string(),
        })?;
        Ok(output_path)
    }
}

//! Durable blog storage backed by a directory tree and a JSON index
//!
//! Layout: `<root>/metadata.json` plus one subdirectory per stored blog,
//! named `<topic-slug>_<YYYYMMDD_HHMMSS>`, containing the content file
//! `<stage>_blog_post.md`. The index document is the source of truth for
//! retrieval; directories on disk that have no index entry are tolerated
//! but invisible.
//!
//! The index lives on the [`BlogStorage`] instance and follows an explicit
//! load/mutate/persist cycle. One process is assumed to be the single
//! writer for a storage root's lifetime; there is no cross-process locking.

use crate::error::{Error, Result};
use crate::types::{BlogRecord, MetadataIndex, Stage, StorageStats};
use crate::utils::timestamped_slug;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

/// Name of the metadata index file inside the storage root
const METADATA_FILE: &str = "metadata.json";

/// Storage engine for generated blog posts
///
/// Provides durable CRUD and search over blog records. All access to stored
/// content goes through this type; callers never touch the directory tree
/// directly.
pub struct BlogStorage {
    root: PathBuf,
    metadata_path: PathBuf,
    index: MetadataIndex,
}

impl BlogStorage {
    /// Open (or create) a storage root
    ///
    /// Ensures the root directory exists and loads the metadata index from
    /// `<root>/metadata.json`. A missing index is created empty and
    /// persisted immediately, which also proves the root is writable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageInit`] when the root cannot be created, read,
    /// or written, and [`Error::Serialization`] when an existing index file
    /// is not valid JSON.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::StorageInit {
            path: root.clone(),
            source: e,
        })?;

        let metadata_path = root.join(METADATA_FILE);
        let mut storage = Self {
            root: root.clone(),
            metadata_path: metadata_path.clone(),
            index: MetadataIndex::default(),
        };

        if metadata_path.exists() {
            let raw = fs::read_to_string(&metadata_path).map_err(|e| Error::StorageInit {
                path: root,
                source: e,
            })?;
            storage.index = serde_json::from_str(&raw)?;
            tracing::debug!(
                records = storage.index.blogs.len(),
                path = %metadata_path.display(),
                "Loaded metadata index"
            );
        } else {
            storage.persist_index().map_err(|e| match e {
                Error::Io(io) => Error::StorageInit {
                    path: storage.root.clone(),
                    source: io,
                },
                other => other,
            })?;
            tracing::debug!(path = %metadata_path.display(), "Created empty metadata index");
        }

        Ok(storage)
    }

    /// Save a blog post and upsert its metadata record
    ///
    /// The target directory is derived from the sanitized topic slug plus a
    /// second-resolution timestamp, so saving the same topic twice within
    /// one second reuses the directory and updates the existing record
    /// rather than appending a new one. The index is rewritten only after
    /// the content file is on disk and the record is fully formed.
    ///
    /// # Returns
    ///
    /// The path of the written content file.
    pub fn save(&mut self, topic: &str, content: &str, stage: Stage) -> Result<PathBuf> {
        let now = Utc::now();
        let directory = timestamped_slug(topic, now);
        let blog_dir = self.root.join(&directory);
        fs::create_dir_all(&blog_dir)?;

        let filename = stage.artifact_filename();
        let file_path = blog_dir.join(&filename);
        fs::write(&file_path, content)?;

        let record = BlogRecord {
            topic: topic.to_string(),
            directory: directory.clone(),
            stage,
            filename,
            created_at: now,
            file_path: file_path.clone(),
        };

        if let Some(existing) = self
            .index
            .blogs
            .iter_mut()
            .find(|b| b.directory == directory)
        {
            *existing = record;
        } else {
            self.index.blogs.push(record);
        }
        self.persist_index()?;

        tracing::info!(
            directory = %directory,
            stage = %stage,
            bytes = content.len(),
            "Saved blog post"
        );
        Ok(file_path)
    }

    /// All stored records, insertion order preserved
    pub fn list(&self) -> &[BlogRecord] {
        &self.index.blogs
    }

    /// Retrieve the content of a stored blog
    ///
    /// `blog_id` resolves by exact directory name first, then by
    /// case-insensitive topic match. Content is read live from disk;
    /// `None` means no record matched or the backing file is gone.
    pub fn get(&self, blog_id: &str) -> Result<Option<String>> {
        let Some(record) = self.resolve(blog_id) else {
            return Ok(None);
        };
        match fs::read_to_string(&record.file_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search records by case-insensitive substring over topic and directory
    pub fn search(&self, query: &str) -> Vec<&BlogRecord> {
        let query = query.to_lowercase();
        self.index
            .blogs
            .iter()
            .filter(|b| {
                b.topic.to_lowercase().contains(&query) || b.directory.contains(&query)
            })
            .collect()
    }

    /// The most recently created record, or `None` on an empty index
    pub fn latest(&self) -> Option<&BlogRecord> {
        self.index.blogs.iter().max_by_key(|b| b.created_at)
    }

    /// Delete a blog and its backing directory
    ///
    /// Resolution follows [`get`](Self::get). Directory removal happens
    /// before the index is touched; if removal fails the index is left
    /// unchanged so metadata and disk cannot diverge. Returns whether a
    /// record was found and removed.
    pub fn delete(&mut self, blog_id: &str) -> Result<bool> {
        let Some(pos) = self.resolve_position(blog_id) else {
            return Ok(false);
        };

        let blog_dir = self.root.join(&self.index.blogs[pos].directory);
        if blog_dir.exists() {
            fs::remove_dir_all(&blog_dir)?;
        }

        let removed = self.index.blogs.remove(pos);
        self.persist_index()?;
        tracing::info!(directory = %removed.directory, "Deleted blog post");
        Ok(true)
    }

    /// Statistics over the stored records
    ///
    /// File sizes are summed from disk; records whose backing file is
    /// missing contribute nothing.
    pub fn stats(&self) -> StorageStats {
        let total_size_bytes: u64 = self
            .index
            .blogs
            .iter()
            .filter_map(|b| fs::metadata(&b.file_path).ok())
            .map(|m| m.len())
            .sum();

        StorageStats {
            total_blogs: self.index.blogs.len(),
            total_size_bytes,
            total_size_mb: (total_size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
            storage_directory: self.root.clone(),
        }
    }

    /// The storage root directory
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resolve(&self, blog_id: &str) -> Option<&BlogRecord> {
        self.resolve_position(blog_id).map(|i| &self.index.blogs[i])
    }

    // Exact directory match wins over topic match so that directory names,
    // which embed a timestamp, stay unambiguous even when topics repeat.
    fn resolve_position(&self, blog_id: &str) -> Option<usize> {
        if let Some(pos) = self.index.blogs.iter().position(|b| b.directory == blog_id) {
            return Some(pos);
        }
        let query = blog_id.to_lowercase();
        self.index
            .blogs
            .iter()
            .position(|b| b.topic.to_lowercase() == query)
    }

    // Whole-document rewrite; 2-space indent and unescaped non-ASCII keep
    // the index human-diffable.
    fn persist_index(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.index)?;
        fs::write(&self.metadata_path, json)?;
        Ok(())
    }
}

//! Configuration types for blog-writer

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Storage engine configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage root directory holding the metadata index and one
    /// subdirectory per blog (default: "./blogs")
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
        }
    }
}

/// Output and working-directory configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for per-run output files (default: "./output")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory where the pipeline drops its transient artifacts
    /// (default: ".")
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            work_dir: default_work_dir(),
        }
    }
}

/// Retry configuration for the generation loop
///
/// The delay between attempts is fixed, not exponential: one pipeline run
/// already takes long enough that backoff would add nothing but latency.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of generation attempts (default: 2)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in seconds (default: 5)
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
        }
    }
}

/// Main configuration for blog-writer
///
/// All sub-config fields are flattened for serialization, so a config file
/// is a single flat JSON object. Every field has a default; an empty object
/// (or no config file at all) yields a working configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage engine settings
    #[serde(flatten)]
    pub storage: StorageConfig,

    /// Output file and working-directory settings
    #[serde(flatten)]
    pub output: OutputConfig,

    /// Retry behavior for the generation loop
    #[serde(flatten)]
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read config file {}: {}", path.display(), e),
            key: None,
        })?;
        serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("invalid config file {}: {}", path.display(), e),
            key: None,
        })
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./blogs")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

// Duration serialization helper - serializes as seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_documented_values() {
        let config = Config::default();
        assert_eq!(config.storage.root_dir, PathBuf::from("./blogs"));
        assert_eq!(config.output.output_dir, PathBuf::from("./output"));
        assert_eq!(config.output.work_dir, PathBuf::from("."));
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.retry_delay, Duration::from_secs(5));
    }

    #[test]
    fn empty_json_object_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.storage.root_dir, PathBuf::from("./blogs"));
    }

    #[test]
    fn retry_delay_serializes_as_seconds() {
        let config = RetryConfig {
            max_attempts: 3,
            retry_delay: Duration::from_secs(10),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"retry_delay\":10"), "got: {json}");

        let back: RetryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.retry_delay, Duration::from_secs(10));
        assert_eq!(back.max_attempts, 3);
    }

    #[test]
    fn flattened_config_round_trips() {
        let config = Config {
            storage: StorageConfig {
                root_dir: PathBuf::from("/data/blogs"),
            },
            output: OutputConfig {
                output_dir: PathBuf::from("/data/output"),
                work_dir: PathBuf::from("/tmp/work"),
            },
            retry: RetryConfig {
                max_attempts: 4,
                retry_delay: Duration::from_secs(1),
            },
        };

        let json = serde_json::to_string(&config).unwrap();
        // Flattened: no nested objects in the serialized form
        assert_eq!(json.matches('{').count(), 1, "got: {json}");

        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.storage.root_dir, PathBuf::from("/data/blogs"));
        assert_eq!(back.output.work_dir, PathBuf::from("/tmp/work"));
        assert_eq!(back.retry.max_attempts, 4);
    }

    #[test]
    fn from_file_reads_partial_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"max_attempts": 7}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.retry.max_attempts, 7);
        // Unspecified fields fall back to defaults
        assert_eq!(config.retry.retry_delay, Duration::from_secs(5));
    }

    #[test]
    fn from_file_missing_file_is_config_error() {
        let result = Config::from_file(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn from_file_invalid_json_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let result = Config::from_file(&path);
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}

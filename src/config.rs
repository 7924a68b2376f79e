//! Configuration module for the gallery core.

use serde::Deserialize;
use std::path::Path;

use crate::{GalleryError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/gallery.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Which object storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Directory on the local filesystem.
    #[default]
    Local,
    /// Supabase storage REST API.
    Supabase,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Storage backend.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory for the local backend.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Base URL under which local objects are served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Supabase project URL (e.g. `https://xyz.supabase.co`).
    #[serde(default)]
    pub supabase_url: String,
    /// Bucket name.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// API key sent as bearer token (must be set for the supabase backend).
    #[serde(default)]
    pub api_key: String,
}

fn default_storage_path() -> String {
    "data/gallery-images".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/gallery-images".to_string()
}

fn default_bucket() -> String {
    "gallery-images".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
            public_base_url: default_public_base_url(),
            supabase_url: String::new(),
            bucket: default_bucket(),
            api_key: String::new(),
        }
    }
}

/// Ingestion pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Output size ceiling per image in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Maximum length of the longer edge in pixels.
    #[serde(default = "default_max_edge")]
    pub max_edge: u32,
    /// First encoder quality tried (1-100).
    #[serde(default = "default_initial_quality")]
    pub initial_quality: u8,
    /// Lowest encoder quality before the image is downscaled further.
    #[serde(default = "default_min_quality")]
    pub min_quality: u8,
    /// How many files of one batch are processed at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_max_bytes() -> usize {
    200 * 1024
}

fn default_max_edge() -> u32 {
    1280
}

fn default_initial_quality() -> u8 {
    85
}

fn default_min_quality() -> u8 {
    40
}

fn default_concurrency() -> usize {
    1
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            max_edge: default_max_edge(),
            initial_quality: default_initial_quality(),
            min_quality: default_min_quality(),
            concurrency: default_concurrency(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/gallery.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Ingestion pipeline configuration.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GalleryError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GalleryError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `GALLERY_STORAGE_API_KEY`: Override the storage API key
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("GALLERY_STORAGE_API_KEY") {
            if !api_key.is_empty() {
                self.storage.api_key = api_key;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::Supabase {
            if self.storage.supabase_url.is_empty() {
                return Err(GalleryError::Config(
                    "storage.backend is supabase but supabase_url is not set".to_string(),
                ));
            }
            if self.storage.api_key.is_empty() {
                return Err(GalleryError::Config(
                    "storage.backend is supabase but api_key is not set. \
                     Set it in config.toml or via GALLERY_STORAGE_API_KEY."
                        .to_string(),
                ));
            }
        }

        if self.ingest.max_edge == 0 || self.ingest.max_bytes == 0 {
            return Err(GalleryError::Config(
                "ingest.max_edge and ingest.max_bytes must be positive".to_string(),
            ));
        }

        if self.ingest.min_quality == 0
            || self.ingest.min_quality > self.ingest.initial_quality
            || self.ingest.initial_quality > 100
        {
            return Err(GalleryError::Config(
                "ingest qualities must satisfy 1 <= min_quality <= initial_quality <= 100"
                    .to_string(),
            ));
        }

        if self.ingest.concurrency == 0 {
            return Err(GalleryError::Config(
                "ingest.concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

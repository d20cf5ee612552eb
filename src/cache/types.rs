use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CACHE_VERSION: &str = "1.0";

/// Where a cached code came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSource {
    Lookup,
    Operator,
}

/// A resolved station name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    pub source: CodeSource,
    pub resolved_at: DateTime<Utc>,
}

impl CodeEntry {
    pub fn new(code: impl Into<String>, source: CodeSource) -> Self {
        Self {
            code: code.into(),
            source,
            resolved_at: Utc::now(),
        }
    }

    /// An expiry of 0 days means entries never expire
    pub fn is_expired(&self, expiry_days: u32) -> bool {
        if expiry_days == 0 {
            return false;
        }
        let age = Utc::now().signed_duration_since(self.resolved_at);
        age.num_days() > expiry_days as i64
    }
}

/// The cache file structure (serialized to JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    pub version: String,
    /// Keyed by normalized station name
    pub entries: BTreeMap<String, CodeEntry>,
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            entries: BTreeMap::new(),
        }
    }
}

/// Configuration for the code cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub expiry_days: u32,
    /// `None` keeps the cache in memory for this run only
    pub cache_path: Option<PathBuf>,
}

impl CacheConfig {
    pub fn in_memory() -> Self {
        Self {
            expiry_days: 0,
            cache_path: None,
        }
    }

    pub fn at_path(path: &Path, expiry_days: u32) -> Self {
        Self {
            expiry_days,
            cache_path: Some(path.to_path_buf()),
        }
    }

    /// Cache file under the user cache directory
    pub fn for_user_home(expiry_days: u32) -> Option<Self> {
        dirs::cache_dir().map(|cache_dir| Self {
            expiry_days,
            cache_path: Some(cache_dir.join("rail-audio-rename").join("crs-cache.json")),
        })
    }
}

/// Errors that can occur during cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache file corrupted")]
    Corrupted,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("Cache version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

use super::types::{CacheConfig, CacheError, CacheFile, CodeEntry, CodeSource, CACHE_VERSION};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info, warn};

/// Station name to code mapping.
///
/// Owned by whoever runs a batch and handed to the resolver explicitly; it is
/// only written to disk when a cache path is configured and `save` is called.
#[derive(Debug)]
pub struct CodeCache {
    config: CacheConfig,
    data: CacheFile,
    dirty: bool,
}

impl CodeCache {
    /// Load cache from disk or create new empty cache
    pub fn load(config: CacheConfig) -> Self {
        let data = match &config.cache_path {
            None => CacheFile::default(),
            Some(path) => match Self::read_cache_file(path) {
                Ok(cache) => {
                    info!("Loaded code cache with {} entries", cache.entries.len());
                    cache
                }
                Err(e) => {
                    match &e {
                        CacheError::IoError(io_err)
                            if io_err.kind() == std::io::ErrorKind::NotFound =>
                        {
                            debug!("No cache file found, starting fresh");
                        }
                        _ => {
                            warn!("Failed to load cache: {}, starting fresh", e);
                        }
                    }
                    CacheFile::default()
                }
            },
        };

        Self {
            config,
            data,
            dirty: false,
        }
    }

    pub fn in_memory() -> Self {
        Self::load(CacheConfig::in_memory())
    }

    fn read_cache_file(path: &Path) -> Result<CacheFile, CacheError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let cache: CacheFile =
            serde_json::from_reader(reader).map_err(|_| CacheError::Corrupted)?;

        if cache.version != CACHE_VERSION {
            return Err(CacheError::VersionMismatch {
                expected: CACHE_VERSION.to_string(),
                found: cache.version,
            });
        }

        Ok(cache)
    }

    /// Cache key for a station name
    pub fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Get the cached code if it exists and is not expired
    pub fn get(&self, name: &str) -> Option<&str> {
        let key = Self::normalize(name);
        self.data.entries.get(&key).and_then(|entry| {
            if entry.is_expired(self.config.expiry_days) {
                debug!("Cache entry '{}' expired", key);
                None
            } else {
                debug!("Cache hit for '{}'", key);
                Some(entry.code.as_str())
            }
        })
    }

    /// Insert or update a cache entry
    pub fn insert(&mut self, name: &str, code: &str, source: CodeSource) {
        let key = Self::normalize(name);
        debug!("Caching '{}' -> {}", key, code);
        self.data.entries.insert(key, CodeEntry::new(code, source));
        self.dirty = true;
    }

    /// Remove expired entries from cache
    pub fn prune_expired(&mut self) -> usize {
        let expiry_days = self.config.expiry_days;
        let before_count = self.data.entries.len();

        self.data
            .entries
            .retain(|_, entry| !entry.is_expired(expiry_days));

        let removed = before_count - self.data.entries.len();
        if removed > 0 {
            info!("Pruned {} expired cache entries", removed);
            self.dirty = true;
        }
        removed
    }

    /// Save cache to disk if modified and backed by a file
    pub fn save(&mut self) -> Result<(), CacheError> {
        let path = match &self.config.cache_path {
            Some(path) => path.clone(),
            None => return Ok(()),
        };

        if !self.dirty {
            debug!("Cache not modified, skipping save");
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a temporary file first, then swap it in
        let temp_path = path.with_extension("json.tmp");

        {
            let file = File::create(&temp_path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &self.data)?;
        }

        fs::rename(&temp_path, &path)?;

        self.dirty = false;
        info!(
            "Saved code cache with {} entries to {:?}",
            self.data.entries.len(),
            path
        );
        Ok(())
    }

    /// Whether there are changes `save` would write
    pub fn is_dirty(&self) -> bool {
        self.dirty && self.config.cache_path.is_some()
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.config.cache_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    fn expired_entry(code: &str) -> CodeEntry {
        let mut entry = CodeEntry::new(code, CodeSource::Lookup);
        entry.resolved_at = Utc::now() - Duration::days(60);
        entry
    }

    #[test]
    fn test_cache_hit_is_case_insensitive() {
        let mut cache = CodeCache::in_memory();
        cache.insert("Birmingham New Street", "BHM", CodeSource::Lookup);

        assert_eq!(cache.get("birmingham new street"), Some("BHM"));
        assert_eq!(cache.get("  BIRMINGHAM NEW STREET "), Some("BHM"));
    }

    #[test]
    fn test_cache_miss() {
        let cache = CodeCache::in_memory();
        assert!(cache.get("Nowhere").is_none());
    }

    #[test]
    fn test_expired_entry_not_returned() {
        let dir = tempdir().unwrap();
        let config = CacheConfig::at_path(&dir.path().join("crs.json"), 30);
        let mut cache = CodeCache::load(config);

        cache
            .data
            .entries
            .insert("old town".to_string(), expired_entry("OLD"));

        assert!(cache.get("Old Town").is_none());
    }

    #[test]
    fn test_prune_expired() {
        let dir = tempdir().unwrap();
        let config = CacheConfig::at_path(&dir.path().join("crs.json"), 30);
        let mut cache = CodeCache::load(config);

        cache.insert("Paddington", "PAD", CodeSource::Lookup);
        cache
            .data
            .entries
            .insert("old town".to_string(), expired_entry("OLD"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.prune_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("paddington"), Some("PAD"));
    }

    #[test]
    fn test_cache_persistence() {
        let dir = tempdir().unwrap();
        let config = CacheConfig::at_path(&dir.path().join("crs.json"), 30);

        {
            let mut cache = CodeCache::load(config.clone());
            cache.insert("Abbey Wood", "ABW", CodeSource::Operator);
            cache.save().unwrap();
        }

        let cache = CodeCache::load(config);
        assert_eq!(cache.get("abbey wood"), Some("ABW"));
    }

    #[test]
    fn test_in_memory_save_writes_nothing() {
        let mut cache = CodeCache::in_memory();
        cache.insert("Abbey Wood", "ABW", CodeSource::Lookup);

        assert!(cache.save().is_ok());
        assert!(cache.path().is_none());
    }

    #[test]
    fn test_corrupted_cache_handling() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("crs.json");
        fs::write(&cache_path, "{ invalid json }").unwrap();

        let cache = CodeCache::load(CacheConfig::at_path(&cache_path, 30));

        assert!(cache.is_empty());
    }

    #[test]
    fn test_version_mismatch_handling() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("crs.json");
        fs::write(&cache_path, r#"{"version": "0.1", "entries": {}}"#).unwrap();

        let cache = CodeCache::load(CacheConfig::at_path(&cache_path, 30));

        assert!(cache.is_empty());
    }

    #[test]
    fn test_atomic_write_and_parent_creation() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("nested").join("crs.json");
        let mut cache = CodeCache::load(CacheConfig::at_path(&cache_path, 30));

        cache.insert("Reading", "RDG", CodeSource::Lookup);
        cache.save().unwrap();

        assert!(cache_path.exists());
        assert!(!cache_path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_skip_save_when_not_dirty() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("crs.json");
        let mut cache = CodeCache::load(CacheConfig::at_path(&cache_path, 30));

        cache.save().unwrap();
        assert!(!cache_path.exists());

        cache.insert("Reading", "RDG", CodeSource::Lookup);
        cache.save().unwrap();
        assert!(cache_path.exists());
    }

    #[test]
    fn test_update_existing_entry() {
        let mut cache = CodeCache::in_memory();
        cache.insert("Reading", "XXX", CodeSource::Operator);
        cache.insert("reading", "RDG", CodeSource::Lookup);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Reading"), Some("RDG"));
    }
}

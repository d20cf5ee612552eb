use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Failed to read directory: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
}

impl FileEntry {
    pub fn new(name: String, path: PathBuf) -> Self {
        Self { name, path }
    }

    /// File name without its final extension
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }

    /// Final extension without the dot
    pub fn extension(&self) -> Option<&str> {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => Some(&self.name[idx + 1..]),
            _ => None,
        }
    }

    /// Case-insensitive extension check; an empty filter accepts everything
    pub fn has_extension(&self, extensions: &[String]) -> bool {
        if extensions.is_empty() {
            return true;
        }
        match self.extension() {
            Some(ext) => extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

/// List the regular, non-hidden files directly inside `target`, sorted by name
pub fn scan_files(target: &Path) -> Result<Vec<FileEntry>, ScannerError> {
    debug!(path = ?target, "Scanning directory");

    if !target.exists() {
        return Err(ScannerError::PathNotFound(target.to_path_buf()));
    }

    if !target.is_dir() {
        return Err(ScannerError::NotADirectory(target.to_path_buf()));
    }

    let mut entries = Vec::new();

    let read_dir = fs::read_dir(target).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ScannerError::PermissionDenied(target.to_path_buf())
        } else {
            ScannerError::IoError(e)
        }
    })?;

    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();

        trace!(entry = ?path, "Examining entry");

        if !path.is_file() {
            trace!(path = ?path, "Skipping non-file");
            continue;
        }

        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().to_string(),
            None => continue,
        };

        if name.starts_with('.') {
            trace!(name = %name, "Skipping hidden file");
            continue;
        }

        debug!(name = %name, "Found file");
        entries.push(FileEntry::new(name, path));
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(count = entries.len(), "Scan complete");

    Ok(entries)
}

/// Make sure a directory argument points at an existing directory
pub fn ensure_directory(target: &Path) -> Result<(), ScannerError> {
    if !target.exists() {
        return Err(ScannerError::PathNotFound(target.to_path_buf()));
    }
    if !target.is_dir() {
        return Err(ScannerError::NotADirectory(target.to_path_buf()));
    }
    Ok(())
}

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, trace};

use super::types::{
    file_name_of, CollisionStyle, RenameOperation, RenameOutcome, RenameRequest, TransferMode,
};

/// Errors that stop a batch
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Target directory does not exist: {0}")]
    MissingTargetDirectory(PathBuf),

    #[error("Target is not a directory: {0}")]
    TargetNotADirectory(PathBuf),

    #[error("No free name for '{base}' in {directory}")]
    NoFreeName { base: String, directory: PathBuf },

    #[error("Failed to move '{from}' to '{to}': {source}")]
    FilesystemError {
        from: String,
        to: String,
        #[source]
        source: io::Error,
    },
}

/// Moves files under desired names without ever replacing an existing file.
///
/// Every collision check asks the filesystem. In dry-run mode nothing is
/// touched; names handed out and sources moved away during the run are
/// tracked so the plan matches what a real run would do.
#[derive(Debug)]
pub struct Renamer {
    style: CollisionStyle,
    mode: TransferMode,
    dry_run: bool,
    planned: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
}

impl Renamer {
    pub fn new(style: CollisionStyle, dry_run: bool) -> Self {
        Self {
            style,
            mode: TransferMode::Move,
            dry_run,
            planned: HashSet::new(),
            vacated: HashSet::new(),
        }
    }

    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Fail early when a batch's target directory is unusable
    pub fn check_target(&self, target: &Path) -> Result<(), RenameError> {
        ensure_target_directory(target)
    }

    /// Process one request
    pub fn rename(&mut self, request: &RenameRequest) -> Result<RenameOutcome, RenameError> {
        ensure_target_directory(&request.target_directory)?;

        if !self.source_available(&request.source_path) {
            debug!(source = ?request.source_path, "Source missing, skipping");
            return Ok(RenameOutcome::SkippedMissingSource {
                path: request.source_path.clone(),
            });
        }

        let (destination, counter) = match self.resolve_destination(request)? {
            Some(resolved) => resolved,
            None => {
                debug!(source = ?request.source_path, "Already named, nothing to do");
                return Ok(RenameOutcome::Unchanged {
                    path: request.source_path.clone(),
                });
            }
        };

        let op = RenameOperation::new(request.source_path.clone(), destination, counter);

        if self.dry_run {
            self.planned.insert(op.destination_path.clone());
            if self.mode == TransferMode::Move {
                self.vacated.insert(op.source_path.clone());
            }
        } else {
            self.execute(&op)?;
        }

        Ok(RenameOutcome::Renamed(op))
    }

    /// Find the first free candidate path for a request.
    ///
    /// Returns `None` when a candidate is the source file itself, meaning the
    /// file already carries the name it would receive.
    pub fn resolve_destination(
        &self,
        request: &RenameRequest,
    ) -> Result<Option<(PathBuf, Option<u32>)>, RenameError> {
        let extension = request.extension_with_dot();
        let base = request.desired_name.as_str();

        let mut counter: u32 = 0;
        loop {
            let name = self.style.candidate(base, counter, &extension);
            let candidate = request.target_directory.join(&name);

            if self.mode == TransferMode::Move && is_same_file(&candidate, &request.source_path) {
                return Ok(None);
            }

            if !self.is_taken(&candidate) {
                trace!(candidate = %name, "Name is free");
                let counter = (counter > 0).then_some(counter);
                return Ok(Some((candidate, counter)));
            }

            trace!(candidate = %name, "Name taken");
            counter = counter.checked_add(1).ok_or_else(|| RenameError::NoFreeName {
                base: base.to_string(),
                directory: request.target_directory.clone(),
            })?;
        }
    }

    fn is_taken(&self, path: &Path) -> bool {
        if self.planned.contains(path) {
            return true;
        }
        path_exists(path) && !self.vacated.contains(path)
    }

    /// Whether a source is still in place, accounting for planned moves
    pub fn source_available(&self, path: &Path) -> bool {
        !self.vacated.contains(path) && path.is_file()
    }

    fn execute(&self, op: &RenameOperation) -> Result<(), RenameError> {
        let result = match self.mode {
            TransferMode::Move => fs::rename(&op.source_path, &op.destination_path),
            TransferMode::Copy => fs::copy(&op.source_path, &op.destination_path).map(|_| ()),
        };

        result.map_err(|e| RenameError::FilesystemError {
            from: op.source_name.clone(),
            to: op.destination_name.clone(),
            source: e,
        })?;

        match self.mode {
            TransferMode::Move => info!("Renamed: {} -> {}", op.source_name, op.destination_name),
            TransferMode::Copy => info!(
                "Copied: {} -> {}",
                op.source_name,
                op.destination_path.display()
            ),
        }

        Ok(())
    }
}

fn ensure_target_directory(target: &Path) -> Result<(), RenameError> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(RenameError::TargetNotADirectory(target.to_path_buf())),
        Err(_) => Err(RenameError::MissingTargetDirectory(target.to_path_buf())),
    }
}

// Dangling symlinks still occupy the name
fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    if file_name_of(a) != file_name_of(b) {
        return false;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

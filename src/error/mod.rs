mod codes;

pub use codes::ExitCode;

use crate::labeler::LabelError;
use crate::lookup::{LookupError, ResolveError};
use crate::metadata::MetadataError;
use crate::rename::RenameError;
use crate::rules::RuleError;
use crate::scanner::ScannerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Target directory does not exist: {path}")]
    MissingTargetDirectory { path: PathBuf },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Rule error: {message}")]
    RuleError { message: String },

    #[error("Metadata error: {message}")]
    MetadataError { message: String },

    #[error("Station lookup failed: {message}")]
    LookupError {
        name: Option<String>,
        message: String,
    },

    #[error("Rename failed: {from} -> {to}")]
    RenameError {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No free name for '{base}' in {directory}")]
    NoFreeName { base: String, directory: PathBuf },

    #[error("Prompt failed: {message}")]
    PromptError { message: String },

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::DirectoryNotFound { .. } => ExitCode::DirectoryNotFound,
            AppError::NotADirectory { .. } => ExitCode::DirectoryNotFound,
            AppError::PermissionDenied { .. } => ExitCode::PermissionError,
            AppError::MissingTargetDirectory { .. } => ExitCode::MissingTargetDirectory,
            AppError::InvalidArguments(_) => ExitCode::InvalidArguments,
            AppError::RuleError { .. } => ExitCode::InvalidArguments,
            AppError::MetadataError { .. } => ExitCode::MetadataError,
            AppError::LookupError { .. } => ExitCode::LookupError,
            AppError::RenameError { .. } => ExitCode::RenameError,
            AppError::NoFreeName { .. } => ExitCode::RenameError,
            AppError::PromptError { .. } => ExitCode::PromptError,
            AppError::Other(_) => ExitCode::GeneralError,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            AppError::DirectoryNotFound { path } => {
                format!(
                    "The specified directory does not exist:\n  {}\n\n\
                     Please verify the path and try again.",
                    path.display()
                )
            }

            AppError::NotADirectory { path } => {
                format!(
                    "The specified path is not a directory:\n  {}\n\n\
                     Please provide a valid directory path.",
                    path.display()
                )
            }

            AppError::PermissionDenied { path } => {
                format!(
                    "Permission denied when accessing:\n  {}\n\n\
                     Please check file permissions or run with appropriate privileges.",
                    path.display()
                )
            }

            AppError::MissingTargetDirectory { path } => {
                format!(
                    "The target directory does not exist:\n  {}\n\n\
                     Target directories are never created automatically.\n\
                     Create it first, then run again. Files renamed before\n\
                     this point stay renamed.",
                    path.display()
                )
            }

            AppError::InvalidArguments(message) => {
                format!("{}\n\nRun with --help for usage.", message)
            }

            AppError::RuleError { message } => {
                format!(
                    "{}\n\n\
                     Rule files are TOML with the keys: extensions, require_prefix,\n\
                     strip_prefixes, strip_suffixes, case, lowercase_extension, [count].",
                    message
                )
            }

            AppError::MetadataError { message } => {
                format!(
                    "Could not read the metadata file:\n  {}\n\n\
                     Check the column options (--id-column, --file-column,\n\
                     --label-column, --no-headers) against the file.",
                    message
                )
            }

            AppError::LookupError { name, message } => {
                let station = name
                    .as_ref()
                    .map(|n| format!(" for '{}'", n))
                    .unwrap_or_default();
                format!(
                    "Station lookup failed{}:\n  {}\n\n\
                     This could be due to:\n\
                     - Network connectivity issues\n\
                     - An incorrect RAIL_LOOKUP_URL\n\
                     - The lookup service being unavailable\n\n\
                     Files processed before this point stay renamed.",
                    station, message
                )
            }

            AppError::RenameError { from, to, source } => {
                format!(
                    "Failed to rename file:\n\
                     From: {}\n\
                     To:   {}\n\
                     Error: {}\n\n\
                     Check file permissions and ensure no files are open.",
                    from, to, source
                )
            }

            AppError::NoFreeName { base, directory } => {
                format!(
                    "Every counter for '{}' is taken in:\n  {}",
                    base,
                    directory.display()
                )
            }

            AppError::PromptError { message } => {
                format!("Could not read the operator's answer:\n  {}", message)
            }

            AppError::Other(message) => message.clone(),
        }
    }
}

impl From<ScannerError> for AppError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::PathNotFound(path) => AppError::DirectoryNotFound { path },
            ScannerError::NotADirectory(path) => AppError::NotADirectory { path },
            ScannerError::PermissionDenied(path) => AppError::PermissionDenied { path },
            ScannerError::IoError(e) => AppError::Other(format!("I/O error: {}", e)),
        }
    }
}

impl From<RenameError> for AppError {
    fn from(err: RenameError) -> Self {
        match err {
            RenameError::MissingTargetDirectory(path) => AppError::MissingTargetDirectory { path },
            RenameError::TargetNotADirectory(path) => AppError::NotADirectory { path },
            RenameError::NoFreeName { base, directory } => AppError::NoFreeName { base, directory },
            RenameError::FilesystemError { from, to, source } => {
                AppError::RenameError { from, to, source }
            }
        }
    }
}

impl From<MetadataError> for AppError {
    fn from(err: MetadataError) -> Self {
        AppError::MetadataError {
            message: err.to_string(),
        }
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        AppError::LookupError {
            name: None,
            message: err.to_string(),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Lookup { name, source } => AppError::LookupError {
                name: Some(name),
                message: source.to_string(),
            },
            ResolveError::Label(e) => e.into(),
        }
    }
}

impl From<LabelError> for AppError {
    fn from(err: LabelError) -> Self {
        AppError::PromptError {
            message: err.to_string(),
        }
    }
}

impl From<RuleError> for AppError {
    fn from(err: RuleError) -> Self {
        AppError::RuleError {
            message: err.to_string(),
        }
    }
}

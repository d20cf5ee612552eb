use std::path::{Path, PathBuf};

/// How the disambiguation counter is joined to a taken base name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CollisionStyle {
    /// `london_1.wav`
    #[default]
    Underscore,
    /// `london 1.wav`
    Space,
}

impl CollisionStyle {
    pub fn separator(&self) -> char {
        match self {
            CollisionStyle::Underscore => '_',
            CollisionStyle::Space => ' ',
        }
    }

    /// Build a candidate file name. Counter 0 is the undecorated name.
    pub fn candidate(&self, base: &str, counter: u32, extension: &str) -> String {
        if counter == 0 {
            format!("{}{}", base, extension)
        } else {
            format!("{}{}{}{}", base, self.separator(), counter, extension)
        }
    }
}

/// Whether the source leaves its old location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Move,
    Copy,
}

/// A single request to place a file under a metadata-derived name
#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub source_path: PathBuf,
    /// Base name without extension, already sanitized
    pub desired_name: String,
    pub target_directory: PathBuf,
    /// Extension override without the leading dot
    pub extension: Option<String>,
}

impl RenameRequest {
    pub fn new(
        source_path: impl Into<PathBuf>,
        desired_name: impl Into<String>,
        target_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            desired_name: desired_name.into(),
            target_directory: target_directory.into(),
            extension: None,
        }
    }

    /// Place the source in `target_directory` under its current name
    pub fn keeping_name(
        source_path: impl Into<PathBuf>,
        target_directory: impl Into<PathBuf>,
    ) -> Self {
        let source_path = source_path.into();
        let stem = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::new(source_path, stem, target_directory)
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Extension including the leading dot, or empty when the file has none.
    /// A source ending in a bare dot keeps that dot.
    pub fn extension_with_dot(&self) -> String {
        match &self.extension {
            Some(ext) => match ext.trim_start_matches('.') {
                "" => String::new(),
                ext => format!(".{}", ext),
            },
            None => self
                .source_path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
        }
    }

    pub fn source_name(&self) -> String {
        file_name_of(&self.source_path)
    }
}

/// A rename that was performed, or planned in a dry run
#[derive(Debug, Clone)]
pub struct RenameOperation {
    pub source_path: PathBuf,
    pub source_name: String,
    pub destination_path: PathBuf,
    pub destination_name: String,
    /// Disambiguation counter used, if the desired name was taken
    pub counter: Option<u32>,
}

impl RenameOperation {
    pub fn new(source_path: PathBuf, destination_path: PathBuf, counter: Option<u32>) -> Self {
        let source_name = file_name_of(&source_path);
        let destination_name = file_name_of(&destination_path);

        Self {
            source_path,
            source_name,
            destination_path,
            destination_name,
            counter,
        }
    }

    pub fn disambiguated(&self) -> bool {
        self.counter.is_some()
    }
}

/// What the renamer did with one request
#[derive(Debug, Clone)]
pub enum RenameOutcome {
    Renamed(RenameOperation),
    /// The desired name already belongs to the source file
    Unchanged { path: PathBuf },
    /// The source did not exist when the request was processed
    SkippedMissingSource { path: PathBuf },
}

/// Ordered report of one batch
#[derive(Debug, Clone)]
pub struct RenameResult {
    /// Human-readable batch description, e.g. "CSV metadata"
    pub source: String,
    pub operations: Vec<RenameOperation>,
    pub unchanged: usize,
    pub skipped_missing: usize,
    /// Items the operator or the metadata declined to name
    pub skipped_unlabeled: usize,
    pub dry_run: bool,
}

impl RenameResult {
    pub fn new(source: impl Into<String>, dry_run: bool) -> Self {
        Self {
            source: source.into(),
            operations: Vec::new(),
            unchanged: 0,
            skipped_missing: 0,
            skipped_unlabeled: 0,
            dry_run,
        }
    }

    pub fn record(&mut self, outcome: RenameOutcome) {
        match outcome {
            RenameOutcome::Renamed(op) => self.operations.push(op),
            RenameOutcome::Unchanged { .. } => self.unchanged += 1,
            RenameOutcome::SkippedMissingSource { .. } => self.skipped_missing += 1,
        }
    }

    pub fn skip_unlabeled(&mut self) {
        self.skipped_unlabeled += 1;
    }

    pub fn disambiguated_count(&self) -> usize {
        self.operations.iter().filter(|op| op.disambiguated()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

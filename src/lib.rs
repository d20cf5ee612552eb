pub mod batch;
pub mod cache;
pub mod cli;
pub mod error;
pub mod labeler;
pub mod logging;
pub mod lookup;
pub mod metadata;
pub mod output;
pub mod progress;
pub mod rename;
pub mod rules;
pub mod scanner;

pub use batch::{label_directory, rename_from_metadata, rename_with_rule, sort_directory};
pub use cache::{CacheConfig, CodeCache};
pub use error::{AppError, ExitCode};
pub use labeler::{LabelItem, Labeler, PromptLabeler, ScriptedLabeler};
pub use lookup::{CodeResolver, CrsClient, StationLookup, StationRecord};
pub use metadata::{read_metadata, MetadataRow, MetadataSchema};
pub use rename::{
    CollisionStyle, RenameError, RenameOutcome, RenameRequest, RenameResult, Renamer,
};
pub use rules::{DatasetRule, RuleOutcome};
pub use scanner::{scan_files, FileEntry, ScannerError};

mod name_builder;
mod renamer;
mod types;

pub use name_builder::{build_desired_name, sanitize_name, CaseStyle, NamePattern};
pub use renamer::{RenameError, Renamer};
pub use types::{
    CollisionStyle, RenameOperation, RenameOutcome, RenameRequest, RenameResult, TransferMode,
};

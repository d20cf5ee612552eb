//! Batch flows that turn metadata, rules or operator answers into rename
//! requests and feed them to the [`Renamer`] in order.

mod categorise;
mod from_metadata;
mod from_rules;
mod interactive;
mod variants;

pub use categorise::{
    default_categories, default_pair_categories, pair_takes, sort_directory, sort_pairs,
    Category, CategoryParseError, TakePair,
};
pub use from_metadata::{rename_from_metadata, MetadataOptions};
pub use from_rules::rename_with_rule;
pub use interactive::label_directory;
pub use variants::{label_variant_groups, Variant, VariantParseError};

use tracing::debug;

use crate::progress::Progress;
use crate::rename::{RenameError, RenameOutcome, RenameRequest, RenameResult, Renamer};

/// Position of an item within its batch, 1-based
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    pub current: usize,
    pub total: usize,
}

/// Hand one request to the renamer and record what happened
pub(crate) fn submit(
    renamer: &mut Renamer,
    request: &RenameRequest,
    step: Step,
    progress: &mut Progress,
    result: &mut RenameResult,
) -> Result<(), RenameError> {
    let outcome = renamer.rename(request)?;

    match &outcome {
        RenameOutcome::Renamed(op) => {
            progress.rename_progress(
                step.current,
                step.total,
                &op.source_name,
                &op.destination_name,
            );
        }
        RenameOutcome::Unchanged { .. } => {
            progress.skipped(
                step.current,
                step.total,
                &request.source_name(),
                "already named",
            );
        }
        RenameOutcome::SkippedMissingSource { path } => {
            debug!(source = ?path, "Source not present");
        }
    }

    result.record(outcome);
    Ok(())
}

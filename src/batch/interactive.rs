use std::path::Path;

use super::{submit, Step};
use crate::error::AppError;
use crate::labeler::{LabelItem, Labeler};
use crate::progress::Progress;
use crate::rename::{sanitize_name, RenameRequest, RenameResult, Renamer};
use crate::scanner::scan_files;

/// Ask the operator to name every file in a directory.
///
/// Only files matching `extensions` are offered (all files when empty).
/// A blank answer leaves the file where it is.
pub fn label_directory(
    dir: &Path,
    target_dir: &Path,
    extensions: &[String],
    labeler: &mut dyn Labeler,
    renamer: &mut Renamer,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    renamer.check_target(target_dir)?;

    let files: Vec<_> = scan_files(dir)?
        .into_iter()
        .filter(|f| f.has_extension(extensions))
        .collect();

    let mut result = RenameResult::new("Operator labels", renamer.is_dry_run());
    let total = files.len();

    progress.batch_start(total, "Labeling files");

    for (i, file) in files.iter().enumerate() {
        let step = Step {
            current: i + 1,
            total,
        };

        let item = LabelItem::new(format!("Name file ({})", file.name)).with_audio(&file.path);
        let name = labeler
            .present_for_labeling(&item)?
            .map(|answer| sanitize_name(&answer))
            .filter(|name| !name.is_empty());

        let Some(name) = name else {
            progress.skipped(step.current, step.total, &file.name, "no label");
            result.skip_unlabeled();
            continue;
        };

        let request = RenameRequest::new(&file.path, name, target_dir);
        submit(renamer, &request, step, progress, &mut result)?;
    }

    progress.batch_complete(result.len(), result.dry_run);

    Ok(result)
}

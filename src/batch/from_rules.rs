use std::path::Path;
use tracing::{debug, warn};

use super::{submit, Step};
use crate::error::AppError;
use crate::progress::Progress;
use crate::rename::{RenameRequest, RenameResult, Renamer};
use crate::rules::{DatasetRule, RuleOutcome};
use crate::scanner::scan_files;

/// Rename every file in `dir` that the rule covers
pub fn rename_with_rule(
    dir: &Path,
    target_dir: &Path,
    rule: &DatasetRule,
    renamer: &mut Renamer,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    renamer.check_target(target_dir)?;

    let files = scan_files(dir)?;
    let mut result = RenameResult::new("Dataset rule", renamer.is_dry_run());
    let total = files.len();

    progress.batch_start(total, "Applying rule");

    for (i, file) in files.iter().enumerate() {
        let step = Step {
            current: i + 1,
            total,
        };

        match rule.apply(file) {
            RuleOutcome::NotApplicable => {
                debug!(file = %file.name, "Rule does not apply");
            }
            RuleOutcome::Invalid(reason) => {
                warn!("Skipping {}: {}", file.name, reason);
                progress.skipped(step.current, step.total, &file.name, &reason);
                result.skip_unlabeled();
            }
            RuleOutcome::Rename { name, extension } => {
                let mut request = RenameRequest::new(&file.path, name, target_dir);
                if let Some(ext) = extension {
                    request = request.with_extension(ext);
                }
                submit(renamer, &request, step, progress, &mut result)?;
            }
        }
    }

    progress.batch_complete(result.len(), result.dry_run);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::test_support::{names_in, touch};
    use crate::rename::CollisionStyle;
    use crate::rules::preset;
    use tempfile::TempDir;

    fn apply(dir: &Path, rule: &DatasetRule, dry_run: bool) -> RenameResult {
        let mut renamer = Renamer::new(CollisionStyle::Underscore, dry_run);
        rename_with_rule(dir, dir, rule, &mut renamer, &mut Progress::silent()).unwrap()
    }

    #[test]
    fn test_delay_minutes_in_place() {
        let dir = TempDir::new().unwrap();
        for name in ["ED001.mp3", "ED005.mp3", "EDXX.mp3", "readme.txt"] {
            touch(dir.path(), name);
        }

        let result = apply(dir.path(), &preset("delay-minutes").unwrap(), false);

        assert_eq!(result.len(), 2);
        assert_eq!(result.skipped_unlabeled, 1);
        assert_eq!(
            names_in(dir.path()),
            vec!["1 minute.mp3", "5 minutes.mp3", "EDXX.mp3", "readme.txt"]
        );
    }

    #[test]
    fn test_rerun_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "ece04.mp3");

        let rule = preset("coaches").unwrap();
        apply(dir.path(), &rule, false);
        let second = apply(dir.path(), &rule, false);

        assert!(second.is_empty());
        assert_eq!(names_in(dir.path()), vec!["4 carriages.mp3"]);
    }

    #[test]
    fn test_station_codes_already_named_is_unchanged() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "E1pad.MP3");

        let rule = DatasetRule {
            strip_prefixes: vec!["E1".to_string()],
            case: crate::rename::CaseStyle::Upper,
            lowercase_extension: true,
            ..Default::default()
        };

        apply(dir.path(), &rule, false);
        let second = apply(dir.path(), &rule, false);

        assert_eq!(names_in(dir.path()), vec!["PAD.mp3"]);
        assert!(second.is_empty());
        assert_eq!(second.unchanged, 1);
    }

    #[test]
    fn test_collapsing_names_get_counters() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "EZH07.mp3");
        touch(dir.path(), "07.mp3");

        let result = apply(dir.path(), &preset("time-hours").unwrap(), false);

        assert_eq!(result.disambiguated_count(), 1);
        assert_eq!(names_in(dir.path()), vec!["07.mp3", "07_1.mp3"]);
    }

    #[test]
    fn test_dry_run_leaves_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "EZM30.mp3");

        let result = apply(dir.path(), &preset("time-minutes").unwrap(), true);

        assert_eq!(result.operations[0].destination_name, "30.mp3");
        assert_eq!(names_in(dir.path()), vec!["EZM30.mp3"]);
    }
}

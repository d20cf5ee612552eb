use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use super::{submit, Step};
use crate::error::AppError;
use crate::labeler::{LabelError, LabelItem, Labeler};
use crate::progress::Progress;
use crate::rename::{
    CollisionStyle, RenameError, RenameRequest, RenameResult, Renamer, TransferMode,
};
use crate::scanner::{scan_files, FileEntry};

/// Answer that switches to the other take in pair mode
const OTHER_TAKE: &str = "o";

/// One answer key and the subdirectory it files into, written `key=subdir`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub directory: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid choice '{0}', expected KEY=SUBDIR")]
pub struct CategoryParseError(String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, directory) = s
            .split_once('=')
            .ok_or_else(|| CategoryParseError(s.to_string()))?;
        let (key, directory) = (key.trim(), directory.trim());

        if key.is_empty() || directory.is_empty() || directory.contains(['/', '\\']) {
            return Err(CategoryParseError(s.to_string()));
        }

        Ok(Self {
            key: key.to_string(),
            directory: directory.to_string(),
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.directory)
    }
}

/// `h=high l=low m=mid`
pub fn default_categories() -> Vec<Category> {
    [("h", "high"), ("l", "low"), ("m", "mid")]
        .into_iter()
        .map(|(key, directory)| Category {
            key: key.to_string(),
            directory: directory.to_string(),
        })
        .collect()
}

/// `h=high l=low`
pub fn default_pair_categories() -> Vec<Category> {
    default_categories().into_iter().take(2).collect()
}

fn check_subdirectories(dir: &Path, categories: &[Category]) -> Result<(), RenameError> {
    for category in categories {
        let target = dir.join(&category.directory);
        if !target.is_dir() {
            return Err(RenameError::MissingTargetDirectory(target));
        }
    }
    Ok(())
}

fn choice_list(categories: &[Category]) -> String {
    categories
        .iter()
        .map(Category::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn find_category<'a>(categories: &'a [Category], answer: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.key.eq_ignore_ascii_case(answer))
}

/// Copy each file of `dir` into the subdirectory the operator picks.
///
/// Unknown answers are asked again; a blank answer skips the file. Files
/// keep their names, with a counter when the subdirectory already has one.
pub fn sort_directory(
    dir: &Path,
    categories: &[Category],
    labeler: &mut dyn Labeler,
    style: CollisionStyle,
    dry_run: bool,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    let files = scan_files(dir)?;
    check_subdirectories(dir, categories)?;

    let mut renamer = Renamer::new(style, dry_run).with_mode(TransferMode::Copy);
    let mut result = RenameResult::new("Categorisation", dry_run);
    let total = files.len();
    let choices = choice_list(categories);

    progress.batch_start(total, "Sorting files");

    for (i, file) in files.iter().enumerate() {
        let step = Step {
            current: i + 1,
            total,
        };
        let item = LabelItem::new(format!("Category for {} [{}]", file.name, choices))
            .with_audio(&file.path);

        let chosen = loop {
            let Some(answer) = labeler.present_for_labeling(&item)? else {
                break None;
            };
            match find_category(categories, &answer) {
                Some(category) => break Some(category),
                None => progress.warn(&format!("'{}' is not one of: {}", answer, choices)),
            }
        };

        let Some(category) = chosen else {
            progress.skipped(step.current, step.total, &file.name, "no category");
            result.skip_unlabeled();
            continue;
        };

        debug!(file = %file.name, category = %category.directory, "Sorting");
        let request = RenameRequest::keeping_name(&file.path, dir.join(&category.directory));
        submit(&mut renamer, &request, step, progress, &mut result)?;
    }

    progress.batch_complete(result.len(), dry_run);

    Ok(result)
}

/// Two recordings of the same announcement, `X_0` and `X_1`
#[derive(Debug, Clone)]
pub struct TakePair {
    pub base: String,
    pub takes: [FileEntry; 2],
}

fn take_of(file: &FileEntry) -> Option<(&str, usize)> {
    let stem = file.stem();
    if let Some(base) = stem.strip_suffix("_0") {
        Some((base, 0))
    } else {
        stem.strip_suffix("_1").map(|base| (base, 1))
    }
}

/// Group `X_0`/`X_1` files with the same extension into pairs.
///
/// Returns the complete pairs and the takes whose partner is missing.
/// Files without a take suffix are ignored.
pub fn pair_takes(files: Vec<FileEntry>) -> (Vec<TakePair>, Vec<FileEntry>) {
    let mut groups: BTreeMap<(String, String), [Option<FileEntry>; 2]> = BTreeMap::new();

    for file in files {
        let Some((base, take)) = take_of(&file) else {
            continue;
        };
        let key = (
            base.to_string(),
            file.extension().unwrap_or_default().to_string(),
        );
        groups.entry(key).or_default()[take] = Some(file);
    }

    let mut pairs = Vec::new();
    let mut unpaired = Vec::new();

    for ((base, _), takes) in groups {
        match takes {
            [Some(first), Some(second)] => pairs.push(TakePair {
                base,
                takes: [first, second],
            }),
            [Some(single), None] | [None, Some(single)] => unpaired.push(single),
            [None, None] => {}
        }
    }

    (pairs, unpaired)
}

/// Ask which of the two categories the playing take belongs to.
/// `o` switches the playing take; `None` means skip the pair.
fn ask_pair(
    pair: &TakePair,
    categories: &[Category],
    choices: &str,
    labeler: &mut dyn Labeler,
    progress: &mut Progress,
) -> Result<Option<(usize, usize)>, LabelError> {
    let mut playing = 0;

    loop {
        let take = &pair.takes[playing];
        let item = LabelItem::new(format!(
            "Category for {} [{}] or {} for the other take (playing {})",
            pair.base, choices, OTHER_TAKE, take.name
        ))
        .with_audio(&take.path);

        let Some(answer) = labeler.present_for_labeling(&item)? else {
            return Ok(None);
        };

        if answer.eq_ignore_ascii_case(OTHER_TAKE) {
            playing = 1 - playing;
            continue;
        }

        match categories
            .iter()
            .position(|c| c.key.eq_ignore_ascii_case(&answer))
        {
            Some(chosen) => return Ok(Some((playing, chosen))),
            None => progress.warn(&format!(
                "'{}' is not one of: {} (or {})",
                answer, choices, OTHER_TAKE
            )),
        }
    }
}

/// Sort `X_0`/`X_1` take pairs with one answer per pair.
///
/// The take that was playing goes to the chosen category and its partner to
/// the other one. Takes without a partner are reported and left alone.
pub fn sort_pairs(
    dir: &Path,
    categories: &[Category],
    labeler: &mut dyn Labeler,
    style: CollisionStyle,
    dry_run: bool,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    if categories.len() != 2 {
        return Err(AppError::InvalidArguments(format!(
            "pair sorting needs exactly two choices, got {}",
            categories.len()
        )));
    }
    if find_category(categories, OTHER_TAKE).is_some() {
        return Err(AppError::InvalidArguments(format!(
            "'{}' is reserved for switching takes",
            OTHER_TAKE
        )));
    }

    let files = scan_files(dir)?;
    check_subdirectories(dir, categories)?;

    let (pairs, unpaired) = pair_takes(files);

    if !unpaired.is_empty() {
        warn!("{} takes have no partner", unpaired.len());
        progress.warn("Some recordings have only one take:");
        for file in &unpaired {
            progress.warn(&format!("  {}", file.name));
        }
    }

    let mut renamer = Renamer::new(style, dry_run).with_mode(TransferMode::Copy);
    let mut result = RenameResult::new("Take pairs", dry_run);
    let total = pairs.len();
    let choices = choice_list(categories);

    progress.batch_start(total, "Sorting take pairs");

    for (i, pair) in pairs.iter().enumerate() {
        let step = Step {
            current: i + 1,
            total,
        };

        let Some((playing, chosen)) = ask_pair(pair, categories, &choices, labeler, progress)?
        else {
            progress.skipped(step.current, step.total, &pair.base, "no category");
            result.skip_unlabeled();
            continue;
        };

        let placements = [
            (&pair.takes[playing], &categories[chosen]),
            (&pair.takes[1 - playing], &categories[1 - chosen]),
        ];

        for (take, category) in placements {
            debug!(file = %take.name, category = %category.directory, "Sorting take");
            let request = RenameRequest::keeping_name(&take.path, dir.join(&category.directory));
            submit(&mut renamer, &request, step, progress, &mut result)?;
        }
    }

    progress.batch_complete(result.len(), dry_run);

    Ok(result)
}

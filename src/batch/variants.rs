use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use super::{submit, Step};
use crate::error::AppError;
use crate::labeler::{LabelItem, Labeler};
use crate::progress::Progress;
use crate::rename::{sanitize_name, RenameRequest, RenameResult, Renamer};
use crate::scanner::scan_files;

/// One take of a variant group, written `TEMPLATE=SUBDIR`.
///
/// The template is a file stem around a `{n}` placeholder with an optional
/// offset, e.g. `{n}b=and`, `{n}=e` or `{n-1000}=m`. All members of a group
/// share the number `n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    prefix: String,
    offset: i64,
    suffix: String,
    pub directory: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid variant '{0}', expected TEMPLATE=SUBDIR with {{n}} in the template")]
pub struct VariantParseError(String);

impl FromStr for Variant {
    type Err = VariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VariantParseError(s.to_string());

        let (template, directory) = s.split_once('=').ok_or_else(invalid)?;
        let directory = directory.trim();
        if directory.is_empty() || directory.contains(['/', '\\']) {
            return Err(invalid());
        }

        let start = template.find("{n").ok_or_else(invalid)?;
        let end = start + template[start..].find('}').ok_or_else(invalid)?;
        let (prefix, suffix) = (&template[..start], &template[end + 1..]);

        let offset = match &template[start + 2..end] {
            "" => 0,
            raw => raw.parse::<i64>().map_err(|_| invalid())?,
        };

        if [prefix, suffix]
            .iter()
            .any(|part| part.contains(['{', '}', '/', '\\']))
        {
            return Err(invalid());
        }

        Ok(Self {
            prefix: prefix.to_string(),
            offset,
            suffix: suffix.to_string(),
            directory: directory.to_string(),
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let placeholder = match self.offset {
            0 => "{n}".to_string(),
            offset => format!("{{n{:+}}}", offset),
        };
        write!(
            f,
            "{}{}{}={}",
            self.prefix, placeholder, self.suffix, self.directory
        )
    }
}

impl Variant {
    /// Group number and digit width of a stem that fits this template
    pub fn number_in(&self, stem: &str) -> Option<(i64, usize)> {
        let digits = stem
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let value = digits.parse::<i64>().ok()?;
        Some((value - self.offset, digits.len()))
    }

    /// Stem of this take for group `number`, zero-padded to `width`
    pub fn stem_for(&self, number: i64, width: usize) -> Option<String> {
        let value = number.checked_add(self.offset).filter(|v| *v >= 0)?;
        Some(format!(
            "{}{:0width$}{}",
            self.prefix,
            value,
            self.suffix,
            width = width
        ))
    }
}

/// Name each variant group with one answer.
///
/// Files matching the first variant lead a group; the operator hears the
/// lead and every take of the group moves into its variant's subdirectory of
/// `target_dir` under that name. Missing takes are skipped like any missing
/// source. A blank answer leaves the whole group alone.
pub fn label_variant_groups(
    dir: &Path,
    target_dir: &Path,
    variants: &[Variant],
    extensions: &[String],
    labeler: &mut dyn Labeler,
    renamer: &mut Renamer,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    let Some(lead) = variants.first() else {
        return Err(AppError::InvalidArguments(
            "at least one variant is required".to_string(),
        ));
    };

    for variant in variants {
        renamer.check_target(&target_dir.join(&variant.directory))?;
    }

    let groups: Vec<_> = scan_files(dir)?
        .into_iter()
        .filter(|f| f.has_extension(extensions))
        .filter_map(|f| lead.number_in(f.stem()).map(|(n, width)| (f, n, width)))
        .collect();

    let mut result = RenameResult::new("Variant groups", renamer.is_dry_run());
    let total = groups.len();

    progress.batch_start(total, "Labeling variant groups");

    for (i, (file, number, width)) in groups.iter().enumerate() {
        let step = Step {
            current: i + 1,
            total,
        };

        let item = LabelItem::new(format!("Name group ({})", file.name)).with_audio(&file.path);
        let name = labeler
            .present_for_labeling(&item)?
            .map(|answer| sanitize_name(&answer))
            .filter(|name| !name.is_empty());

        let Some(name) = name else {
            progress.skipped(step.current, step.total, &file.name, "no label");
            result.skip_unlabeled();
            continue;
        };

        for variant in variants {
            let Some(stem) = variant.stem_for(*number, *width) else {
                debug!(group = number, variant = %variant, "No take for this group");
                continue;
            };
            let source = match file.extension() {
                Some(ext) => dir.join(format!("{}.{}", stem, ext)),
                None => dir.join(&stem),
            };

            let request =
                RenameRequest::new(source, name.as_str(), target_dir.join(&variant.directory));
            submit(renamer, &request, step, progress, &mut result)?;
        }
    }

    progress.batch_complete(result.len(), result.dry_run);

    Ok(result)
}

use std::path::PathBuf;
use tracing::{info, warn};

use super::{submit, Step};
use crate::error::AppError;
use crate::labeler::{LabelItem, Labeler};
use crate::lookup::{CodeResolver, Resolution, StationLookup};
use crate::metadata::MetadataRow;
use crate::progress::Progress;
use crate::rename::{
    build_desired_name, CaseStyle, NamePattern, RenameOutcome, RenameRequest, RenameResult,
    Renamer,
};

/// How metadata rows map onto files
#[derive(Debug, Clone)]
pub struct MetadataOptions {
    /// Where the files named in the metadata live
    pub source_dir: PathBuf,
    /// Where renamed files go
    pub target_dir: PathBuf,
    pub pattern: NamePattern,
    pub case: CaseStyle,
    /// Appended to the file column when it holds bare stems
    pub source_extension: Option<String>,
}

impl MetadataOptions {
    pub fn new(source_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            pattern: NamePattern::default(),
            case: CaseStyle::default(),
            source_extension: None,
        }
    }

    fn source_path(&self, row: &MetadataRow) -> PathBuf {
        let file = row.file.trim();
        match &self.source_extension {
            Some(ext) => self
                .source_dir
                .join(format!("{}.{}", file, ext.trim_start_matches('.'))),
            None => self.source_dir.join(file),
        }
    }
}

/// Rename one file per metadata row.
///
/// With a resolver, the label is a station name and is replaced by its code.
/// Rows without a usable label go to the labeler; a blank answer skips them.
pub fn rename_from_metadata<L: StationLookup>(
    rows: &[MetadataRow],
    options: &MetadataOptions,
    mut resolver: Option<&mut CodeResolver<L>>,
    labeler: &mut dyn Labeler,
    renamer: &mut Renamer,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    renamer.check_target(&options.target_dir)?;

    let mut result = RenameResult::new("CSV metadata", renamer.is_dry_run());
    let total = rows.len();

    progress.batch_start(total, "Renaming from metadata");

    for (i, row) in rows.iter().enumerate() {
        let step = Step {
            current: i + 1,
            total,
        };
        let source_path = options.source_path(row);

        // Missing sources never reach the lookup or the operator
        if !renamer.source_available(&source_path) {
            result.record(RenameOutcome::SkippedMissingSource { path: source_path });
            continue;
        }

        let mut label = row.label.trim().to_string();

        if label.is_empty() {
            warn!("Line {} has no label", row.line);
            let item = LabelItem::new(format!("Name for {} (line {})", row.file, row.line))
                .with_audio(&source_path);
            match labeler.present_for_labeling(&item)? {
                Some(answer) => label = answer,
                None => {
                    progress.skipped(step.current, step.total, &row.file, "no label");
                    result.skip_unlabeled();
                    continue;
                }
            }
        }

        if let Some(resolver) = resolver.as_deref_mut() {
            match resolver.resolve(&label, labeler)? {
                Resolution::Code(code) => {
                    progress.resolved(&label, &code);
                    label = code;
                }
                Resolution::Skip => {
                    info!("No code for '{}', skipping line {}", label, row.line);
                    progress.skipped(step.current, step.total, &row.file, "no station code");
                    result.skip_unlabeled();
                    continue;
                }
            }
        }

        let desired = build_desired_name(options.pattern, &row.id, &label, options.case);
        if desired.is_empty() {
            progress.warn(&format!("line {} produces an empty name", row.line));
            result.skip_unlabeled();
            continue;
        }

        let request = RenameRequest::new(source_path, desired, &options.target_dir);
        submit(renamer, &request, step, progress, &mut result)?;
    }

    progress.batch_complete(result.len(), result.dry_run);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::test_support::{names_in, touch};
    use crate::cache::CodeCache;
    use crate::labeler::ScriptedLabeler;
    use crate::lookup::{LookupError, StationRecord};
    use crate::metadata::{read_metadata_from, MetadataSchema};
    use crate::rename::CollisionStyle;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct FakeLookup(HashMap<String, Vec<StationRecord>>);

    impl FakeLookup {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            let mut map: HashMap<String, Vec<StationRecord>> = HashMap::new();
            for (query, code, station) in entries {
                map.entry(query.to_string()).or_default().push(StationRecord {
                    crs_code: code.to_string(),
                    station_name: station.to_string(),
                });
            }
            Self(map)
        }
    }

    impl StationLookup for FakeLookup {
        fn lookup(&self, name: &str) -> Result<Vec<StationRecord>, LookupError> {
            Ok(self.0.get(name).cloned().unwrap_or_default())
        }
    }

    fn rows(csv: &str, schema: &MetadataSchema) -> Vec<MetadataRow> {
        read_metadata_from(csv.as_bytes(), schema).unwrap()
    }

    fn run(
        rows: &[MetadataRow],
        options: &MetadataOptions,
        resolver: Option<&mut CodeResolver<FakeLookup>>,
        labeler: &mut ScriptedLabeler,
        dry_run: bool,
    ) -> Result<RenameResult, AppError> {
        let mut renamer = Renamer::new(CollisionStyle::Underscore, dry_run);
        let mut progress = Progress::silent();
        rename_from_metadata(rows, options, resolver, labeler, &mut renamer, &mut progress)
    }

    #[test]
    fn test_renames_rows_with_collisions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "0001.wav");
        touch(dir.path(), "0002.wav");
        touch(dir.path(), "0003.wav");

        let rows = rows(
            "ID,File,Transcription\n\
             1,0001.wav,platform one\n\
             2,0002.wav,platform one\n\
             3,0003.wav,Platform: two\n",
            &MetadataSchema::default(),
        );
        let options = MetadataOptions::new(dir.path(), dir.path());
        let mut labeler = ScriptedLabeler::default();

        let result = run(&rows, &options, None, &mut labeler, false).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.disambiguated_count(), 1);
        assert_eq!(
            names_in(dir.path()),
            vec!["Platform- two.wav", "platform one.wav", "platform one_1.wav"]
        );
    }

    #[test]
    fn test_missing_sources_are_skipped_quietly() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "0002.wav");

        let rows = rows(
            "1,0001.wav,\n2,0002.wav,two\n",
            &MetadataSchema {
                has_headers: false,
                ..Default::default()
            },
        );
        let options = MetadataOptions::new(dir.path(), dir.path());
        let mut labeler = ScriptedLabeler::default();

        let result = run(&rows, &options, None, &mut labeler, false).unwrap();

        assert_eq!(result.skipped_missing, 1);
        assert!(labeler.asked().is_empty());
        assert_eq!(names_in(dir.path()), vec!["two.wav"]);
    }

    #[test]
    fn test_empty_label_asks_operator() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "0001.wav");
        touch(dir.path(), "0002.wav");

        let rows = rows(
            "1,0001.wav,\n2,0002.wav,\n",
            &MetadataSchema {
                has_headers: false,
                ..Default::default()
            },
        );
        let options = MetadataOptions::new(dir.path(), dir.path());
        let mut labeler = ScriptedLabeler::new(["mind the gap", ""]);

        let result = run(&rows, &options, None, &mut labeler, false).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.skipped_unlabeled, 1);
        assert_eq!(labeler.asked()[0].audio, Some(dir.path().join("0001.wav")));
        assert_eq!(names_in(dir.path()), vec!["0002.wav", "mind the gap.wav"]);
    }

    #[test]
    fn test_station_lookup_single_match_without_prompt() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(source.path(), "17.wav");

        let rows = rows(
            "17,17,Birmingham New Street\n",
            &MetadataSchema {
                has_headers: false,
                ..Default::default()
            },
        );
        let mut options = MetadataOptions::new(source.path(), target.path());
        options.pattern = NamePattern::IdLabel;
        options.case = CaseStyle::Lower;
        options.source_extension = Some("wav".to_string());

        let lookup = FakeLookup::new(&[(
            "birmingham new street",
            "BHM",
            "Birmingham New Street",
        )]);
        let mut resolver = CodeResolver::new(lookup, CodeCache::in_memory());
        let mut labeler = ScriptedLabeler::default();

        let result = run(&rows, &options, Some(&mut resolver), &mut labeler, false).unwrap();

        assert_eq!(result.len(), 1);
        assert!(labeler.asked().is_empty());
        assert_eq!(names_in(target.path()), vec!["17_bhm.wav"]);
        assert!(names_in(source.path()).is_empty());
        assert_eq!(
            resolver.into_cache().get("Birmingham New Street"),
            Some("BHM")
        );
    }

    #[test]
    fn test_station_lookup_zero_matches_blank_answer_skips_row() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "1.wav");

        let rows = rows(
            "1,1.wav,Atlantis Parkway\n",
            &MetadataSchema {
                has_headers: false,
                ..Default::default()
            },
        );
        let options = MetadataOptions::new(dir.path(), dir.path());
        let mut resolver = CodeResolver::new(FakeLookup::new(&[]), CodeCache::in_memory());
        let mut labeler = ScriptedLabeler::new([""]);

        let result = run(&rows, &options, Some(&mut resolver), &mut labeler, false).unwrap();

        assert!(result.is_empty());
        assert_eq!(result.skipped_unlabeled, 1);
        assert_eq!(labeler.asked()[0].prompt, "Enter CRS for Atlantis Parkway");
        assert_eq!(names_in(dir.path()), vec!["1.wav"]);
    }

    #[test]
    fn test_dry_run_predicts_real_run() {
        let csv = "1,a.wav,same\n2,b.wav,same\n3,c.wav,same\n";
        let schema = MetadataSchema {
            has_headers: false,
            ..Default::default()
        };
        let rows = rows(csv, &schema);

        let dir = TempDir::new().unwrap();
        for name in ["a.wav", "b.wav", "c.wav", "same.wav"] {
            touch(dir.path(), name);
        }
        let options = MetadataOptions::new(dir.path(), dir.path());

        let planned = run(&rows, &options, None, &mut ScriptedLabeler::default(), true).unwrap();
        assert_eq!(
            names_in(dir.path()),
            vec!["a.wav", "b.wav", "c.wav", "same.wav"]
        );

        let applied = run(&rows, &options, None, &mut ScriptedLabeler::default(), false).unwrap();

        let planned: Vec<_> = planned
            .operations
            .iter()
            .map(|op| op.destination_name.clone())
            .collect();
        let applied: Vec<_> = applied
            .operations
            .iter()
            .map(|op| op.destination_name.clone())
            .collect();
        assert_eq!(planned, vec!["same_1.wav", "same_2.wav", "same_3.wav"]);
        assert_eq!(planned, applied);
    }

    #[test]
    fn test_missing_target_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "0001.wav");

        let rows = rows("1,0001.wav,one\n", &MetadataSchema {
            has_headers: false,
            ..Default::default()
        });
        let options = MetadataOptions::new(dir.path(), dir.path().join("out"));

        let result = run(&rows, &options, None, &mut ScriptedLabeler::default(), false);

        assert!(matches!(result, Err(AppError::MissingTargetDirectory { .. })));
        assert_eq!(names_in(dir.path()), vec!["0001.wav"]);
    }
}

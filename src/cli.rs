use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::batch::{Category, Variant};
use crate::metadata::ColumnRef;
use crate::rename::{CaseStyle, CollisionStyle, NamePattern};

#[derive(Parser, Debug)]
#[command(name = "rail-audio-rename")]
#[command(author, version, long_about = None)]
#[command(about = "Rename rail announcement audio files from metadata without overwriting anything")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Simulate changes without modifying the filesystem
    #[arg(short, long, global = true)]
    pub dry: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// How the counter is attached when a name is taken
    #[arg(long, value_enum, default_value_t = CollisionStyle::Underscore, global = true)]
    pub collision_style: CollisionStyle,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rename files named in a CSV metadata file
    Csv(CsvArgs),
    /// Play each file and ask for its name
    Label(LabelArgs),
    /// Rename files by stripping dataset prefixes and suffixes
    Strip(StripArgs),
    /// Copy each file into a category subdirectory chosen by the operator
    Sort(SortArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CsvArgs {
    /// CSV metadata file
    pub metadata: PathBuf,

    /// Directory holding the files the metadata refers to
    pub source_dir: PathBuf,

    /// Directory renamed files go to (must exist; defaults to SOURCE_DIR)
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// The metadata file has no header row
    #[arg(long)]
    pub no_headers: bool,

    /// Column holding the row ID (header name or zero-based index)
    #[arg(long, default_value = "0", value_name = "COLUMN")]
    pub id_column: ColumnRef,

    /// Column holding the source file name
    #[arg(long, default_value = "1", value_name = "COLUMN")]
    pub file_column: ColumnRef,

    /// Column holding the label (transcription or station name)
    #[arg(long, default_value = "2", value_name = "COLUMN")]
    pub label_column: ColumnRef,

    /// Column used with --category to select rows
    #[arg(long, value_name = "COLUMN")]
    pub category_column: Option<ColumnRef>,

    /// Only rename rows whose category matches (case-insensitive)
    #[arg(long, requires = "category_column")]
    pub category: Option<String>,

    /// Extension appended to the file column when it holds bare names
    #[arg(long, value_name = "EXT")]
    pub source_extension: Option<String>,

    /// How a row becomes a file name
    #[arg(long, value_enum, default_value_t = NamePattern::Label)]
    pub name_pattern: NamePattern,

    /// Case applied to the label
    #[arg(long, value_enum, default_value_t = CaseStyle::Keep)]
    pub case: CaseStyle,

    /// Treat labels as station names and rename to their CRS codes
    #[arg(long)]
    pub lookup_crs: bool,

    /// Code cache file (defaults to the user cache directory)
    #[arg(long, value_name = "FILE", requires = "lookup_crs")]
    pub crs_cache: Option<PathBuf>,

    /// Keep the code cache in memory only
    #[arg(long, conflicts_with = "crs_cache")]
    pub no_cache: bool,

    /// Cache expiration in days (0 = never)
    #[arg(short, long, default_value = "30")]
    pub cache_expiry: u32,

    /// Command used to play audio before prompting [env: RAIL_AUDIO_PLAYER]
    #[arg(long, value_name = "COMMAND")]
    pub player: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct LabelArgs {
    /// Directory of files to label
    pub dir: PathBuf,

    /// Directory labeled files go to (must exist; defaults to DIR)
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Only offer files with this extension (repeatable)
    #[arg(short, long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Name groups of takes at once, e.g. --variant '{n}b=and' --variant '{n}=e'
    /// (repeatable; the first variant picks the file that is played)
    #[arg(long = "variant", value_name = "TEMPLATE=SUBDIR")]
    pub variants: Vec<Variant>,

    /// Command used to play audio before prompting [env: RAIL_AUDIO_PLAYER]
    #[arg(long, value_name = "COMMAND")]
    pub player: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct StripArgs {
    /// Directory of files to rename
    pub dir: PathBuf,

    /// Built-in rule: delay-minutes, coaches, time-hours, time-minutes, station-codes,
    /// station-codes-low
    #[arg(short, long, required_unless_present = "rules", conflicts_with = "rules")]
    pub preset: Option<String>,

    /// TOML rule file
    #[arg(short, long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Directory renamed files go to (must exist; defaults to DIR)
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct SortArgs {
    /// Directory of files to sort; category subdirectories live inside it
    pub dir: PathBuf,

    /// Answer key and subdirectory, e.g. h=high (repeatable; default h=high l=low m=mid)
    #[arg(short, long = "choice", value_name = "KEY=SUBDIR")]
    pub choices: Vec<Category>,

    /// Sort NAME_0/NAME_1 take pairs with one answer (default h=high l=low)
    #[arg(long)]
    pub pairs: bool,

    /// Command used to play audio before prompting [env: RAIL_AUDIO_PLAYER]
    #[arg(long, value_name = "COMMAND")]
    pub player: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_csv_defaults() {
        let args = Args::try_parse_from(["rail-audio-rename", "csv", "meta.csv", "audio"]).unwrap();

        let Command::Csv(csv) = args.command else {
            panic!("expected csv");
        };
        assert_eq!(csv.id_column, ColumnRef::Index(0));
        assert_eq!(csv.label_column, ColumnRef::Index(2));
        assert_eq!(csv.name_pattern, NamePattern::Label);
        assert!(!args.dry);
        assert_eq!(args.collision_style, CollisionStyle::Underscore);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "rail-audio-rename",
            "label",
            "audio",
            "--dry",
            "-vv",
            "--collision-style",
            "space",
        ])
        .unwrap();

        assert!(args.dry);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.collision_style, CollisionStyle::Space);
    }

    #[test]
    fn test_csv_named_columns() {
        let args = Args::try_parse_from([
            "rail-audio-rename",
            "csv",
            "meta.csv",
            "audio",
            "--label-column",
            "Transcription",
            "--category-column",
            "Category",
            "--category",
            "Time",
        ])
        .unwrap();

        let Command::Csv(csv) = args.command else {
            panic!("expected csv");
        };
        assert_eq!(
            csv.label_column,
            ColumnRef::Header("Transcription".to_string())
        );
        assert_eq!(csv.category.as_deref(), Some("Time"));
    }

    #[test]
    fn test_category_requires_column() {
        let result = Args::try_parse_from([
            "rail-audio-rename",
            "csv",
            "meta.csv",
            "audio",
            "--category",
            "Time",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_strip_requires_preset_or_rules() {
        assert!(Args::try_parse_from(["rail-audio-rename", "strip", "audio"]).is_err());
        assert!(Args::try_parse_from([
            "rail-audio-rename",
            "strip",
            "audio",
            "--preset",
            "coaches",
            "--rules",
            "r.toml"
        ])
        .is_err());
    }

    #[test]
    fn test_sort_choices() {
        let args = Args::try_parse_from([
            "rail-audio-rename",
            "sort",
            "audio",
            "--choice",
            "u=urgent",
            "-c",
            "n=normal",
        ])
        .unwrap();

        let Command::Sort(sort) = args.command else {
            panic!("expected sort");
        };
        assert_eq!(sort.choices.len(), 2);
        assert_eq!(sort.choices[1].directory, "normal");
    }

    #[test]
    fn test_label_variants_and_pairs() {
        let args = Args::try_parse_from([
            "rail-audio-rename",
            "label",
            "en/station",
            "--variant",
            "{n}b=and",
            "--variant",
            "{n-1000}=m",
        ])
        .unwrap();

        let Command::Label(label) = args.command else {
            panic!("expected label");
        };
        assert_eq!(label.variants.len(), 2);
        assert_eq!(label.variants[1].directory, "m");

        assert!(Args::try_parse_from(["rail-audio-rename", "label", "d", "--variant", "and"]).is_err());

        let args = Args::try_parse_from(["rail-audio-rename", "sort", "audio", "--pairs"]).unwrap();
        let Command::Sort(sort) = args.command else {
            panic!("expected sort");
        };
        assert!(sort.pairs);
    }
}

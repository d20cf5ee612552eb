use clap::Parser;
use rail_audio_rename::batch::{
    default_categories, default_pair_categories, label_directory, label_variant_groups,
    rename_from_metadata, rename_with_rule, sort_directory, sort_pairs, MetadataOptions,
};
use rail_audio_rename::cache::{CacheConfig, CodeCache};
use rail_audio_rename::cli::{Args, Command, CsvArgs, LabelArgs, SortArgs, StripArgs};
use rail_audio_rename::error::AppError;
use rail_audio_rename::labeler::{Player, PromptLabeler, ENV_PLAYER};
use rail_audio_rename::logging;
use rail_audio_rename::lookup::{config_from_env, CodeResolver, CrsClient};
use rail_audio_rename::metadata::{filter_category, read_metadata, MetadataSchema};
use rail_audio_rename::output::{display_dry_run, display_execution_result};
use rail_audio_rename::progress::Progress;
use rail_audio_rename::rename::{CollisionStyle, RenameResult, Renamer};
use rail_audio_rename::rules::{load_rule_file, preset};
use rail_audio_rename::scanner::ensure_directory;
use tracing::{debug, error, info, warn};

fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(args.verbose);

    debug!("Environment loaded");

    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("\nError: {}", e.detailed_message());
        std::process::exit(e.exit_code().into());
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut progress = Progress::new(args.verbose > 0);
    let style = args.collision_style;
    let dry_run = args.dry;

    if dry_run {
        info!("Dry run: no files will be touched");
    }

    let result = match args.command {
        Command::Csv(cmd) => run_csv(cmd, style, dry_run, &mut progress)?,
        Command::Label(cmd) => run_label(cmd, style, dry_run, &mut progress)?,
        Command::Strip(cmd) => run_strip(cmd, style, dry_run, &mut progress)?,
        Command::Sort(cmd) => run_sort(cmd, style, dry_run, &mut progress)?,
    };

    // Display detailed results
    if dry_run {
        display_dry_run(&result, &mut std::io::stdout())
            .map_err(|e| AppError::Other(format!("Failed to display output: {}", e)))?;
    } else {
        display_execution_result(&result, &mut std::io::stdout())
            .map_err(|e| AppError::Other(format!("Failed to display output: {}", e)))?;
    }

    Ok(())
}

/// `--player` wins over `RAIL_AUDIO_PLAYER`
fn player(flag: Option<String>) -> Option<Player> {
    let command = flag.or_else(|| std::env::var(ENV_PLAYER).ok())?;
    Player::from_command_line(&command)
}

fn run_csv(
    cmd: CsvArgs,
    style: CollisionStyle,
    dry_run: bool,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    let schema = MetadataSchema {
        has_headers: !cmd.no_headers,
        id: cmd.id_column,
        file: cmd.file_column,
        label: cmd.label_column,
        category: cmd.category_column,
    };

    let mut rows = read_metadata(&cmd.metadata, &schema)?;
    if let Some(category) = &cmd.category {
        rows = filter_category(rows, category);
        info!("{} rows in category '{}'", rows.len(), category);
    }

    ensure_directory(&cmd.source_dir)?;
    let target_dir = cmd.target.unwrap_or_else(|| cmd.source_dir.clone());

    let options = MetadataOptions {
        source_dir: cmd.source_dir,
        target_dir,
        pattern: cmd.name_pattern,
        case: cmd.case,
        source_extension: cmd.source_extension,
    };

    let mut resolver = if cmd.lookup_crs {
        let client = CrsClient::new(config_from_env())?;
        let config = if cmd.no_cache {
            CacheConfig::in_memory()
        } else {
            match &cmd.crs_cache {
                Some(path) => CacheConfig::at_path(path, cmd.cache_expiry),
                None => CacheConfig::for_user_home(cmd.cache_expiry).unwrap_or_else(|| {
                    warn!("No user cache directory, keeping codes in memory");
                    CacheConfig::in_memory()
                }),
            }
        };

        let mut cache = CodeCache::load(config);
        let pruned = cache.prune_expired();
        if pruned > 0 {
            debug!("Pruned {} expired cache entries", pruned);
        }

        Some(CodeResolver::new(client, cache))
    } else {
        None
    };

    let mut labeler = PromptLabeler::stdio(player(cmd.player));
    let mut renamer = Renamer::new(style, dry_run);

    let result = rename_from_metadata(
        &rows,
        &options,
        resolver.as_mut(),
        &mut labeler,
        &mut renamer,
        progress,
    );

    // Keep whatever was resolved, even if the batch stopped early
    if let Some(resolver) = resolver {
        let mut cache = resolver.into_cache();
        let changed = cache.is_dirty();
        if dry_run {
            if changed {
                info!("Dry run: code cache not written");
            }
            return result;
        }
        match cache.save() {
            Ok(()) => {
                if let (true, Some(path)) = (changed, cache.path()) {
                    progress.cache_saved(path);
                }
            }
            Err(e) => {
                warn!("Failed to save code cache: {}", e);
                progress.warn(&format!("Code cache not saved: {}", e));
            }
        }
    }

    result
}

fn run_label(
    cmd: LabelArgs,
    style: CollisionStyle,
    dry_run: bool,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    let target_dir = cmd.target.unwrap_or_else(|| cmd.dir.clone());
    let mut labeler = PromptLabeler::stdio(player(cmd.player));
    let mut renamer = Renamer::new(style, dry_run);

    if !cmd.variants.is_empty() {
        return label_variant_groups(
            &cmd.dir,
            &target_dir,
            &cmd.variants,
            &cmd.extensions,
            &mut labeler,
            &mut renamer,
            progress,
        );
    }

    label_directory(
        &cmd.dir,
        &target_dir,
        &cmd.extensions,
        &mut labeler,
        &mut renamer,
        progress,
    )
}

fn run_strip(
    cmd: StripArgs,
    style: CollisionStyle,
    dry_run: bool,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    let rule = match (&cmd.preset, &cmd.rules) {
        (Some(name), _) => preset(name)?,
        (None, Some(path)) => load_rule_file(path)?,
        (None, None) => {
            return Err(AppError::InvalidArguments(
                "either --preset or --rules is required".to_string(),
            ))
        }
    };
    debug!(?rule, "Using rule");

    let target_dir = cmd.target.unwrap_or_else(|| cmd.dir.clone());
    let mut renamer = Renamer::new(style, dry_run);

    rename_with_rule(&cmd.dir, &target_dir, &rule, &mut renamer, progress)
}

fn run_sort(
    cmd: SortArgs,
    style: CollisionStyle,
    dry_run: bool,
    progress: &mut Progress,
) -> Result<RenameResult, AppError> {
    let categories = match (cmd.choices.is_empty(), cmd.pairs) {
        (true, true) => default_pair_categories(),
        (true, false) => default_categories(),
        (false, _) => cmd.choices,
    };
    let mut labeler = PromptLabeler::stdio(player(cmd.player));

    if cmd.pairs {
        return sort_pairs(
            &cmd.dir,
            &categories,
            &mut labeler,
            style,
            dry_run,
            progress,
        );
    }

    sort_directory(
        &cmd.dir,
        &categories,
        &mut labeler,
        style,
        dry_run,
        progress,
    )
}

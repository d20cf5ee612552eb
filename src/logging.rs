use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

// HTTP stack chatter drowns out per-file logs below trace level
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=info", "rustls=warn"];

/// Map `-v` occurrences to a log level
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env().add_directive(level_for(verbosity).into());

    if verbosity < 3 {
        for directive in QUIET_DEPENDENCIES {
            if let Ok(directive) = directive.parse::<Directive>() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

/// Install the stderr subscriber; `RUST_LOG` directives are honoured too
pub fn init(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbosity))
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

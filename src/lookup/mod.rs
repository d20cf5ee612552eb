mod client;
mod resolver;
mod types;

pub use client::CrsClient;
pub use resolver::{CodeResolver, Resolution, ResolveError};
pub use types::{LookupConfig, LookupError, StationRecord, DEFAULT_LOOKUP_URL};

use std::env;

/// Environment variable names for the lookup service configuration
pub const ENV_LOOKUP_URL: &str = "RAIL_LOOKUP_URL";
pub const ENV_LOOKUP_TIMEOUT: &str = "RAIL_LOOKUP_TIMEOUT_SECS";

/// Anything that can answer "which stations match this name?"
pub trait StationLookup {
    fn lookup(&self, name: &str) -> Result<Vec<StationRecord>, LookupError>;
}

/// Load lookup configuration from environment variables
///
/// Optional environment variables:
/// - `RAIL_LOOKUP_URL`: base URL of the CRS lookup service
/// - `RAIL_LOOKUP_TIMEOUT_SECS`: request timeout in seconds
///
/// These can be set in a `.env` file in the working directory.
pub fn config_from_env() -> LookupConfig {
    let defaults = LookupConfig::default();

    let base_url = env::var(ENV_LOOKUP_URL)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(defaults.base_url);
    let timeout_secs = env::var(ENV_LOOKUP_TIMEOUT)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(defaults.timeout_secs);

    LookupConfig {
        base_url,
        timeout_secs,
    }
}

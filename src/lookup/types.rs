use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_LOOKUP_URL: &str = "https://national-rail-api.davwheat.dev";

/// One candidate returned by the station lookup service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    pub crs_code: String,
    pub station_name: String,
}

/// Lookup client configuration
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOOKUP_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl LookupConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Errors that can occur when querying the station lookup service
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Lookup service returned HTTP {status}")]
    ServerError { status: u16 },

    #[error("Invalid lookup URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::NetworkError(err.to_string())
        }
    }
}

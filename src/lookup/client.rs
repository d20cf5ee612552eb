use super::types::{LookupConfig, LookupError, StationRecord};
use super::StationLookup;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client for the national rail CRS lookup service
pub struct CrsClient {
    client: Client,
    base_url: Url,
}

impl CrsClient {
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| LookupError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidUrl(config.base_url));
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        // A local mirror is never reached through a proxy
        if is_loopback(&base_url) {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// `{base}/crs/{name}` with the name percent-encoded as one path segment
    fn request_url(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("crs").push(name);
        }
        url
    }

    fn parse_response(body: &str) -> Result<Vec<StationRecord>, LookupError> {
        serde_json::from_str(body).map_err(|e| LookupError::ParseError(e.to_string()))
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false),
        None => false,
    }
}

impl StationLookup for CrsClient {
    fn lookup(&self, name: &str) -> Result<Vec<StationRecord>, LookupError> {
        let url = self.request_url(name);

        debug!("Requesting: {}", url);

        let response = self.client.get(url).send()?;
        let status = response.status();

        debug!("Response status: {}", status);

        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !status.is_success() {
            return Err(LookupError::ServerError {
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        let records = Self::parse_response(&body)?;

        info!("Lookup for '{}' returned {} candidates", name, records.len());

        Ok(records)
    }
}

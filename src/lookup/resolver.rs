use thiserror::Error;
use tracing::{debug, info};

use super::types::LookupError;
use super::StationLookup;
use crate::cache::{CodeCache, CodeSource};
use crate::labeler::{LabelError, LabelItem, Labeler};

/// Outcome of resolving one station name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Code(String),
    /// Nobody could name it; the row should not be renamed
    Skip,
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Station lookup failed for '{name}': {source}")]
    Lookup {
        name: String,
        #[source]
        source: LookupError,
    },

    #[error(transparent)]
    Label(#[from] LabelError),
}

/// Turns station names into codes: cache first, then the lookup service,
/// then the operator.
///
/// The cache is owned for the duration of a batch and handed back with
/// [`CodeResolver::into_cache`].
pub struct CodeResolver<L> {
    lookup: L,
    cache: CodeCache,
}

impl<L: StationLookup> CodeResolver<L> {
    pub fn new(lookup: L, cache: CodeCache) -> Self {
        Self { lookup, cache }
    }

    pub fn resolve(
        &mut self,
        name: &str,
        labeler: &mut dyn Labeler,
    ) -> Result<Resolution, ResolveError> {
        let query = CodeCache::normalize(name);
        if query.is_empty() {
            return Ok(Resolution::Skip);
        }

        if let Some(code) = self.cache.get(&query) {
            return Ok(Resolution::Code(code.to_string()));
        }

        let records = self
            .lookup
            .lookup(&query)
            .map_err(|source| ResolveError::Lookup {
                name: query.clone(),
                source,
            })?;

        let matched = match records.as_slice() {
            [only] => Some(only.crs_code.clone()),
            [] => None,
            many => many
                .iter()
                .find(|r| r.station_name.trim().to_lowercase() == query)
                .map(|r| r.crs_code.clone()),
        };

        if let Some(code) = matched {
            info!("Resolved '{}' to {}", name.trim(), code);
            self.cache.insert(&query, &code, CodeSource::Lookup);
            return Ok(Resolution::Code(code));
        }

        debug!(
            candidates = records.len(),
            "No unambiguous match for '{}', asking operator", query
        );

        let item = LabelItem::new(format!("Enter CRS for {}", name.trim()));
        match labeler.present_for_labeling(&item)? {
            Some(code) => {
                self.cache.insert(&query, &code, CodeSource::Operator);
                Ok(Resolution::Code(code))
            }
            None => Ok(Resolution::Skip),
        }
    }

    pub fn cache(&self) -> &CodeCache {
        &self.cache
    }

    pub fn into_cache(self) -> CodeCache {
        self.cache
    }
}

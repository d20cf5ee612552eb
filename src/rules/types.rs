use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::rename::{sanitize_name, CaseStyle};
use crate::scanner::FileEntry;

/// Declarative renaming rule for one dataset of audio fragments.
///
/// ```toml
/// extensions = ["mp3"]
/// require_prefix = "ED"
/// strip_prefixes = ["ED00", "ED0", "ED"]
///
/// [count]
/// singular = "minute"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetRule {
    /// Only files with one of these extensions (case-insensitive); empty means all
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Files whose stem does not start with this are left alone
    #[serde(default)]
    pub require_prefix: Option<String>,
    /// The first prefix that matches is removed
    #[serde(default)]
    pub strip_prefixes: Vec<String>,
    /// The first suffix that matches is removed
    #[serde(default)]
    pub strip_suffixes: Vec<String>,
    #[serde(default)]
    pub case: CaseStyle,
    #[serde(default)]
    pub lowercase_extension: bool,
    /// Treat the remaining stem as a number and append a noun
    #[serde(default)]
    pub count: Option<CountNoun>,
}

/// Noun appended to numeric stems, pluralized for anything but 1
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountNoun {
    pub singular: String,
    #[serde(default)]
    pub plural: Option<String>,
}

impl CountNoun {
    pub fn new(singular: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: None,
        }
    }

    pub fn phrase(&self, n: u64) -> String {
        if n == 1 {
            format!("{} {}", n, self.singular)
        } else {
            match &self.plural {
                Some(plural) => format!("{} {}", n, plural),
                None => format!("{} {}s", n, self.singular),
            }
        }
    }
}

/// What a rule makes of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Rename {
        name: String,
        /// Replacement extension, if the rule normalizes it
        extension: Option<String>,
    },
    /// The rule does not cover this file
    NotApplicable,
    /// The rule covers the file but cannot name it
    Invalid(String),
}

impl DatasetRule {
    pub fn apply(&self, file: &FileEntry) -> RuleOutcome {
        if !file.has_extension(&self.extensions) {
            return RuleOutcome::NotApplicable;
        }

        let mut stem = file.stem();

        if let Some(prefix) = &self.require_prefix {
            if !stem.starts_with(prefix.as_str()) {
                return RuleOutcome::NotApplicable;
            }
        }

        if let Some(rest) = self
            .strip_prefixes
            .iter()
            .find_map(|p| stem.strip_prefix(p.as_str()))
        {
            stem = rest;
        }

        if let Some(rest) = self
            .strip_suffixes
            .iter()
            .find_map(|s| stem.strip_suffix(s.as_str()))
        {
            stem = rest;
        }

        let stem = self.case.apply(stem.trim());

        let name = match &self.count {
            Some(noun) => match stem.parse::<u64>() {
                Ok(n) => noun.phrase(n),
                Err(_) => return RuleOutcome::Invalid(format!("'{}' is not a number", stem)),
            },
            None => stem,
        };

        let name = sanitize_name(&name);
        if name.is_empty() {
            return RuleOutcome::Invalid("nothing left after stripping".to_string());
        }

        let extension = if self.lowercase_extension {
            file.extension()
                .filter(|ext| !ext.is_empty())
                .map(str::to_lowercase)
        } else {
            None
        };

        RuleOutcome::Rename { name, extension }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Failed to read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rule file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unknown preset '{name}' (available: {available})")]
    UnknownPreset { name: String, available: String },
}

mod presets;
mod types;

pub use presets::{preset, preset_names, PRESETS};
pub use types::{CountNoun, DatasetRule, RuleError, RuleOutcome};

use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a rule from a TOML file
pub fn load_rule_file(path: &Path) -> Result<DatasetRule, RuleError> {
    debug!(path = ?path, "Loading rule file");

    let content = fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    DatasetRule::from_toml_str(&content).map_err(|e| RuleError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_rule_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("announcements.toml");
        fs::write(
            &path,
            "strip_prefixes = [\"PA_\"]\nstrip_suffixes = [\"_v2\"]\ncase = \"lower\"\n",
        )
        .unwrap();

        let rule = load_rule_file(&path).unwrap();
        assert_eq!(rule.strip_prefixes, vec!["PA_"]);
        assert_eq!(rule.strip_suffixes, vec!["_v2"]);
    }

    #[test]
    fn test_load_missing_rule_file() {
        let dir = TempDir::new().unwrap();
        let result = load_rule_file(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(RuleError::Io { .. })));
    }

    #[test]
    fn test_load_invalid_rule_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "case = \"sideways\"\n").unwrap();

        let result = load_rule_file(&path);
        assert!(matches!(result, Err(RuleError::Parse { .. })));
    }
}

use super::types::{DatasetRule, RuleError};

const DELAY_MINUTES: &str = r#"
extensions = ["mp3"]
require_prefix = "ED"
strip_prefixes = ["ED00", "ED0", "ED"]

[count]
singular = "minute"
"#;

const COACHES: &str = r#"
extensions = ["mp3"]
require_prefix = "ece"
strip_prefixes = ["ece0", "ece"]

[count]
singular = "carriage"
"#;

const TIME_HOURS: &str = r#"
extensions = ["mp3"]
require_prefix = "EZH"
strip_prefixes = ["EZH"]
"#;

const TIME_MINUTES: &str = r#"
extensions = ["mp3"]
require_prefix = "EZM"
strip_prefixes = ["EZM"]
"#;

const STATION_CODES: &str = r#"
extensions = ["mp3"]
require_prefix = "E1"
strip_prefixes = ["E1"]
case = "upper"
lowercase_extension = true
"#;

const STATION_CODES_LOW: &str = r#"
extensions = ["mp3"]
require_prefix = "E2"
strip_prefixes = ["E2"]
case = "upper"
lowercase_extension = true
"#;

/// Built-in rules, by name
pub const PRESETS: &[(&str, &str)] = &[
    ("delay-minutes", DELAY_MINUTES),
    ("coaches", COACHES),
    ("time-hours", TIME_HOURS),
    ("time-minutes", TIME_MINUTES),
    ("station-codes", STATION_CODES),
    ("station-codes-low", STATION_CODES_LOW),
];

pub fn preset_names() -> Vec<&'static str> {
    PRESETS.iter().map(|(name, _)| *name).collect()
}

pub fn preset(name: &str) -> Result<DatasetRule, RuleError> {
    let source = PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
        .map(|(_, source)| *source)
        .ok_or_else(|| RuleError::UnknownPreset {
            name: name.to_string(),
            available: preset_names().join(", "),
        })?;

    DatasetRule::from_toml_str(source).map_err(|e| RuleError::Parse {
        path: format!("<preset {}>", name).into(),
        message: e.to_string(),
    })
}

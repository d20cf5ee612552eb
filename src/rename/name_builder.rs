use once_cell::sync::Lazy;
use regex::Regex;

// Path separators, wildcards, quotes, DEL and C0 control characters
static ILLEGAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\?%*:|"<>\x7F\x00-\x1F]"#).unwrap());

/// Case policy applied to desired names before renaming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStyle {
    #[default]
    Keep,
    Lower,
    Upper,
}

impl CaseStyle {
    pub fn apply(&self, value: &str) -> String {
        match self {
            CaseStyle::Keep => value.to_string(),
            CaseStyle::Lower => value.to_lowercase(),
            CaseStyle::Upper => value.to_uppercase(),
        }
    }
}

/// How a metadata row becomes a base name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NamePattern {
    /// `{label}`
    #[default]
    Label,
    /// `{id}_{label}`
    IdLabel,
}

/// Replace characters that cannot appear in a file name with `-`
pub fn sanitize_name(name: &str) -> String {
    ILLEGAL_CHARS.replace_all(name.trim(), "-").trim().to_string()
}

/// Build the sanitized base name for a metadata row
pub fn build_desired_name(pattern: NamePattern, id: &str, label: &str, case: CaseStyle) -> String {
    let label = case.apply(label.trim());

    let raw = match pattern {
        NamePattern::Label => label,
        NamePattern::IdLabel => format!("{}_{}", id.trim(), label),
    };

    sanitize_name(&raw)
}

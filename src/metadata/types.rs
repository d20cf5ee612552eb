use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A column addressed by zero-based index or by header name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Header(String),
}

impl FromStr for ColumnRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<usize>() {
            Ok(idx) => ColumnRef::Index(idx),
            Err(_) => ColumnRef::Header(s.to_string()),
        })
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(idx) => write!(f, "#{}", idx),
            ColumnRef::Header(name) => write!(f, "\"{}\"", name),
        }
    }
}

/// Which columns of a dataset hold the values the mapper needs.
///
/// Datasets seen so far use either headerless `pos,filename,name` rows or a
/// headed `ID,File,Transcription,Category` layout.
#[derive(Debug, Clone)]
pub struct MetadataSchema {
    pub has_headers: bool,
    pub id: ColumnRef,
    pub file: ColumnRef,
    pub label: ColumnRef,
    pub category: Option<ColumnRef>,
}

impl Default for MetadataSchema {
    fn default() -> Self {
        Self {
            has_headers: true,
            id: ColumnRef::Index(0),
            file: ColumnRef::Index(1),
            label: ColumnRef::Index(2),
            category: None,
        }
    }
}

/// One dataset row reduced to the fields the mapper uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    /// 1-based line number in the source file
    pub line: u64,
    pub id: String,
    pub file: String,
    pub label: String,
    pub category: Option<String>,
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read metadata file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Column {column} not found in header")]
    MissingColumn { column: ColumnRef },

    #[error("Header names require a file with a header row (column {column})")]
    HeaderlessNamedColumn { column: ColumnRef },

    #[error("Line {line} has no value for column {column}")]
    ShortRow { line: u64, column: ColumnRef },
}

use std::io;
use std::path::Path;
use tracing::{debug, info, trace};

use super::types::{ColumnRef, MetadataError, MetadataRow, MetadataSchema};

/// Read every row of a CSV metadata file
pub fn read_metadata(path: &Path, schema: &MetadataSchema) -> Result<Vec<MetadataRow>, MetadataError> {
    debug!(path = ?path, "Reading metadata");

    let reader = csv_builder(schema)
        .from_path(path)
        .map_err(|source| MetadataError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let rows = read_rows(reader, schema).map_err(|e| match e {
        MetadataError::Read { source, .. } => MetadataError::Read {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    info!("Read {} metadata rows from {:?}", rows.len(), path);

    Ok(rows)
}

/// Read rows from any CSV source
pub fn read_metadata_from<R: io::Read>(
    source: R,
    schema: &MetadataSchema,
) -> Result<Vec<MetadataRow>, MetadataError> {
    read_rows(csv_builder(schema).from_reader(source), schema)
}

/// Keep only rows whose category equals `category` (case-insensitive)
pub fn filter_category(rows: Vec<MetadataRow>, category: &str) -> Vec<MetadataRow> {
    let wanted = category.trim();
    rows.into_iter()
        .filter(|row| {
            row.category
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(wanted))
        })
        .collect()
}

fn csv_builder(schema: &MetadataSchema) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(schema.has_headers)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

struct ResolvedColumns {
    id: usize,
    file: usize,
    label: usize,
    category: Option<usize>,
}

fn read_rows<R: io::Read>(
    mut reader: csv::Reader<R>,
    schema: &MetadataSchema,
) -> Result<Vec<MetadataRow>, MetadataError> {
    let headers = if schema.has_headers {
        Some(reader.headers().map_err(read_error)?.clone())
    } else {
        None
    };

    let columns = ResolvedColumns {
        id: resolve(&schema.id, headers.as_ref())?,
        file: resolve(&schema.file, headers.as_ref())?,
        label: resolve(&schema.label, headers.as_ref())?,
        category: schema
            .category
            .as_ref()
            .map(|c| resolve(c, headers.as_ref()))
            .transpose()?,
    };

    let mut rows = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(read_error)?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(i as u64 + 1);

        if record.iter().all(|field| field.is_empty()) {
            trace!(line, "Skipping blank row");
            continue;
        }

        let field = |idx: usize, column: &ColumnRef| -> Result<String, MetadataError> {
            record
                .get(idx)
                .map(str::to_string)
                .ok_or_else(|| MetadataError::ShortRow {
                    line,
                    column: column.clone(),
                })
        };

        let category = match (columns.category, schema.category.as_ref()) {
            (Some(idx), Some(column)) => Some(field(idx, column)?),
            _ => None,
        };

        rows.push(MetadataRow {
            line,
            id: field(columns.id, &schema.id)?,
            file: field(columns.file, &schema.file)?,
            label: field(columns.label, &schema.label)?,
            category,
        });
    }

    Ok(rows)
}

fn resolve(column: &ColumnRef, headers: Option<&csv::StringRecord>) -> Result<usize, MetadataError> {
    match (column, headers) {
        (ColumnRef::Index(idx), _) => Ok(*idx),
        (ColumnRef::Header(name), Some(headers)) => headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| MetadataError::MissingColumn {
                column: column.clone(),
            }),
        (ColumnRef::Header(_), None) => Err(MetadataError::HeaderlessNamedColumn {
            column: column.clone(),
        }),
    }
}

fn read_error(source: csv::Error) -> MetadataError {
    MetadataError::Read {
        path: Default::default(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn named_schema() -> MetadataSchema {
        MetadataSchema {
            has_headers: true,
            id: "ID".parse().unwrap(),
            file: "File".parse().unwrap(),
            label: "Transcription".parse().unwrap(),
            category: Some("Category".parse().unwrap()),
        }
    }

    #[test]
    fn test_headerless_positional_rows() {
        let data = "1,CHLSEA01,Paddington\n2,CHLSEA02, Bond Street \n";
        let schema = MetadataSchema {
            has_headers: false,
            ..Default::default()
        };

        let rows = read_metadata_from(data.as_bytes(), &schema).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[0].file, "CHLSEA01");
        assert_eq!(rows[0].label, "Paddington");
        assert_eq!(rows[1].label, "Bond Street");
        assert_eq!(rows[1].line, 2);
    }

    #[test]
    fn test_named_columns_in_any_order() {
        let data = "Category,Transcription,File,ID\n\
                    Time,Seven,0007.mp3,7\n\
                    Number,Twelve,0012.mp3,12\n";

        let rows = read_metadata_from(data.as_bytes(), &named_schema()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "7");
        assert_eq!(rows[0].file, "0007.mp3");
        assert_eq!(rows[0].label, "Seven");
        assert_eq!(rows[0].category.as_deref(), Some("Time"));
        assert_eq!(rows[0].line, 2);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let data = "id,file,transcription\n1,a.mp3,A\n";
        let schema = MetadataSchema {
            category: None,
            ..named_schema()
        };

        let rows = read_metadata_from(data.as_bytes(), &schema).unwrap();
        assert_eq!(rows[0].label, "A");
    }

    #[test]
    fn test_missing_header_column() {
        let data = "ID,File\n1,a.mp3\n";
        let result = read_metadata_from(data.as_bytes(), &named_schema());

        assert!(matches!(result, Err(MetadataError::MissingColumn { .. })));
    }

    #[test]
    fn test_named_column_without_headers() {
        let schema = MetadataSchema {
            has_headers: false,
            ..named_schema()
        };
        let result = read_metadata_from("1,a,b\n".as_bytes(), &schema);

        assert!(matches!(
            result,
            Err(MetadataError::HeaderlessNamedColumn { .. })
        ));
    }

    #[test]
    fn test_short_row_reports_line() {
        let data = "1,a,A\n2,b\n";
        let schema = MetadataSchema {
            has_headers: false,
            ..Default::default()
        };

        let result = read_metadata_from(data.as_bytes(), &schema);

        match result {
            Err(MetadataError::ShortRow { line, column }) => {
                assert_eq!(line, 2);
                assert_eq!(column, ColumnRef::Index(2));
            }
            other => panic!("expected ShortRow, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let data = "1,a,A\n,,\n2,b,B\n";
        let schema = MetadataSchema {
            has_headers: false,
            ..Default::default()
        };

        let rows = read_metadata_from(data.as_bytes(), &schema).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_filter_category() {
        let data = "ID,File,Transcription,Category\n\
                    1,0001.mp3,One,Number\n\
                    2,0002.mp3,Half past,time\n\
                    3,0003.mp3,Two,Number\n";

        let rows = read_metadata_from(data.as_bytes(), &named_schema()).unwrap();
        let numbers = filter_category(rows.clone(), "Number");
        let times = filter_category(rows, "Time");

        assert_eq!(numbers.len(), 2);
        assert_eq!(times.len(), 1);
        assert_eq!(times[0].label, "Half past");
    }

    #[test]
    fn test_read_metadata_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("all stations.csv");
        fs::write(&path, "1,STN001,London Paddington\n").unwrap();

        let schema = MetadataSchema {
            has_headers: false,
            ..Default::default()
        };
        let rows = read_metadata(&path, &schema).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "London Paddington");
    }

    #[test]
    fn test_read_metadata_missing_file() {
        let result = read_metadata(Path::new("/nonexistent/meta.csv"), &MetadataSchema::default());
        assert!(matches!(result, Err(MetadataError::Read { .. })));
    }
}

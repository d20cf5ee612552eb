mod reader;
mod types;

pub use reader::{filter_category, read_metadata, read_metadata_from};
pub use types::{ColumnRef, MetadataError, MetadataRow, MetadataSchema};

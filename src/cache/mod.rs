mod store;
mod types;

pub use store::CodeCache;
pub use types::{CacheConfig, CacheError, CacheFile, CodeEntry, CodeSource, CACHE_VERSION};

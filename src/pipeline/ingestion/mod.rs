// Pipeline ingestion: source descriptors, raw CSV tables, fetching and the fetch cache

pub mod cache;
pub mod fetch;
pub mod raw_table;
pub mod source;

pub use cache::{CachedTable, FetchCache};
pub use fetch::{fetch, fetch_cached};
pub use raw_table::RawTable;
pub use source::{FeedLayout, SourceDescriptor};

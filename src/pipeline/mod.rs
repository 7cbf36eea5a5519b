// Data pipeline: ingestion of raw feeds, processing into tidy tables, and the normalizer facade

pub mod ingestion;
pub mod normalizer;
pub mod processing;

pub use normalizer::{FeedSources, TimeSeriesNormalizer};

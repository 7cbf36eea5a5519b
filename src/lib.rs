//! Normalization pipeline for public COVID-19 case/death feeds.
//!
//! Raw CSV feeds (US states, US counties, NYC boroughs) are fetched through
//! [`app::ports::HttpClientPort`], optionally served from a short-lived
//! [`pipeline::ingestion::FetchCache`], reshaped into tidy
//! `(entity, date, metric) -> value` records and enriched with day-over-day
//! deltas. Ranked, filtered and per-entity views are computed on demand for a
//! presentation layer.

pub mod app;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod pipeline;

pub use config::Config;
pub use domain::{Borough, BoroughGeography, EntityKey, GeographyId, TidyRecord, TidyTable};
pub use error::{FeedError, Result};
pub use pipeline::ingestion::{FeedLayout, FetchCache, RawTable, SourceDescriptor};
pub use pipeline::processing::{
    choropleth_values, compute_daily_delta, filter_for_geography, normalize_wide_to_long,
    pivot_to_wide, rank, series, RankedView,
};
pub use pipeline::{FeedSources, TimeSeriesNormalizer};

use std::sync::Arc;

use tracing::info;

use crate::app::ports::HttpClientPort;
use crate::config::Config;
use crate::constants::{CASES_COLUMN, DEATHS_COLUMN};
use crate::domain::{BoroughGeography, TidyTable};
use crate::error::Result;
use crate::infra::http_client::ReqwestHttp;
use crate::pipeline::ingestion::{fetch_cached, FeedLayout, FetchCache, RawTable, SourceDescriptor};
use crate::pipeline::processing::compute_daily_delta;
use crate::pipeline::processing::normalize::NormalizationRegistry;

/// Descriptors of the three feeds the normalizer serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSources {
    pub states: SourceDescriptor,
    pub counties: SourceDescriptor,
    pub boroughs: SourceDescriptor,
}

impl FeedSources {
    pub fn from_config(config: &Config) -> Self {
        Self {
            states: config.states_source(),
            counties: config.counties_source(),
            boroughs: config.boroughs_source(),
        }
    }

    pub fn for_layout(&self, layout: FeedLayout) -> &SourceDescriptor {
        match layout {
            FeedLayout::States => &self.states,
            FeedLayout::Counties => &self.counties,
            FeedLayout::Boroughs => &self.boroughs,
        }
    }
}

impl Default for FeedSources {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Cumulative metrics a layout publishes, which get a `new_` delta.
fn cumulative_metrics(layout: FeedLayout) -> &'static [&'static str] {
    match layout {
        FeedLayout::States | FeedLayout::Counties => &[CASES_COLUMN, DEATHS_COLUMN],
        // NYC Health already publishes daily counts.
        FeedLayout::Boroughs => &[],
    }
}

/// Fetches feeds and turns them into tidy tables with derived deltas.
///
/// Holds no per-request state: each call fetches (or reuses a fresh cached
/// raw table) and recomputes the tidy table from scratch.
pub struct TimeSeriesNormalizer {
    http: Box<dyn HttpClientPort>,
    cache: Arc<FetchCache>,
    registry: NormalizationRegistry,
    geography: BoroughGeography,
    sources: FeedSources,
}

impl TimeSeriesNormalizer {
    pub fn new(
        http: Box<dyn HttpClientPort>,
        cache: Arc<FetchCache>,
        geography: BoroughGeography,
        sources: FeedSources,
    ) -> Self {
        Self {
            http,
            cache,
            registry: NormalizationRegistry::new(geography.clone()),
            geography,
            sources,
        }
    }

    /// Normalizer backed by the reqwest adapter, configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = ReqwestHttp::new(config.timeout())?;
        let geography = config.geography()?;
        info!(
            borough_table = geography.version(),
            cache_ttl_secs = config.fetch.cache_ttl_seconds,
            "Normalizer configured"
        );
        Ok(Self::new(
            Box::new(http),
            Arc::new(FetchCache::new(config.cache_ttl())),
            geography,
            FeedSources::from_config(config),
        ))
    }

    pub fn sources(&self) -> &FeedSources {
        &self.sources
    }

    pub fn geography(&self) -> &BoroughGeography {
        &self.geography
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    /// Raw table for `source`, from the cache while fresh.
    pub fn fetch(&self, source: &SourceDescriptor) -> Result<Arc<RawTable>> {
        fetch_cached(self.http.as_ref(), source, &self.cache)
    }

    /// Fetch `source`, normalize it by its layout and add daily deltas for
    /// its cumulative metrics.
    pub fn load(&self, source: &SourceDescriptor) -> Result<TidyTable> {
        let raw = self.fetch(source)?;
        let mut table = self.registry.normalize(source.layout, &raw)?;
        for metric in cumulative_metrics(source.layout) {
            table = compute_daily_delta(&table, metric);
        }
        info!(feed = %source.name, records = table.len(), "Feed normalized");
        Ok(table)
    }

    pub fn load_layout(&self, layout: FeedLayout) -> Result<TidyTable> {
        self.load(self.sources.for_layout(layout))
    }

    /// US states with `cases`, `deaths`, `new_cases`, `new_deaths`.
    pub fn states(&self) -> Result<TidyTable> {
        self.load_layout(FeedLayout::States)
    }

    /// US counties with `cases`, `deaths`, `new_cases`, `new_deaths`.
    pub fn counties(&self) -> Result<TidyTable> {
        self.load_layout(FeedLayout::Counties)
    }

    /// NYC boroughs with `case_count`, `hospitalized_count`, `death_count`.
    pub fn boroughs(&self) -> Result<TidyTable> {
        self.load_layout(FeedLayout::Boroughs)
    }
}

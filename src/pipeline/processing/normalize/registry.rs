use std::collections::HashMap;

use super::normalizers::{BoroughsNormalizer, CountiesNormalizer, StatesNormalizer};
use super::FeedNormalizer;
use crate::domain::{BoroughGeography, TidyTable};
use crate::error::{FeedError, Result};
use crate::metrics::NormalizeMetrics;
use crate::pipeline::ingestion::{FeedLayout, RawTable};

/// Maps each feed layout to the normalizer that understands it.
pub struct NormalizationRegistry {
    normalizers: HashMap<FeedLayout, Box<dyn FeedNormalizer>>,
}

impl NormalizationRegistry {
    /// Registry with the built-in normalizers for all three layouts.
    pub fn new(geography: BoroughGeography) -> Self {
        let mut normalizers: HashMap<FeedLayout, Box<dyn FeedNormalizer>> = HashMap::new();
        normalizers.insert(FeedLayout::States, Box::new(StatesNormalizer::new()));
        normalizers.insert(FeedLayout::Counties, Box::new(CountiesNormalizer::new()));
        normalizers.insert(FeedLayout::Boroughs, Box::new(BoroughsNormalizer::new(geography)));
        Self { normalizers }
    }

    pub fn get_normalizer(&self, layout: FeedLayout) -> Option<&dyn FeedNormalizer> {
        self.normalizers.get(&layout).map(|n| n.as_ref())
    }

    pub fn normalize(&self, layout: FeedLayout, raw: &RawTable) -> Result<TidyTable> {
        let normalizer = self.get_normalizer(layout).ok_or_else(|| {
            FeedError::Configuration(format!("no normalizer registered for {:?} feeds", layout))
        })?;
        match normalizer.normalize(raw) {
            Ok(table) => {
                NormalizeMetrics::record_rows_normalized(normalizer.feed(), table.len());
                Ok(table)
            }
            Err(e) => {
                if matches!(e, FeedError::Schema { .. }) {
                    NormalizeMetrics::record_schema_error(normalizer.feed());
                }
                Err(e)
            }
        }
    }
}

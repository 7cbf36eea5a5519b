use crate::constants::{
    CASES_COLUMN, COUNTY_COLUMN, DATE_COLUMN, DEATHS_COLUMN, FIPS_COLUMN, STATE_COLUMN,
    US_COUNTIES_FEED,
};
use crate::domain::{EntityKey, GeographyId, TidyTable};
use crate::error::{FeedError, Result};
use crate::pipeline::ingestion::RawTable;
use crate::pipeline::processing::normalize::cells::{cell, optional_text};
use crate::pipeline::processing::normalize::{long_to_tidy, FeedNormalizer};

/// Normalizer for the NYT US counties feed
/// (`date, county, state, fips, cases, deaths`).
///
/// Entities are `(state, county)` pairs. The feed leaves `fips` blank for
/// "Unknown" and for aggregated areas such as New York City; those rows keep
/// their values but carry no geography id.
#[derive(Debug, Default)]
pub struct CountiesNormalizer;

impl CountiesNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl FeedNormalizer for CountiesNormalizer {
    fn feed(&self) -> &str {
        US_COUNTIES_FEED
    }

    fn normalize(&self, raw: &RawTable) -> Result<TidyTable> {
        let idx =
            raw.require_columns(US_COUNTIES_FEED, &[COUNTY_COLUMN, STATE_COLUMN, FIPS_COLUMN])?;
        let (county_idx, state_idx, fips_idx) = (idx[0], idx[1], idx[2]);

        long_to_tidy(
            US_COUNTIES_FEED,
            raw,
            DATE_COLUMN,
            &[CASES_COLUMN, DEATHS_COLUMN],
            |row| {
                let state = optional_text(cell(row, state_idx)).ok_or_else(|| {
                    FeedError::schema(US_COUNTIES_FEED, "row with blank state name")
                })?;
                let county = optional_text(cell(row, county_idx)).ok_or_else(|| {
                    FeedError::schema(
                        US_COUNTIES_FEED,
                        format!("row in {} with blank county name", state),
                    )
                })?;
                let fips = optional_text(cell(row, fips_idx)).map(GeographyId::new);
                Ok((EntityKey::county(state, county), fips))
            },
        )
    }
}

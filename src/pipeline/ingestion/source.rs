use serde::{Deserialize, Serialize};

use crate::constants::{
    CASES_COLUMN, COUNTY_COLUMN, DATE_COLUMN, DEATHS_COLUMN, FIPS_COLUMN, NYC_BOROUGHS_FEED,
    NYC_DATE_COLUMN, STATE_COLUMN, US_COUNTIES_FEED, US_STATES_FEED,
};

/// Shape of a feed, which decides how its raw table becomes tidy records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedLayout {
    /// One row per (date, state).
    States,
    /// One row per (date, county, state).
    Counties,
    /// One row per date, one column per (borough, metric).
    Boroughs,
}

/// Identifies a remote tabular resource and the columns it must carry.
///
/// Also the fetch cache key: two descriptors are the same source only if
/// URL, layout and expected schema all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
    pub layout: FeedLayout,
    pub required_columns: Vec<String>,
}

impl SourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        layout: FeedLayout,
        required_columns: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            layout,
            required_columns: required_columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn us_states(url: impl Into<String>) -> Self {
        Self::new(
            US_STATES_FEED,
            url,
            FeedLayout::States,
            &[DATE_COLUMN, STATE_COLUMN, FIPS_COLUMN, CASES_COLUMN, DEATHS_COLUMN],
        )
    }

    pub fn us_counties(url: impl Into<String>) -> Self {
        Self::new(
            US_COUNTIES_FEED,
            url,
            FeedLayout::Counties,
            &[
                DATE_COLUMN,
                COUNTY_COLUMN,
                STATE_COLUMN,
                FIPS_COLUMN,
                CASES_COLUMN,
                DEATHS_COLUMN,
            ],
        )
    }

    /// Metric columns vary by borough, so only the date column is checked
    /// up front; per-metric columns are resolved during reshaping.
    pub fn nyc_boroughs(url: impl Into<String>) -> Self {
        Self::new(NYC_BOROUGHS_FEED, url, FeedLayout::Boroughs, &[NYC_DATE_COLUMN])
    }
}

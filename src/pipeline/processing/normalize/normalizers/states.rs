use crate::constants::{
    CASES_COLUMN, DATE_COLUMN, DEATHS_COLUMN, FIPS_COLUMN, STATE_COLUMN, US_STATES_FEED,
};
use crate::domain::{EntityKey, GeographyId, TidyTable};
use crate::error::{FeedError, Result};
use crate::pipeline::ingestion::RawTable;
use crate::pipeline::processing::normalize::cells::{cell, optional_text};
use crate::pipeline::processing::normalize::{long_to_tidy, FeedNormalizer};

/// Normalizer for the NYT US states feed (`date, state, fips, cases, deaths`).
#[derive(Debug, Default)]
pub struct StatesNormalizer;

impl StatesNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl FeedNormalizer for StatesNormalizer {
    fn feed(&self) -> &str {
        US_STATES_FEED
    }

    fn normalize(&self, raw: &RawTable) -> Result<TidyTable> {
        let idx = raw.require_columns(US_STATES_FEED, &[STATE_COLUMN, FIPS_COLUMN])?;
        let (state_idx, fips_idx) = (idx[0], idx[1]);

        long_to_tidy(
            US_STATES_FEED,
            raw,
            DATE_COLUMN,
            &[CASES_COLUMN, DEATHS_COLUMN],
            |row| {
                let state = optional_text(cell(row, state_idx)).ok_or_else(|| {
                    FeedError::schema(US_STATES_FEED, "row with blank state name")
                })?;
                let fips = optional_text(cell(row, fips_idx)).map(GeographyId::new);
                Ok((EntityKey::state(state), fips))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_states_feed() {
        let raw = RawTable::from_csv(
            "date,state,fips,cases,deaths\n2020-03-01,Washington,53,10,1\n2020-03-01,Oregon,41,3,\n"
                .as_bytes(),
        )
        .unwrap();
        let tidy = StatesNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(tidy.len(), 4);

        let oregon_deaths = &tidy.records()[3];
        assert_eq!(oregon_deaths.entity, EntityKey::state("Oregon"));
        assert_eq!(oregon_deaths.metric, "deaths");
        assert_eq!(oregon_deaths.value, None);
        assert_eq!(oregon_deaths.geography_id, Some(GeographyId::new("41")));
    }

    #[test]
    fn blank_state_is_schema_error() {
        let raw =
            RawTable::from_csv("date,state,fips,cases,deaths\n2020-03-01,,53,10,1\n".as_bytes())
                .unwrap();
        assert!(matches!(
            StatesNormalizer::new().normalize(&raw),
            Err(FeedError::Schema { .. })
        ));
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::constants::{NYC_BOROUGHS_FEED, NYC_DATE_COLUMN};
use crate::domain::{Borough, BoroughGeography, EntityKey, TidyTable};
use crate::error::{FeedError, Result};
use crate::pipeline::ingestion::RawTable;
use crate::pipeline::processing::normalize::{normalize_wide_to_long, FeedNormalizer, ValueColumn};

/// Per-borough metrics published by NYC Health. Values are daily counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoroughMetric {
    Cases,
    Hospitalized,
    Deaths,
}

impl BoroughMetric {
    pub const ALL: [BoroughMetric; 3] = [
        BoroughMetric::Cases,
        BoroughMetric::Hospitalized,
        BoroughMetric::Deaths,
    ];

    /// Token that identifies the metric inside a column name.
    pub fn column_token(&self) -> &'static str {
        match self {
            BoroughMetric::Cases => "CASE_COUNT",
            BoroughMetric::Hospitalized => "HOSPITALIZED_COUNT",
            BoroughMetric::Deaths => "DEATH_COUNT",
        }
    }

    /// Metric name in tidy tables.
    pub fn metric_name(&self) -> &'static str {
        match self {
            BoroughMetric::Cases => "case_count",
            BoroughMetric::Hospitalized => "hospitalized_count",
            BoroughMetric::Deaths => "death_count",
        }
    }
}

impl fmt::Display for BoroughMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_token())
    }
}

/// The borough identifier carried by `header` for `token`, if `header` is a
/// per-borough column of that metric. `BX_CASE_COUNT` and `CASE_COUNT_Bronx`
/// both yield their borough part; derived columns whose remainder has more
/// than one part (`BX_CASE_COUNT_7DAY_AVG`) and the bare citywide column
/// yield nothing.
fn borough_identifier<'h>(header: &'h str, token: &str) -> Option<&'h str> {
    let identifier = header
        .strip_prefix(token)
        .and_then(|rest| rest.strip_prefix('_'))
        .or_else(|| {
            header
                .strip_suffix(token)
                .and_then(|rest| rest.strip_suffix('_'))
        })?;
    let identifier = identifier.trim();
    (!identifier.is_empty() && !identifier.contains('_')).then_some(identifier)
}

/// Resolve the wide columns holding `metric`, one per borough, tagged with
/// the geography id from `geography`.
///
/// An identifier that is not a known borough is a configuration error; a
/// borough with no column is a schema error.
pub fn borough_value_columns(
    raw: &RawTable,
    metric: BoroughMetric,
    geography: &BoroughGeography,
) -> Result<Vec<ValueColumn>> {
    let token = metric.column_token();
    let mut columns: Vec<(Borough, ValueColumn)> = Vec::with_capacity(Borough::ALL.len());

    for header in &raw.headers {
        let Some(identifier) = borough_identifier(header, token) else {
            continue;
        };
        let (borough, geography_id) = geography.lookup(identifier)?;
        debug!(column = %header, borough = %borough, "Resolved borough column");
        columns.push((
            borough,
            ValueColumn {
                column: header.clone(),
                entity: EntityKey::borough(borough),
                geography_id: Some(geography_id),
            },
        ));
    }

    let missing: Vec<&str> = Borough::ALL
        .iter()
        .filter(|b| !columns.iter().any(|(found, _)| found == *b))
        .map(|b| b.name())
        .collect();
    if !missing.is_empty() {
        return Err(FeedError::schema(
            NYC_BOROUGHS_FEED,
            format!("no {} column for: {}", token, missing.join(", ")),
        ));
    }

    // Stable borough order regardless of how the feed orders its columns.
    columns.sort_by_key(|(borough, _)| *borough);
    Ok(columns.into_iter().map(|(_, column)| column).collect())
}

/// Normalizer for the NYC Health borough feed: one row per date, one column
/// per (borough, metric).
#[derive(Debug, Clone)]
pub struct BoroughsNormalizer {
    geography: BoroughGeography,
    metrics: Vec<BoroughMetric>,
}

impl BoroughsNormalizer {
    pub fn new(geography: BoroughGeography) -> Self {
        Self::with_metrics(geography, &BoroughMetric::ALL)
    }

    pub fn with_metrics(geography: BoroughGeography, metrics: &[BoroughMetric]) -> Self {
        Self {
            geography,
            metrics: metrics.to_vec(),
        }
    }

    pub fn geography(&self) -> &BoroughGeography {
        &self.geography
    }
}

impl FeedNormalizer for BoroughsNormalizer {
    fn feed(&self) -> &str {
        NYC_BOROUGHS_FEED
    }

    /// All requested metrics are resolved before any rows are produced, so
    /// a bad column never yields a partial table.
    fn normalize(&self, raw: &RawTable) -> Result<TidyTable> {
        let plans = self
            .metrics
            .iter()
            .map(|&metric| Ok((metric, borough_value_columns(raw, metric, &self.geography)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::new();
        for (metric, columns) in plans {
            let tidy = normalize_wide_to_long(
                NYC_BOROUGHS_FEED,
                raw,
                &columns,
                NYC_DATE_COLUMN,
                metric.metric_name(),
            )?;
            records.extend(tidy.into_records());
        }
        Ok(TidyTable::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifies_prefix_and_suffix_columns() {
        assert_eq!(borough_identifier("BX_CASE_COUNT", "CASE_COUNT"), Some("BX"));
        assert_eq!(
            borough_identifier("CASE_COUNT_Staten Island", "CASE_COUNT"),
            Some("Staten Island")
        );
        assert_eq!(borough_identifier("CASE_COUNT", "CASE_COUNT"), None);
        assert_eq!(borough_identifier("BX_CASE_COUNT_7DAY_AVG", "CASE_COUNT"), None);
        assert_eq!(borough_identifier("BX_PROBABLE_CASE_COUNT", "CASE_COUNT"), None);
        assert_eq!(borough_identifier("BX_DEATH_COUNT", "CASE_COUNT"), None);
    }

    #[test]
    fn nyc_health_prefixed_columns_normalize() {
        let raw = RawTable::from_csv(
            "DATE_OF_INTEREST,BK_CASE_COUNT,BK_HOSPITALIZED_COUNT,BK_DEATH_COUNT,BX_CASE_COUNT,BX_HOSPITALIZED_COUNT,BX_DEATH_COUNT,MN_CASE_COUNT,MN_HOSPITALIZED_COUNT,MN_DEATH_COUNT,QN_CASE_COUNT,QN_HOSPITALIZED_COUNT,QN_DEATH_COUNT,SI_CASE_COUNT,SI_HOSPITALIZED_COUNT,SI_DEATH_COUNT
03/03/2020,1,0,0,2,1,0,3,0,0,4,2,1,5,0,0
"
            .as_bytes(),
        )
        .unwrap();
        let tidy = BoroughsNormalizer::new(BoroughGeography::nyc_default())
            .normalize(&raw)
            .unwrap();
        assert_eq!(tidy.len(), 15);

        let bronx_cases = &tidy.records()[0];
        assert_eq!(bronx_cases.entity, EntityKey::borough(Borough::Bronx));
        assert_eq!(bronx_cases.metric, "case_count");
        assert_eq!(bronx_cases.value, Some(2));
        assert_eq!(bronx_cases.geography_id.as_ref().unwrap().as_str(), "36005");
    }

    #[test]
    fn unknown_borough_identifier_is_configuration_error() {
        let raw = RawTable::from_csv(
            "DATE_OF_INTEREST,CASE_COUNT_Bronx,CASE_COUNT_Gotham\n2020-04-01,1,2\n".as_bytes(),
        )
        .unwrap();
        let err = BoroughsNormalizer::with_metrics(
            BoroughGeography::nyc_default(),
            &[BoroughMetric::Cases],
        )
        .normalize(&raw)
        .unwrap_err();
        assert!(matches!(err, FeedError::Configuration(_)));
    }

    #[test]
    fn missing_borough_column_is_schema_error() {
        let raw = RawTable::from_csv(
            "DATE_OF_INTEREST,CASE_COUNT_Bronx,CASE_COUNT_Queens\n2020-04-01,1,2\n".as_bytes(),
        )
        .unwrap();
        let geography = BoroughGeography::nyc_default();
        let err = borough_value_columns(&raw, BoroughMetric::Cases, &geography).unwrap_err();
        assert!(matches!(err, FeedError::Schema { .. }));
        assert!(err.to_string().contains("Brooklyn"));
    }
}

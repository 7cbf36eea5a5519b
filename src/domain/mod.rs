use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

pub mod geography;

pub use geography::{Borough, BoroughGeography, GeographyId};

use crate::constants::{NEW_YORK_STATE, UNKNOWN_COUNTY};

/// Identifies one geographic unit across all three feeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKey {
    State { state: String },
    County { state: String, county: String },
    Borough { borough: Borough },
}

impl EntityKey {
    pub fn state(name: impl Into<String>) -> Self {
        EntityKey::State { state: name.into() }
    }

    pub fn county(state: impl Into<String>, county: impl Into<String>) -> Self {
        EntityKey::County {
            state: state.into(),
            county: county.into(),
        }
    }

    pub fn borough(borough: Borough) -> Self {
        EntityKey::Borough { borough }
    }

    /// The state this entity lies in.
    pub fn state_name(&self) -> &str {
        match self {
            EntityKey::State { state } | EntityKey::County { state, .. } => state,
            EntityKey::Borough { .. } => NEW_YORK_STATE,
        }
    }

    /// Short display label (state, county or borough name).
    pub fn label(&self) -> &str {
        match self {
            EntityKey::State { state } => state,
            EntityKey::County { county, .. } => county,
            EntityKey::Borough { borough } => borough.name(),
        }
    }

    /// Whether the entity can be placed on a map. The NYT "Unknown" county
    /// is a bucket for unattributed cases and has no boundary.
    pub fn is_geocodable(&self) -> bool {
        !matches!(self, EntityKey::County { county, .. } if county == UNKNOWN_COUNTY)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::State { state } => write!(f, "{}", state),
            EntityKey::County { state, county } => write!(f, "{}, {}", county, state),
            EntityKey::Borough { borough } => write!(f, "{}, {}", borough, NEW_YORK_STATE),
        }
    }
}

/// One `(entity, date, metric) -> value` observation.
///
/// `value` is `None` when the source had no number for that cell, or when a
/// derived value is undefined (the first delta of a series).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TidyRecord {
    pub entity: EntityKey,
    pub geography_id: Option<GeographyId>,
    pub date: NaiveDate,
    pub metric: String,
    pub value: Option<i64>,
}

/// An ordered, immutable collection of tidy records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TidyTable {
    records: Vec<TidyRecord>,
}

impl TidyTable {
    pub fn new(records: Vec<TidyRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TidyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TidyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<TidyRecord> {
        self.records
    }

    /// Distinct entities in order of first appearance.
    pub fn entities(&self) -> Vec<EntityKey> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(&r.entity))
            .map(|r| r.entity.clone())
            .collect()
    }

    /// Distinct metric names in order of first appearance.
    pub fn metrics(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.metric.as_str()))
            .map(|r| r.metric.clone())
            .collect()
    }

    /// Distinct dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records
            .iter()
            .map(|r| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }
}

impl<'a> IntoIterator for &'a TidyTable {
    type Item = &'a TidyRecord;
    type IntoIter = std::slice::Iter<'a, TidyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<TidyRecord> for TidyTable {
    fn from_iter<T: IntoIterator<Item = TidyRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entity: EntityKey, day: u32, value: Option<i64>) -> TidyRecord {
        TidyRecord {
            entity,
            geography_id: None,
            date: NaiveDate::from_ymd_opt(2020, 4, day).unwrap(),
            metric: "cases".to_string(),
            value,
        }
    }

    #[test]
    fn unknown_county_is_not_geocodable() {
        assert!(!EntityKey::county("New Jersey", "Unknown").is_geocodable());
        assert!(EntityKey::county("New Jersey", "Bergen").is_geocodable());
        assert!(EntityKey::state("Unknown").is_geocodable());
        assert!(EntityKey::borough(Borough::Queens).is_geocodable());
    }

    #[test]
    fn boroughs_belong_to_new_york() {
        assert_eq!(EntityKey::borough(Borough::Bronx).state_name(), "New York");
        assert_eq!(EntityKey::borough(Borough::Bronx).to_string(), "Bronx, New York");
    }

    #[test]
    fn listings_are_ordered() {
        let table = TidyTable::new(vec![
            record(EntityKey::state("B"), 3, Some(1)),
            record(EntityKey::state("A"), 1, Some(1)),
            record(EntityKey::state("B"), 1, None),
        ]);
        assert_eq!(
            table.entities(),
            vec![EntityKey::state("B"), EntityKey::state("A")]
        );
        assert_eq!(
            table.dates(),
            vec![
                NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 4, 3).unwrap()
            ]
        );
        assert_eq!(table.latest_date(), NaiveDate::from_ymd_opt(2020, 4, 3));
        assert_eq!(table.metrics(), vec!["cases".to_string()]);
    }

    #[test]
    fn dates_serialize_as_iso_strings() {
        let json = serde_json::to_value(record(EntityKey::state("A"), 9, Some(3))).unwrap();
        assert_eq!(json["date"], "2020-04-09");
        assert_eq!(json["entity"]["kind"], "state");
    }
}

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{EntityKey, GeographyId, TidyTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub entity: EntityKey,
    pub geography_id: Option<GeographyId>,
    pub value: i64,
}

/// Top entities for one metric on one date. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedView {
    pub metric: String,
    pub as_of: NaiveDate,
    pub entries: Vec<RankedEntry>,
}

impl RankedView {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entities(&self) -> Vec<&EntityKey> {
        self.entries.iter().map(|e| &e.entity).collect()
    }
}

/// The `top_n` entities with the highest `metric` on `as_of`.
///
/// Absent values are skipped rather than ranked as zero. Ties keep input
/// order. Fewer than `top_n` candidates yields a shorter view; `top_n == 0`
/// yields an empty one.
pub fn rank(table: &TidyTable, metric: &str, as_of: NaiveDate, top_n: usize) -> RankedView {
    let mut entries: Vec<RankedEntry> = table
        .iter()
        .filter(|r| r.date == as_of && r.metric == metric)
        .filter_map(|r| {
            r.value.map(|value| RankedEntry {
                entity: r.entity.clone(),
                geography_id: r.geography_id.clone(),
                value,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.value.cmp(&a.value));
    entries.truncate(top_n);

    RankedView {
        metric: metric.to_string(),
        as_of,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TidyRecord;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, d).unwrap()
    }

    fn obs(entity: &str, d: u32, value: Option<i64>) -> TidyRecord {
        TidyRecord {
            entity: EntityKey::state(entity),
            geography_id: None,
            date: day(d),
            metric: "new_cases".to_string(),
            value,
        }
    }

    fn table() -> TidyTable {
        TidyTable::new(vec![
            obs("A", 1, Some(5)),
            obs("B", 1, Some(9)),
            obs("C", 1, Some(5)),
            obs("D", 1, None),
            obs("E", 2, Some(100)),
        ])
    }

    #[test]
    fn sorts_descending_with_stable_ties() {
        let view = rank(&table(), "new_cases", day(1), 3);
        let values: Vec<(String, i64)> = view
            .entries
            .iter()
            .map(|e| (e.entity.label().to_string(), e.value))
            .collect();
        assert_eq!(
            values,
            vec![("B".to_string(), 9), ("A".to_string(), 5), ("C".to_string(), 5)]
        );
    }

    #[test]
    fn short_result_contains_every_candidate() {
        let view = rank(&table(), "new_cases", day(1), 10);
        assert_eq!(view.len(), 3);
        assert!(!view.entities().contains(&&EntityKey::state("D")));
    }

    #[test]
    fn zero_top_n_is_empty() {
        assert!(rank(&table(), "new_cases", day(1), 0).is_empty());
    }

    #[test]
    fn no_rows_for_date_is_empty_not_error() {
        let view = rank(&table(), "new_cases", day(30), 5);
        assert!(view.is_empty());
        assert_eq!(view.as_of, day(30));
    }
}

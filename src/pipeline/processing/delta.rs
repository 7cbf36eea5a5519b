use std::collections::HashMap;

use crate::constants::DELTA_PREFIX;
use crate::domain::{EntityKey, TidyRecord, TidyTable};

/// Name of the day-over-day metric derived from `metric`.
pub fn delta_metric_name(metric: &str) -> String {
    format!("{}{}", DELTA_PREFIX, metric)
}

/// Derive `new_<metric>` from a cumulative metric, per entity.
///
/// Each entity's rows are ordered by date and differenced against the
/// previous row of the same entity. The first row of every entity, and any
/// row whose own or previous value is absent, gets an absent delta.
/// Negative deltas (upstream corrections) are kept as-is.
///
/// The result holds the input rows, minus any existing `new_<metric>` rows,
/// followed by the new delta rows grouped by entity in first-appearance
/// order, dates ascending. Re-applying the function yields the same table.
pub fn compute_daily_delta(table: &TidyTable, cumulative_metric: &str) -> TidyTable {
    let delta_metric = delta_metric_name(cumulative_metric);

    let mut order: Vec<&EntityKey> = Vec::new();
    let mut series: HashMap<&EntityKey, Vec<&TidyRecord>> = HashMap::new();
    for record in table.iter().filter(|r| r.metric == cumulative_metric) {
        series
            .entry(&record.entity)
            .or_insert_with(|| {
                order.push(&record.entity);
                Vec::new()
            })
            .push(record);
    }

    let mut records: Vec<TidyRecord> = table
        .iter()
        .filter(|r| r.metric != delta_metric)
        .cloned()
        .collect();

    for entity in order {
        let mut rows = series.remove(entity).unwrap_or_default();
        // Stable, so equal dates keep input order.
        rows.sort_by_key(|r| r.date);

        let mut previous: Option<Option<i64>> = None;
        for row in rows {
            let value = match previous {
                Some(Some(prev)) => row.value.and_then(|cur| cur.checked_sub(prev)),
                _ => None,
            };
            records.push(TidyRecord {
                entity: row.entity.clone(),
                geography_id: row.geography_id.clone(),
                date: row.date,
                metric: delta_metric.clone(),
                value,
            });
            previous = Some(row.value);
        }
    }

    TidyTable::new(records)
}

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::{EntityKey, GeographyId, TidyRecord, TidyTable};
use crate::error::{FeedError, Result};
use crate::pipeline::ingestion::RawTable;

pub mod cells;
pub mod normalizers;
pub mod registry;

pub use normalizers::{BoroughMetric, BoroughsNormalizer, CountiesNormalizer, StatesNormalizer};
pub use registry::NormalizationRegistry;

use cells::{cell, parse_count, parse_date};

/// Turns one feed's raw table into tidy records.
pub trait FeedNormalizer: Send + Sync {
    /// Feed name used in errors and logs.
    fn feed(&self) -> &str;

    fn normalize(&self, raw: &RawTable) -> Result<TidyTable>;
}

/// A wide-format column and the entity its values belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueColumn {
    pub column: String,
    pub entity: EntityKey,
    pub geography_id: Option<GeographyId>,
}

/// Reshape a wide table (one row per date, one column per entity) into one
/// tidy record per `(entity, date)` for `metric`.
///
/// Output is grouped by value column in the order given, dates in source
/// row order within each group. Blank cells become absent values. Two rows
/// for the same date, or two columns for the same entity, are schema errors
/// since either would yield a duplicate observation.
pub fn normalize_wide_to_long(
    feed: &str,
    raw: &RawTable,
    value_columns: &[ValueColumn],
    date_column: &str,
    metric: &str,
) -> Result<TidyTable> {
    let date_idx = raw.require_columns(feed, &[date_column])?[0];
    let names: Vec<&str> = value_columns.iter().map(|c| c.column.as_str()).collect();
    let value_idx = raw.require_columns(feed, names.as_slice())?;

    let mut seen_entities = HashSet::new();
    for column in value_columns {
        if !seen_entities.insert(&column.entity) {
            return Err(FeedError::schema(
                feed,
                format!(
                    "column '{}' maps to {} which another column already covers",
                    column.column, column.entity
                ),
            ));
        }
    }

    let mut dates = Vec::with_capacity(raw.rows.len());
    let mut seen_dates = HashSet::new();
    for row in &raw.rows {
        let date = parse_date(feed, date_column, cell(row, date_idx))?;
        if !seen_dates.insert(date) {
            return Err(FeedError::schema(
                feed,
                format!("date {} appears in more than one row", date),
            ));
        }
        dates.push(date);
    }

    let mut records = Vec::with_capacity(raw.rows.len() * value_columns.len());
    for (column, &idx) in value_columns.iter().zip(&value_idx) {
        for (row, &date) in raw.rows.iter().zip(&dates) {
            records.push(TidyRecord {
                entity: column.entity.clone(),
                geography_id: column.geography_id.clone(),
                date,
                metric: metric.to_string(),
                value: parse_count(feed, &column.column, cell(row, idx))?,
            });
        }
    }
    Ok(TidyTable::new(records))
}

/// Tidy a long-format table (one row per entity and date) by emitting one
/// record per metric column for every row, in row order.
///
/// `key_of` derives the entity and geography id from a row. A repeated
/// `(entity, date)` pair is a schema error.
pub fn long_to_tidy<F>(
    feed: &str,
    raw: &RawTable,
    date_column: &str,
    metric_columns: &[&str],
    key_of: F,
) -> Result<TidyTable>
where
    F: Fn(&[String]) -> Result<(EntityKey, Option<GeographyId>)>,
{
    let date_idx = raw.require_columns(feed, &[date_column])?[0];
    let metric_idx = raw.require_columns(feed, metric_columns)?;

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(raw.rows.len() * metric_columns.len());
    for row in &raw.rows {
        let date = parse_date(feed, date_column, cell(row, date_idx))?;
        let (entity, geography_id) = key_of(row)?;
        if !seen.insert((entity.clone(), date)) {
            return Err(FeedError::schema(
                feed,
                format!("{} has more than one row for {}", entity, date),
            ));
        }
        for (&metric, &idx) in metric_columns.iter().zip(&metric_idx) {
            records.push(TidyRecord {
                entity: entity.clone(),
                geography_id: geography_id.clone(),
                date,
                metric: metric.to_string(),
                value: parse_count(feed, metric, cell(row, idx))?,
            });
        }
    }
    Ok(TidyTable::new(records))
}

/// One metric laid out as dates x entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WideView {
    pub metric: String,
    /// Column order, by first appearance in the tidy table.
    pub entities: Vec<EntityKey>,
    pub rows: Vec<WideRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WideRow {
    pub date: NaiveDate,
    /// One cell per entity; `None` if absent or not observed.
    pub values: Vec<Option<i64>>,
}

/// Pivot one metric of a tidy table back to wide form, dates ascending.
pub fn pivot_to_wide(table: &TidyTable, metric: &str) -> WideView {
    let mut entities: Vec<EntityKey> = Vec::new();
    let mut column_of: HashMap<&EntityKey, usize> = HashMap::new();
    let mut by_date: BTreeMap<NaiveDate, Vec<(usize, Option<i64>)>> = BTreeMap::new();

    for record in table.iter().filter(|r| r.metric == metric) {
        let col = *column_of.entry(&record.entity).or_insert_with(|| {
            entities.push(record.entity.clone());
            entities.len() - 1
        });
        by_date.entry(record.date).or_default().push((col, record.value));
    }

    let rows = by_date
        .into_iter()
        .map(|(date, observed)| {
            let mut values = vec![None; entities.len()];
            for (col, value) in observed {
                values[col] = value;
            }
            WideRow { date, values }
        })
        .collect();

    WideView {
        metric: metric.to_string(),
        entities,
        rows,
    }
}

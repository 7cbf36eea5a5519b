use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{EntityKey, GeographyId, TidyTable};

/// One point of an entity's time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<i64>,
}

/// `metric` for one entity, dates ascending.
pub fn series(table: &TidyTable, entity: &EntityKey, metric: &str) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = table
        .iter()
        .filter(|r| &r.entity == entity && r.metric == metric)
        .map(|r| SeriesPoint {
            date: r.date,
            value: r.value,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// A value to shade one map region with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoroplethValue {
    pub geography_id: GeographyId,
    pub label: String,
    pub value: i64,
}

/// `(geography id, value)` pairs for a map on `date`. Entities that cannot be
/// geocoded, have no geography id, or have no value are left out.
pub fn choropleth_values(table: &TidyTable, metric: &str, date: NaiveDate) -> Vec<ChoroplethValue> {
    table
        .iter()
        .filter(|r| r.date == date && r.metric == metric && r.entity.is_geocodable())
        .filter_map(|r| {
            let geography_id = r.geography_id.clone()?;
            let value = r.value?;
            Some(ChoroplethValue {
                geography_id,
                label: r.entity.label().to_string(),
                value,
            })
        })
        .collect()
}

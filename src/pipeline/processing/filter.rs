use std::collections::HashSet;

use crate::domain::{EntityKey, TidyRecord, TidyTable};

/// Keep only the records matching `predicate`. The input table is left as is.
pub fn filter_for_geography<P>(table: &TidyTable, predicate: P) -> TidyTable
where
    P: Fn(&TidyRecord) -> bool,
{
    table.iter().filter(|r| predicate(*r)).cloned().collect()
}

/// Records located in `state`.
pub fn in_state(state: &str) -> impl Fn(&TidyRecord) -> bool + '_ {
    move |r: &TidyRecord| r.entity.state_name() == state
}

/// Records whose entity can be drawn on a map.
pub fn is_geocodable(record: &TidyRecord) -> bool {
    record.entity.is_geocodable()
}

/// Everything except the non-geocodable entities of `state`.
pub fn not_unknown_in(state: &str) -> impl Fn(&TidyRecord) -> bool + '_ {
    move |r: &TidyRecord| r.entity.is_geocodable() || r.entity.state_name() != state
}

/// Records for any of `entities` (multi-select scoping). An empty selection
/// keeps everything, matching a dropdown with nothing picked.
pub fn entity_in(entities: &[EntityKey]) -> impl Fn(&TidyRecord) -> bool {
    let selected: HashSet<EntityKey> = entities.iter().cloned().collect();
    move |r: &TidyRecord| selected.is_empty() || selected.contains(&r.entity)
}

/// Records with a present, non-negative value (line charts skip corrections).
pub fn has_non_negative_value(record: &TidyRecord) -> bool {
    matches!(record.value, Some(v) if v >= 0)
}

// Pipeline processing: reshaping, derived metrics, ranking and views

pub mod delta;
pub mod filter;
pub mod normalize;
pub mod rank;
pub mod views;

pub use delta::{compute_daily_delta, delta_metric_name};
pub use filter::{
    entity_in, filter_for_geography, has_non_negative_value, in_state, is_geocodable,
    not_unknown_in,
};
pub use normalize::{normalize_wide_to_long, pivot_to_wide, ValueColumn, WideRow, WideView};
pub use rank::{rank, RankedEntry, RankedView};
pub use views::{choropleth_values, series, ChoroplethValue, SeriesPoint};

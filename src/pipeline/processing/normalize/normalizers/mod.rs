// Feed-specific normalizers, one per published feed shape
pub mod boroughs;
pub mod counties;
pub mod states;

pub use boroughs::{borough_value_columns, BoroughMetric, BoroughsNormalizer};
pub use counties::CountiesNormalizer;
pub use states::StatesNormalizer;

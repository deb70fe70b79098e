//! Data processing for the mill drill-down dashboard.
//!
//! This crate turns loosely-typed backend rows into forms suitable for
//! charting and KPI tiles:
//! - `normalize`: field-tolerant extraction of years, months, labels and values
//! - `records`: the typed year/month/category records and the category result set
//! - `chart`: chart datasets and click decoding
//! - `summary`: KPI tiles and the category-row fallback

mod fields;
pub mod chart;
pub mod normalize;
pub mod records;
pub mod summary;

pub use normalize::{normalize, CanonicalRecord, Role};
pub use records::{CategoryResultSet, CategoryRow, FetchFailure, MonthRecord, YearRecord};
pub use summary::{Summary, SummarySource, Tiles};

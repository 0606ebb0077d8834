//! # estate-catalog
//!
//! View logic over loaded community records: filter facets, list filtering
//! and sort orders, and the comparison selection with its table and chart
//! series. Everything here is pure and works on borrowed records from the
//! repository.

pub mod compare;
pub mod query;

pub use compare::{
    main_supply_by_range, metro_series, price_series, target_series, ChartSeries, CompareError,
    CompareRow, CompareSelection, CompareTable, ComparisonView, ToggleOutcome, MAX_COMPARE_COUNT,
    MIN_COMPARE_COUNT,
};
pub use query::{Facets, ListQuery, SortKey};

//! Data and metrics core for a school-meal delivery monitoring dashboard.
//!
//! The dashboard verifies food transport to community comedores along four
//! dimensions: site accessibility, delivery compliance, vehicle condition,
//! and staff attitudes. This crate owns everything between the spreadsheet
//! fetch and the charts:
//!
//! * [`data::store::RecordStore`] – versioned, immutable snapshots of the
//!   verification sheet, refreshed through a [`data::loader::RowSource`].
//! * [`filter`] – per-page filter selections applied as index subsets.
//! * [`metrics`] – indicator rates, composite indexes, breakdowns,
//!   findings, and trends per dimension.
//! * [`cache`] – memoized metrics keyed by (version, filter, dimension).
//!
//! Page routing, chart rendering, and sheet credentials live outside this
//! crate; they consume [`metrics::Metric`] values plus the snapshot's
//! freshness metadata.

pub mod cache;
pub mod data;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod schema;

pub use cache::MetricsCache;
pub use data::loader::{snapshot_source, CsvSource, JsonSource, MemorySource, RawTable, RowSource};
pub use data::model::{CellValue, Dataset, Record};
pub use data::store::RecordStore;
pub use error::DashboardError;
pub use filter::{apply, DateRange, FilterSpec, FilteredView};
pub use metrics::{Metric, MetricValue};
pub use schema::Dimension;

//! # positions_rollup
//!
//! Cleans a brokerage positions table: rows whose symbol is on an exclusion list are
//! dropped, a bold totals row is appended for the requested columns, and the result is
//! sorted by one or more columns.
//!
//! ```text
//! xlsx/csv ──▶ ExclusionFilter ──▶ ColumnAggregator ──▶ TableSorter ──▶ xlsx/csv
//! ```
//!
//! A folder of broker downloads can be combined into one table first (see
//! [`core::Combiner`]).
//!
//! - [`core`] - pipeline stages, readers and writers
//! - [`models`] - table model, config and run report
//! - [`error`] - fatal errors and non-fatal warnings
//! - [`utils`] - file discovery and numeric cleaning

pub mod core;
pub mod error;
pub mod models;
pub mod utils;

pub use crate::core::{transform, PipelineSpec, Processed, Processor};
pub use error::{Stage, TableError, TableResult, Warning};
pub use models::{Cell, Config, Header, Row, RowKind, RunReport, Table};

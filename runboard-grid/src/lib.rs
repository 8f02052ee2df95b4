//! runboard grid library exports.
//!
//! [`controller::GridController`] drives a server-paged run table: it keeps
//! the column catalog and selection, turns table state into search requests
//! and search results into rows.

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod notifications;
pub mod rest;
pub mod telemetry;
pub mod traits;

pub use controller::{FetchOutcome, GridController, PendingFetch};
pub use traits::{ColumnSource, TableDataSource};

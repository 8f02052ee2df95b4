//! runboard core - columns, queries and rows
//!
//! Data types and pure transforms for a server-driven run table. Nothing in
//! this crate performs I/O; the [`RunService`] trait is the seam to the
//! search backend.

pub mod catalog;
pub mod column;
pub mod error;
pub mod filter;
pub mod protocol;
pub mod query;
pub mod row;
pub mod service;
pub mod table;
pub mod token;

pub use catalog::{ColumnCatalog, ColumnSelection, KindOrder, SEED_COLUMNS};
pub use column::{locale_compare, ColumnDescriptor, ColumnKind};
pub use error::{ServiceError, ValidationError};
pub use filter::{FilterClause, FilterExpression};
pub use protocol::{
    ColumnNames, FieldWhitelist, KeyValue, Run, RunData, RunInfo, SearchRunsRequest,
    SearchRunsResponse,
};
pub use query::build_search_request;
pub use row::{page_count, transform_run, GridPage, Row, TimestampRenderer};
pub use service::RunService;
pub use table::{FilterSpec, SortSpec, TableRequestState};
pub use token::{OffsetTokenCodec, PageToken, PageTokenCodec};

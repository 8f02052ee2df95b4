//! Command-line arguments for the `runboard` binary.

use clap::{ArgAction, Parser};
use runboard_core::{ColumnSelection, FilterSpec, SortSpec, TableRequestState, ValidationError};
use std::path::PathBuf;

/// One page request, as typed on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(
    name = "runboard",
    about = "Fetch one page of runs and print it as JSON",
    version
)]
pub struct PageArgs {
    /// Config file; falls back to RUNBOARD_CONFIG
    #[arg(long = "config", value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Rows per page; defaults to `default_page_size` from the config
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Sort key, primary first. Repeatable.
    #[arg(
        long = "sort",
        value_name = "COLUMN[:desc|asc]",
        action = ArgAction::Append,
        value_parser = parse_sort
    )]
    pub sorts: Vec<SortSpec>,

    /// Equality filter. Repeatable.
    #[arg(
        long = "filter",
        value_name = "COLUMN=VALUE",
        action = ArgAction::Append,
        value_parser = parse_filter
    )]
    pub filters: Vec<FilterSpec>,

    /// Comma-separated column ids; replaces the configured selection.
    /// An empty list clears it.
    #[arg(long, value_name = "IDS", value_parser = parse_columns)]
    pub columns: Option<ColumnSelection>,
}

impl PageArgs {
    pub fn table_state(&self, default_page_size: u32) -> TableRequestState {
        TableRequestState {
            page_index: self.page,
            page_size: self.page_size.unwrap_or(default_page_size),
            sort_specs: self.sorts.clone(),
            filter_specs: self.filters.clone(),
        }
    }
}

fn parse_sort(value: &str) -> Result<SortSpec, String> {
    let sort = match value.rsplit_once(':') {
        Some((id, dir)) if dir.eq_ignore_ascii_case("desc") => SortSpec::descending(id.trim()),
        Some((id, dir)) if dir.eq_ignore_ascii_case("asc") => SortSpec::ascending(id.trim()),
        _ => SortSpec::ascending(value.trim()),
    };
    if sort.column_id.is_empty() {
        return Err("column id is empty".to_string());
    }
    Ok(sort)
}

fn parse_filter(value: &str) -> Result<FilterSpec, String> {
    let (id, filter_value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected <column>=<value>, got {value:?}"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err("column id is empty".to_string());
    }
    Ok(FilterSpec::new(id, filter_value))
}

fn parse_columns(value: &str) -> Result<ColumnSelection, ValidationError> {
    ColumnSelection::from_ids(value.split(',').map(str::trim).filter(|id| !id.is_empty()))
}

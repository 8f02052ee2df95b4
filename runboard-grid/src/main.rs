//! runboard entry point: fetch one page of runs and print it as JSON.

use clap::Parser;
use runboard_core::{ColumnDescriptor, ColumnSelection, GridPage};
use runboard_grid::cli::PageArgs;
use runboard_grid::config::GridConfig;
use runboard_grid::controller::GridController;
use runboard_grid::error::GridAppError;
use runboard_grid::rest::RestRunService;
use runboard_grid::telemetry;
use serde::Serialize;
use serde_json::Value;

/// The page as the table would show it: one cell per selected column.
#[derive(Debug, Serialize)]
struct PageView<'a> {
    columns: Vec<String>,
    rows: Vec<Vec<Option<&'a Value>>>,
    pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> PageView<'a> {
    fn new(selection: &ColumnSelection, page: &'a GridPage) -> Self {
        Self {
            columns: selection.columns().iter().map(ColumnDescriptor::id).collect(),
            rows: page.rows.iter().map(|row| selection.cells(row)).collect(),
            pages: page.pages,
            error: page.error.as_deref(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), GridAppError> {
    let args = PageArgs::parse();
    let config = GridConfig::load(args.config_path.as_deref())?;
    telemetry::init_tracing(config.logging.json)?;

    let service = RestRunService::new(&config)?;
    tracing::info!(
        api_base_url = service.base_url(),
        experiment_id = %config.experiment_id,
        "Starting runboard"
    );
    let mut grid = GridController::from_config(&config, service)?;

    grid.fetch_catalog().await;
    if let Some(columns) = &args.columns {
        grid.set_selection(Some(columns.columns().to_vec()));
    }

    let state = args.table_state(config.default_page_size);
    let selection = grid.selection().clone();
    let page = grid.fetch_page(&state).await;

    let view = PageView::new(&selection, page);
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

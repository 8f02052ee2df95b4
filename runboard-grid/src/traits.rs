//! Contracts the grid exposes to the rendering shell.

use async_trait::async_trait;
use runboard_core::{ColumnDescriptor, GridPage, TableRequestState};

/// Feeds the table widget. Called whenever its paging, sorting or filtering
/// changes.
#[async_trait]
pub trait TableDataSource: Send {
    /// Rows and page count for `state`. Failures come back as a page with
    /// `error` set, never as a hang.
    async fn fetch_data(&mut self, state: &TableRequestState) -> GridPage;

    /// Whether a fetch is outstanding.
    fn loading(&self) -> bool;
}

/// Feeds the column picker.
pub trait ColumnSource {
    /// Current selection, in display order.
    fn columns(&self) -> &[ColumnDescriptor];

    /// Every column the collection exposes.
    fn available_columns(&self) -> &[ColumnDescriptor];

    /// `None` clears the selection.
    fn set_selection(&mut self, selection: Option<Vec<ColumnDescriptor>>);
}

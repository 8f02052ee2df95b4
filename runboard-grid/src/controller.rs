//! Grid controller: owns catalog, selection and the last fetched page.

use crate::config::{ConfigError, GridConfig};
use crate::notifications::{Notification, NotificationAction, NotificationLevel};
use crate::traits::{ColumnSource, TableDataSource};
use async_trait::async_trait;
use runboard_core::{
    build_search_request, ColumnCatalog, ColumnDescriptor, ColumnSelection, GridPage, KindOrder,
    OffsetTokenCodec, PageToken, PageTokenCodec, RunService, SearchRunsRequest,
    SearchRunsResponse, ServiceError, TableRequestState, TimestampRenderer, ValidationError,
};

/// A page request that has been issued but not yet completed.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    seq: u64,
    page_index: u32,
    request: SearchRunsRequest,
}

impl PendingFetch {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn request(&self) -> &SearchRunsRequest {
        &self.request
    }
}

/// What completing a fetch did to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows and page count replaced.
    Committed,
    /// The fetch failed; an empty page carrying the error was committed.
    Failed,
    /// A newer fetch was issued meanwhile; nothing changed.
    Stale,
}

/// Continuation handed out by the service for the page after `page_index`.
#[derive(Debug, Clone)]
struct PageCursor {
    query: SearchRunsRequest,
    page_index: u32,
    next: PageToken,
}

/// Mediates between the search service and the table/column widgets.
///
/// Every mutation goes through a named operation: [`fetch_catalog`],
/// [`set_selection`] and [`fetch_page`] (or its split form
/// [`begin_fetch`] / [`complete_fetch`] for hosts that keep several
/// requests in flight).
///
/// [`fetch_catalog`]: GridController::fetch_catalog
/// [`set_selection`]: GridController::set_selection
/// [`fetch_page`]: GridController::fetch_page
/// [`begin_fetch`]: GridController::begin_fetch
/// [`complete_fetch`]: GridController::complete_fetch
#[derive(Debug)]
pub struct GridController<S> {
    experiment_id: String,
    service: S,
    catalog: ColumnCatalog,
    selection: ColumnSelection,
    kind_order: KindOrder,
    codec: Box<dyn PageTokenCodec>,
    renderer: TimestampRenderer,
    loading: bool,
    page: GridPage,
    issued_seq: u64,
    cursor: Option<PageCursor>,
    notifications: Vec<Notification>,
}

impl<S: RunService> GridController<S> {
    /// A controller bound to one collection, starting from the seed selection.
    pub fn new(experiment_id: impl Into<String>, service: S) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            service,
            catalog: ColumnCatalog::default(),
            selection: ColumnSelection::seed(),
            kind_order: KindOrder::default(),
            codec: Box::new(OffsetTokenCodec),
            renderer: TimestampRenderer::default(),
            loading: false,
            page: GridPage::empty(),
            issued_seq: 0,
            cursor: None,
            notifications: Vec::new(),
        }
    }

    pub fn from_config(config: &GridConfig, service: S) -> Result<Self, ConfigError> {
        Ok(Self::new(config.experiment_id.clone(), service)
            .with_kind_order(config.kind_order()?)
            .with_selection(config.initial_selection()?)
            .with_timestamps(config.timestamp_renderer()?))
    }

    pub fn with_kind_order(mut self, order: KindOrder) -> Self {
        self.kind_order = order;
        self
    }

    pub fn with_selection(mut self, selection: ColumnSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_timestamps(mut self, renderer: TimestampRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_token_codec(mut self, codec: Box<dyn PageTokenCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    pub fn page(&self) -> &GridPage {
        &self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Refresh the catalog from the service.
    ///
    /// Returns whether the catalog was replaced. On failure the previous
    /// catalog stays and nothing is surfaced beyond a log line.
    pub async fn fetch_catalog(&mut self) -> bool {
        match self.service.list_columns(&self.experiment_id).await {
            Ok(names) => {
                self.catalog = ColumnCatalog::from_names(&names, &self.kind_order);
                tracing::info!(
                    experiment_id = %self.experiment_id,
                    columns = self.catalog.len(),
                    "Column catalog refreshed"
                );
                true
            }
            Err(err) => {
                tracing::warn!(
                    experiment_id = %self.experiment_id,
                    error = %err,
                    "Column catalog fetch failed, keeping previous catalog"
                );
                false
            }
        }
    }

    /// Replace the selection; `None` clears it.
    pub fn set_selection(&mut self, selection: Option<Vec<ColumnDescriptor>>) {
        self.selection = ColumnSelection::from_option(selection);
        tracing::debug!(columns = self.selection.len(), "Column selection changed");
    }

    /// Stamp a new fetch, build its request and mark the grid loading.
    ///
    /// Any fetch issued earlier becomes stale. An invalid `state` issues
    /// nothing: the committed page carries the validation error instead.
    pub fn begin_fetch(
        &mut self,
        state: &TableRequestState,
    ) -> Result<PendingFetch, ValidationError> {
        self.issued_seq += 1;
        let seq = self.issued_seq;

        let request = match build_search_request(&self.experiment_id, state, &self.selection, None)
        {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(seq, error = %err, "Rejected table state");
                self.page = GridPage::failed(err.to_string());
                self.loading = false;
                return Err(err);
            }
        };
        let page_token = self.page_token_for(&request, state.page_index, state.page_size);
        let request = SearchRunsRequest {
            page_token,
            ..request
        };

        self.loading = true;
        tracing::debug!(
            seq,
            page = state.page_index,
            page_size = state.page_size,
            "Issuing run search"
        );
        Ok(PendingFetch {
            seq,
            page_index: state.page_index,
            request,
        })
    }

    /// Commit the result of `pending`, unless a newer fetch was issued.
    pub fn complete_fetch(
        &mut self,
        pending: PendingFetch,
        result: Result<SearchRunsResponse, ServiceError>,
    ) -> FetchOutcome {
        if pending.seq != self.issued_seq {
            tracing::debug!(
                seq = pending.seq,
                latest = self.issued_seq,
                "Discarding stale search response"
            );
            return FetchOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(response) => {
                self.page =
                    GridPage::from_response(&response, pending.request.max_results, &self.renderer);
                self.cursor = response.next_page_token.map(|next| PageCursor {
                    query: pending.request,
                    page_index: pending.page_index,
                    next,
                });
                tracing::debug!(
                    seq = pending.seq,
                    rows = self.page.rows.len(),
                    pages = self.page.pages,
                    "Search committed"
                );
                FetchOutcome::Committed
            }
            Err(err) => {
                tracing::warn!(seq = pending.seq, error = %err, "Run search failed");
                self.page = GridPage::failed(err.to_string());
                self.cursor = None;
                self.notifications.push(
                    Notification::new(
                        NotificationLevel::Error,
                        format!("Loading runs failed: {err}"),
                    )
                    .with_action(NotificationAction::Retry),
                );
                FetchOutcome::Failed
            }
        }
    }

    /// One full round trip for `state`.
    pub async fn fetch_page(&mut self, state: &TableRequestState) -> &GridPage {
        if let Ok(pending) = self.begin_fetch(state) {
            let result = self.service.search_runs(pending.request()).await;
            self.complete_fetch(pending, result);
        }
        &self.page
    }

    /// Prefer the token the service handed out for the page right after the
    /// last one fetched with the same query; otherwise seed one.
    fn page_token_for(
        &self,
        request: &SearchRunsRequest,
        page_index: u32,
        page_size: u32,
    ) -> Option<PageToken> {
        if page_index == 0 {
            return None;
        }
        if let Some(cursor) = &self.cursor {
            if cursor.page_index + 1 == page_index && cursor.query.same_query(request) {
                return Some(cursor.next.clone());
            }
        }
        self.codec.seed(page_index, page_size)
    }
}

#[async_trait]
impl<S: RunService> TableDataSource for GridController<S> {
    async fn fetch_data(&mut self, state: &TableRequestState) -> GridPage {
        self.fetch_page(state).await.clone()
    }

    fn loading(&self) -> bool {
        self.loading
    }
}

impl<S: RunService> ColumnSource for GridController<S> {
    fn columns(&self) -> &[ColumnDescriptor] {
        self.selection.columns()
    }

    fn available_columns(&self) -> &[ColumnDescriptor] {
        self.catalog.columns()
    }

    fn set_selection(&mut self, selection: Option<Vec<ColumnDescriptor>>) {
        GridController::set_selection(self, selection);
    }
}

//! runboard Test Utilities
//!
//! Shared test infrastructure for the runboard workspace:
//! - An in-memory [`MockRunService`] that records every request
//! - Proptest generators for wire and table types
//! - Fixtures for common scenarios
//! - Assertions over requests and pages

pub use runboard_core::{
    ColumnDescriptor, ColumnKind, ColumnNames, ColumnSelection, FilterSpec, GridPage, KeyValue,
    PageToken, Run, RunData, RunInfo, RunService, SearchRunsRequest, SearchRunsResponse,
    ServiceError, SortSpec, TableRequestState,
};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

// ============================================================================
// MOCK SERVICE
// ============================================================================

/// Scripted [`RunService`].
///
/// Search responses are served from a queue; once it is empty the default
/// response is returned. Clones share state, so a test can keep a handle
/// after moving the service into a controller.
#[derive(Debug, Clone)]
pub struct MockRunService {
    columns: Arc<RwLock<Result<ColumnNames, ServiceError>>>,
    search_queue: Arc<RwLock<VecDeque<Result<SearchRunsResponse, ServiceError>>>>,
    default_search: Arc<RwLock<Result<SearchRunsResponse, ServiceError>>>,
    column_calls: Arc<RwLock<Vec<String>>>,
    search_calls: Arc<RwLock<Vec<SearchRunsRequest>>>,
}

impl Default for MockRunService {
    fn default() -> Self {
        Self {
            columns: Arc::new(RwLock::new(Ok(ColumnNames::default()))),
            search_queue: Arc::new(RwLock::new(VecDeque::new())),
            default_search: Arc::new(RwLock::new(Ok(SearchRunsResponse::default()))),
            column_calls: Arc::new(RwLock::new(Vec::new())),
            search_calls: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl MockRunService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(self, names: ColumnNames) -> Self {
        self.set_columns(Ok(names));
        self
    }

    pub fn with_search(self, response: SearchRunsResponse) -> Self {
        *self.default_search.write().unwrap() = Ok(response);
        self
    }

    /// Replace what `list_columns` answers from now on.
    pub fn set_columns(&self, result: Result<ColumnNames, ServiceError>) {
        *self.columns.write().unwrap() = result;
    }

    /// Make every unscripted search fail with `error`.
    pub fn fail_searches(&self, error: ServiceError) {
        *self.default_search.write().unwrap() = Err(error);
    }

    /// Queue one search result ahead of the default.
    pub fn push_search(&self, result: Result<SearchRunsResponse, ServiceError>) {
        self.search_queue.write().unwrap().push_back(result);
    }

    pub fn column_calls(&self) -> Vec<String> {
        self.column_calls.read().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<SearchRunsRequest> {
        self.search_calls.read().unwrap().clone()
    }

    pub fn last_search(&self) -> Option<SearchRunsRequest> {
        self.search_calls.read().unwrap().last().cloned()
    }
}

#[async_trait]
impl RunService for MockRunService {
    async fn list_columns(&self, experiment_id: &str) -> Result<ColumnNames, ServiceError> {
        self.column_calls
            .write()
            .unwrap()
            .push(experiment_id.to_string());
        self.columns.read().unwrap().clone()
    }

    async fn search_runs(
        &self,
        request: &SearchRunsRequest,
    ) -> Result<SearchRunsResponse, ServiceError> {
        self.search_calls.write().unwrap().push(request.clone());
        let scripted = self.search_queue.write().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => self.default_search.read().unwrap().clone(),
        }
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for runboard types.

    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    pub fn arb_column_kind() -> impl Strategy<Value = ColumnKind> {
        prop_oneof![
            Just(ColumnKind::Attribute),
            Just(ColumnKind::Tag),
            Just(ColumnKind::Metric),
            Just(ColumnKind::Param),
        ]
    }

    /// Names as seen in practice: dotted, underscored, mixed case.
    pub fn arb_column_name() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9_.]{0,15}"
    }

    pub fn arb_column_descriptor() -> impl Strategy<Value = ColumnDescriptor> {
        (arb_column_kind(), arb_column_name())
            .prop_map(|(kind, name)| ColumnDescriptor::new(kind, name))
    }

    pub fn arb_selection() -> impl Strategy<Value = ColumnSelection> {
        prop::collection::vec(arb_column_descriptor(), 0..12).prop_map(ColumnSelection::new)
    }

    pub fn arb_column_names() -> impl Strategy<Value = ColumnNames> {
        (
            prop::collection::vec(arb_column_name(), 0..6),
            prop::collection::vec(arb_column_name(), 0..6),
            prop::collection::vec(arb_column_name(), 0..6),
            prop::collection::vec(arb_column_name(), 0..6),
        )
            .prop_map(|(attributes, tags, metrics, params)| ColumnNames {
                attributes,
                tags,
                metrics,
                params,
            })
    }

    pub fn arb_cell_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            "[a-z0-9 ]{0,12}".prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
            (-1.0e6f64..1.0e6f64).prop_map(Value::from),
        ]
    }

    /// Small key space so duplicates are common.
    pub fn arb_key_values() -> impl Strategy<Value = Vec<KeyValue>> {
        prop::collection::vec(("[a-e]{1,2}", arb_cell_value()), 0..16).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(key, value)| KeyValue::new(key, value))
                .collect()
        })
    }

    /// Epoch milliseconds between 2020 and 2030.
    pub fn arb_epoch_millis() -> impl Strategy<Value = i64> {
        1_577_836_800_000i64..1_893_456_000_000i64
    }

    pub fn arb_run_info() -> impl Strategy<Value = RunInfo> {
        (
            "[0-9a-f]{32}",
            prop_oneof![Just("RUNNING"), Just("FINISHED"), Just("FAILED")],
            arb_epoch_millis(),
            prop::option::of(0i64..86_400_000),
        )
            .prop_map(|(run_uuid, status, start, duration)| {
                let mut info = RunInfo::default();
                info.insert("run_uuid", Value::from(run_uuid));
                info.insert("status", Value::from(status));
                info.insert("start_time", Value::from(start.to_string()));
                if let Some(duration) = duration {
                    info.insert("end_time", Value::from((start + duration).to_string()));
                }
                info
            })
    }

    pub fn arb_run_data() -> impl Strategy<Value = RunData> {
        (arb_key_values(), arb_key_values(), arb_key_values())
            .prop_map(|(tags, metrics, params)| RunData { tags, metrics, params })
    }

    pub fn arb_run() -> impl Strategy<Value = Run> {
        (arb_run_info(), prop::option::of(arb_run_data()))
            .prop_map(|(info, data)| Run { info, data })
    }

    pub fn arb_search_response() -> impl Strategy<Value = SearchRunsResponse> {
        (
            prop::option::of(prop::collection::vec(arb_run(), 0..8)),
            0u64..10_000,
        )
            .prop_map(|(runs, total_run_count)| SearchRunsResponse {
                runs,
                total_run_count,
                next_page_token: None,
            })
    }

    pub fn arb_sort_spec() -> impl Strategy<Value = SortSpec> {
        (arb_column_descriptor(), any::<bool>()).prop_map(|(column, descending)| SortSpec {
            column_id: column.id(),
            descending,
        })
    }

    /// Filter values may contain quotes and backslashes.
    pub fn arb_filter_spec() -> impl Strategy<Value = FilterSpec> {
        (arb_column_descriptor(), "[a-z\"\\\\ ]{0,10}")
            .prop_map(|(column, value)| FilterSpec::new(column.id(), value))
    }

    pub fn arb_table_state() -> impl Strategy<Value = TableRequestState> {
        (
            0u32..50,
            1u32..200,
            prop::collection::vec(arb_sort_spec(), 0..4),
            prop::collection::vec(arb_filter_spec(), 0..4),
        )
            .prop_map(|(page_index, page_size, sort_specs, filter_specs)| TableRequestState {
                page_index,
                page_size,
                sort_specs,
                filter_specs,
            })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common scenarios.

    use super::*;
    use serde_json::json;

    pub const EXPERIMENT_ID: &str = "42";

    /// One column of each kind.
    pub fn small_catalog() -> ColumnNames {
        ColumnNames {
            attributes: vec!["start_time".to_string()],
            tags: vec!["mlflow.user".to_string()],
            metrics: vec!["acc".to_string()],
            params: vec!["lr".to_string()],
        }
    }

    /// Selection matching [`small_catalog`] column for column.
    pub fn small_selection() -> ColumnSelection {
        ColumnSelection::new(vec![
            ColumnDescriptor::attribute("start_time"),
            ColumnDescriptor::tag("mlflow.user"),
            ColumnDescriptor::metric("acc"),
            ColumnDescriptor::param("lr"),
        ])
    }

    /// A finished run started at 2023-11-14 22:13:20 UTC.
    pub fn finished_run() -> Run {
        Run {
            info: serde_json::from_value(json!({
                "run_uuid": "5f0c2c3b",
                "experiment_id": EXPERIMENT_ID,
                "status": "FINISHED",
                "start_time": "1700000000000",
                "end_time": "1700000090000",
                "artifact_uri": "file:///tmp/mlruns/42/5f0c2c3b/artifacts",
            }))
            .unwrap_or_default(),
            data: Some(RunData {
                tags: vec![KeyValue::new("mlflow.user", "ana")],
                metrics: vec![KeyValue::new("acc", 0.93)],
                params: vec![KeyValue::new("lr", "0.01")],
            }),
        }
    }

    /// A run whose data block was projected away entirely.
    pub fn bare_run() -> Run {
        Run {
            info: serde_json::from_value(json!({
                "run_uuid": "0b7d1e22",
                "status": "RUNNING",
                "start_time": "1700000000000",
            }))
            .unwrap_or_default(),
            data: None,
        }
    }

    pub fn response(runs: Vec<Run>, total_run_count: u64) -> SearchRunsResponse {
        SearchRunsResponse {
            runs: Some(runs),
            total_run_count,
            next_page_token: None,
        }
    }

    pub fn first_page(page_size: u32) -> TableRequestState {
        TableRequestState::new(0, page_size)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over requests and pages.

    use super::*;

    /// Assert the three whitelists of a request.
    #[track_caller]
    pub fn assert_whitelists(
        request: &SearchRunsRequest,
        tags: &[&str],
        metrics: &[&str],
        params: &[&str],
    ) {
        assert_eq!(request.tags_whitelist.fields, tags, "tags whitelist");
        assert_eq!(request.metrics_whitelist.fields, metrics, "metrics whitelist");
        assert_eq!(request.params_whitelist.fields, params, "params whitelist");
    }

    /// Assert a page is the empty single-page result of a failed fetch.
    #[track_caller]
    pub fn assert_failed_page(page: &GridPage) {
        assert!(page.error.is_some(), "Expected an error, got: {:?}", page);
        assert!(page.rows.is_empty(), "Failed page must have no rows");
        assert_eq!(page.pages, 1, "Failed page must report one page");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_serves_queue_then_default() {
        let service = MockRunService::new().with_search(fixtures::response(vec![], 7));
        service.push_search(Err(ServiceError::transport("down")));

        let request = runboard_core::build_search_request(
            fixtures::EXPERIMENT_ID,
            &fixtures::first_page(10),
            &fixtures::small_selection(),
            None,
        )
        .unwrap();

        assert!(service.search_runs(&request).await.is_err());
        let response = service.search_runs(&request).await.unwrap();
        assert_eq!(response.total_run_count, 7);
        assert_eq!(service.search_calls().len(), 2);
        assert_eq!(service.last_search(), Some(request));
    }

    #[tokio::test]
    async fn mock_records_column_calls() {
        let service = MockRunService::new().with_columns(fixtures::small_catalog());
        let names = service.list_columns("9").await.unwrap();
        assert_eq!(names, fixtures::small_catalog());
        assert_eq!(service.column_calls(), vec!["9".to_string()]);
    }

    #[test]
    fn fixtures_parse() {
        assert_eq!(
            fixtures::finished_run().info.get("status"),
            Some(&serde_json::json!("FINISHED"))
        );
        assert!(fixtures::bare_run().data.is_none());
    }
}

//! The search service the grid reads from.

use crate::error::ServiceError;
use crate::protocol::{ColumnNames, SearchRunsRequest, SearchRunsResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Remote run store.
///
/// Implementations perform exactly one request per call: no retries and no
/// caching.
#[async_trait]
pub trait RunService: Send + Sync {
    /// Column names available in one collection.
    async fn list_columns(&self, experiment_id: &str) -> Result<ColumnNames, ServiceError>;

    async fn search_runs(
        &self,
        request: &SearchRunsRequest,
    ) -> Result<SearchRunsResponse, ServiceError>;
}

#[async_trait]
impl<T: RunService + ?Sized> RunService for Arc<T> {
    async fn list_columns(&self, experiment_id: &str) -> Result<ColumnNames, ServiceError> {
        (**self).list_columns(experiment_id).await
    }

    async fn search_runs(
        &self,
        request: &SearchRunsRequest,
    ) -> Result<SearchRunsResponse, ServiceError> {
        (**self).search_runs(request).await
    }
}

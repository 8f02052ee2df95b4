//! REST transport for the run search service.

use crate::config::GridConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use runboard_core::{ColumnNames, RunService, SearchRunsRequest, SearchRunsResponse, ServiceError};
use serde::Deserialize;
use std::time::Duration;

pub const COLUMNS_PATH: &str = "/api/2.0/mlflow/experiments/columns";
pub const SEARCH_PATH: &str = "/api/2.0/mlflow/runs/search";

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{code}: {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Config error: {0}")]
    Config(String),
}

impl From<RestError> for ServiceError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Http(err) if err.is_decode() => ServiceError::malformed(err.to_string()),
            RestError::Http(err) => ServiceError::transport(err.to_string()),
            RestError::Serde(err) => ServiceError::malformed(err.to_string()),
            RestError::Remote {
                status,
                code,
                message,
            } => ServiceError::Rejected {
                status,
                code,
                message,
            },
            RestError::Status { status, body } => ServiceError::Rejected {
                status,
                code: "HTTP_ERROR".to_string(),
                message: body,
            },
            RestError::Config(reason) => ServiceError::transport(reason),
        }
    }
}

/// Error body the service sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct RemoteError {
    error_code: String,
    message: String,
}

#[derive(Clone)]
pub struct RestRunService {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl RestRunService {
    pub fn new(config: &GridConfig) -> Result<Self, RestError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let auth_header = build_auth_headers(config.auth.bearer_token.as_deref())?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, RestError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(url)
            .headers(self.auth_header.clone())
            .query(query)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, RestError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .json(body)
            .send()
            .await?;
        parse_response(response).await
    }
}

#[async_trait]
impl RunService for RestRunService {
    async fn list_columns(&self, experiment_id: &str) -> Result<ColumnNames, ServiceError> {
        let names: ColumnNames = self
            .get_json(COLUMNS_PATH, &[("experiment_id", experiment_id)])
            .await?;
        Ok(names)
    }

    async fn search_runs(
        &self,
        request: &SearchRunsRequest,
    ) -> Result<SearchRunsResponse, ServiceError> {
        let response: SearchRunsResponse = self.post_json(SEARCH_PATH, request).await?;
        Ok(response)
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RestError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let text = response.text().await?;
        Err(classify_failure(status.as_u16(), text))
    }
}

fn classify_failure(status: u16, body: String) -> RestError {
    match serde_json::from_str::<RemoteError>(&body) {
        Ok(remote) => RestError::Remote {
            status,
            code: remote.error_code,
            message: remote.message,
        },
        Err(_) => RestError::Status { status, body },
    }
}

fn build_auth_headers(bearer_token: Option<&str>) -> Result<HeaderMap, RestError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = bearer_token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| RestError::Config(format!("Invalid bearer token: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

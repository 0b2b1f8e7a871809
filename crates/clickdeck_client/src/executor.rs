use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use clickdeck_core::CancelToken;

/// Output format requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
}

impl OutputFormat {
    /// The `FORMAT` clause keyword for this format.
    pub fn keyword(&self) -> &'static str {
        match self {
            OutputFormat::Json => "JSON",
        }
    }
}

/// One query handed to the executor.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub sql: String,
    pub format: OutputFormat,

    /// Cancellation token the executor must honor: once cancelled, the
    /// request resolves with [`ExecuteError::Aborted`] as soon as possible.
    pub cancel: CancelToken,
}

impl QueryRequest {
    pub fn new(sql: impl Into<String>, cancel: CancelToken) -> Self {
        Self {
            sql: sql.into(),
            format: OutputFormat::Json,
            cancel,
        }
    }
}

/// Raw HTTP envelope returned by the executor.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub data: serde_json::Value,
}

impl QueryResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The row array of a `FORMAT JSON` response body.
    pub fn rows(&self) -> Option<&Vec<serde_json::Value>> {
        self.data.get("data")?.as_array()
    }
}

/// Errors an executor implementation can resolve with.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The request's cancellation token fired before completion.
    #[error("request aborted")]
    Aborted,

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Http { status: u16, body: serde_json::Value },
}

/// Boundary to the query-execution collaborator.
///
/// The schema loader's only contract with implementations: honor the
/// request's cancellation token and return status, headers and a JSON body
/// whose `data` member is an array of rows. Timeouts are the executor's
/// responsibility.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, req: QueryRequest) -> Result<QueryResponse, ExecuteError>;
}

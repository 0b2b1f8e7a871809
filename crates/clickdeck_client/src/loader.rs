use std::sync::{Arc, Mutex};

use clickdeck_core::{CancelToken, SchemaRow};

use crate::error::{LoadError, compose_query_error};
use crate::executor::{ExecuteError, QueryExecutor, QueryRequest, QueryResponse};
use crate::introspect::{INTROSPECTION_SQL, SERVER_DISPLAY_NAME_HEADER};

const BASE_ERROR: &str = "Failed to load database schema";

/// Successful load result: flat rows plus the optional server display name
/// read from the response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaPayload {
    pub rows: Vec<SchemaRow>,
    pub server_display_name: Option<String>,
}

#[derive(Default)]
struct LoaderState {
    /// Token of the in-flight load, if any. At most one is live per loader.
    token: Option<CancelToken>,

    /// Monotonic load counter; a finished load applies its result only if
    /// its generation is still current.
    generation: u64,
}

/// Single-flight owner of the schema introspection request.
///
/// Starting a new load cancels any previous one from the same instance, and
/// a superseded load resolves as [`LoadError::Cancelled`] even when the
/// underlying request produced data, so callers never apply stale results.
/// Consumers call [`SchemaLoader::abort`] on teardown.
pub struct SchemaLoader {
    executor: Arc<dyn QueryExecutor>,
    state: Mutex<LoaderState>,
}

impl SchemaLoader {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            executor,
            state: Mutex::new(LoaderState::default()),
        }
    }

    /// Cancels the in-flight load, if any. Idempotent.
    pub fn abort(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = state.token.take() {
            token.cancel();
        }
    }

    /// Runs the introspection query and returns the flat rows.
    ///
    /// Begins by aborting any previous load from this instance.
    pub async fn load(&self) -> Result<SchemaPayload, LoadError> {
        self.abort();

        let (token, generation) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let token = CancelToken::new();
            state.token = Some(token.clone());
            state.generation += 1;
            (token, state.generation)
        };

        log::debug!("loading schema (generation {generation})");

        let request = QueryRequest::new(INTROSPECTION_SQL, token.clone());
        let outcome = self.executor.execute(request).await;

        // A later load (or an abort) supersedes this one: its result, even a
        // successful one, must not be applied.
        let still_current = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let current = state.generation == generation && !token.is_cancelled();
            if current {
                state.token = None;
            }
            current
        };
        if !still_current {
            log::debug!("discarding superseded schema load (generation {generation})");
            return Err(LoadError::Cancelled);
        }

        match outcome {
            Ok(response) if response.is_success() => Self::parse_payload(response),
            Ok(response) => Err(LoadError::Query(compose_query_error(
                BASE_ERROR,
                Some(response.status),
                Some(&response.data),
            ))),
            Err(ExecuteError::Aborted) => Err(LoadError::Cancelled),
            Err(ExecuteError::Http { status, body }) => Err(LoadError::Query(
                compose_query_error(BASE_ERROR, Some(status), Some(&body)),
            )),
            Err(ExecuteError::Transport(message)) => Err(LoadError::Query(compose_query_error(
                &format!("{BASE_ERROR}: {message}"),
                None,
                None,
            ))),
        }
    }

    fn parse_payload(response: QueryResponse) -> Result<SchemaPayload, LoadError> {
        let Some(rows) = response.rows() else {
            return Err(LoadError::Query(compose_query_error(
                &format!("{BASE_ERROR}: response has no data array"),
                None,
                None,
            )));
        };

        let rows: Vec<SchemaRow> =
            serde_json::from_value(serde_json::Value::Array(rows.clone())).map_err(|e| {
                LoadError::Query(compose_query_error(
                    &format!("{BASE_ERROR}: malformed schema rows: {e}"),
                    None,
                    None,
                ))
            })?;

        let server_display_name = response
            .header(SERVER_DISPLAY_NAME_HEADER)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        log::info!(
            "schema loaded: {} rows, server {:?}",
            rows.len(),
            server_display_name
        );

        Ok(SchemaPayload {
            rows,
            server_display_name,
        })
    }
}

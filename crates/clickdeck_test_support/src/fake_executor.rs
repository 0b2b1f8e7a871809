use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use clickdeck_client::{
    ExecuteError, QueryExecutor, QueryRequest, QueryResponse, SERVER_DISPLAY_NAME_HEADER,
};

/// Scripted outcome for one executed request, consumed in order.
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    /// HTTP 200 with the given JSON body.
    Body(serde_json::Value),
    Http { status: u16, body: serde_json::Value },
    Transport(String),
}

#[derive(Debug, Clone, Default)]
pub struct FakeExecutorStats {
    pub executed_sql: Vec<String>,
    pub aborted_requests: usize,
}

#[derive(Default)]
struct FakeExecutorState {
    outcomes: Mutex<VecDeque<FakeOutcome>>,
    executed_sql: Mutex<Vec<String>>,
    aborted_requests: AtomicUsize,
    display_name: Mutex<Option<String>>,
}

/// Release handle for an executor built with [`FakeExecutor::held`].
///
/// Requests block after being recorded until `release()` is called,
/// letting tests interleave loads deterministically.
pub struct HoldGate {
    release: watch::Sender<bool>,
}

impl HoldGate {
    pub fn release(&self) {
        let _ = self.release.send(true);
    }
}

/// In-memory [`QueryExecutor`] with scripted outcomes and recorded calls.
#[derive(Clone)]
pub struct FakeExecutor {
    state: Arc<FakeExecutorState>,
    hold: Option<watch::Receiver<bool>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(FakeExecutorState::default()),
            hold: None,
        }
    }

    /// Executor whose requests block until the returned gate is released.
    pub fn held() -> (Self, HoldGate) {
        let (tx, rx) = watch::channel(false);
        let mut executor = Self::new();
        executor.hold = Some(rx);
        (executor, HoldGate { release: tx })
    }

    pub fn push_outcome(&self, outcome: FakeOutcome) {
        self.state
            .outcomes
            .lock()
            .unwrap()
            .push_back(outcome);
    }

    pub fn push_body(&self, body: serde_json::Value) {
        self.push_outcome(FakeOutcome::Body(body));
    }

    /// Sets the display-name header attached to successful responses.
    pub fn with_display_name(self, name: impl Into<String>) -> Self {
        *self.state.display_name.lock().unwrap() = Some(name.into());
        self
    }

    pub fn stats(&self) -> FakeExecutorStats {
        FakeExecutorStats {
            executed_sql: self.state.executed_sql.lock().unwrap().clone(),
            aborted_requests: self.state.aborted_requests.load(Ordering::SeqCst),
        }
    }
}

impl Default for FakeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryExecutor for FakeExecutor {
    async fn execute(&self, req: QueryRequest) -> Result<QueryResponse, ExecuteError> {
        self.state.executed_sql.lock().unwrap().push(req.sql.clone());

        if let Some(gate) = &self.hold {
            let mut gate = gate.clone();
            while !*gate.borrow() {
                if gate.changed().await.is_err() {
                    break;
                }
            }
        }

        if req.cancel.is_cancelled() {
            self.state.aborted_requests.fetch_add(1, Ordering::SeqCst);
            return Err(ExecuteError::Aborted);
        }

        let outcome = self
            .state
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FakeOutcome::Transport("no scripted outcome".to_string()));

        match outcome {
            FakeOutcome::Body(body) => {
                let mut headers = HashMap::new();
                if let Some(name) = self.state.display_name.lock().unwrap().clone() {
                    headers.insert(SERVER_DISPLAY_NAME_HEADER.to_string(), name);
                }
                Ok(QueryResponse {
                    status: 200,
                    headers,
                    data: body,
                })
            }
            FakeOutcome::Http { status, body } => Err(ExecuteError::Http { status, body }),
            FakeOutcome::Transport(message) => Err(ExecuteError::Transport(message)),
        }
    }
}

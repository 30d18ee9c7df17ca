//! Scripted transport for unit tests

use async_trait::async_trait;
use kanban_core::Operation;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::Semaphore;

use crate::error::{ClientError, Result};
use crate::transport::Transport;

/// Replays queued responses per operation name and records every call
///
/// A gated transport holds each call until [`release`](Self::release) hands
/// out a permit, which lets tests observe the pending state deterministically.
pub(crate) struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
    calls: Mutex<Vec<Operation>>,
    gate: Option<Semaphore>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub(crate) fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// Queues the next response for operations named `name`
    pub(crate) fn respond(&self, name: &str, response: Result<Value>) {
        self.responses
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push_back(response);
    }

    /// Lets `calls` held calls complete
    pub(crate) fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub(crate) fn calls_to(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|op| op.name() == name)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, operation: &Operation) -> Result<Value> {
        self.calls.lock().unwrap().push(operation.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        self.responses
            .lock()
            .unwrap()
            .get_mut(operation.name())
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ClientError::api_error(
                    500,
                    format!("no scripted response for {}", operation.name()),
                ))
            })
    }
}

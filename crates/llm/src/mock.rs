//! In-process LLM clients for tests and offline runs.
//!
//! `ScriptedClient` replays a fixed list of completions and records every
//! request it receives; `FailingClient` always returns an `AppError::Llm`.

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use meridian_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays scripted completions in order.
///
/// Once the script runs out, the last reply is repeated. An empty script
/// yields an `AppError::Llm`.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client that answers every request with the same text.
    pub fn always(reply: impl Into<String>) -> Self {
        Self::new([reply.into()])
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of completions served.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn next_reply(&self) -> Option<String> {
        let mut replies = self.replies.lock().ok()?;
        let mut last = self.last.lock().ok()?;
        match replies.pop_front() {
            Some(reply) => {
                *last = Some(reply.clone());
                Some(reply)
            }
            None => last.clone(),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        self.next_reply()
            .map(|content| LlmResponse::text(content, request.model.clone()))
            .ok_or_else(|| AppError::Llm("scripted client has no replies".to_string()))
    }
}

/// Fails every request, like a backend that is unreachable.
pub struct FailingClient {
    message: String,
}

impl FailingClient {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for FailingClient {
    fn provider_name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        Err(AppError::Llm(self.message.clone()))
    }
}

//! Mock Transport
//!
//! For tests and demos. Serves scripted envelopes in order and records
//! every request it receives.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use super::{BackendTransport, Envelope};
use crate::error::BackendError;

/// A request seen by the mock
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    pub endpoint: Url,
    pub body: Value,
}

/// Scripted transport
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<Envelope, BackendError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a success envelope whose message is `payload` encoded as JSON text
    ///
    /// # Panics
    ///
    /// If `payload` cannot be represented as JSON.
    #[must_use]
    pub fn reply_success(self, payload: &impl Serialize) -> Self {
        let message =
            serde_json::to_string(payload).expect("scripted payload must serialize to JSON");
        self.reply(Envelope::success(message))
    }

    /// Queue a failure envelope
    #[must_use]
    pub fn reply_failure(self, message: impl Into<String>) -> Self {
        self.reply(Envelope::failure(message))
    }

    /// Queue an arbitrary envelope
    #[must_use]
    pub fn reply(self, envelope: Envelope) -> Self {
        self.push(Ok(envelope));
        self
    }

    /// Queue a transport-level failure
    #[must_use]
    pub fn reply_error(self, error: BackendError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<Envelope, BackendError>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// Number of requests received so far
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl BackendTransport for MockTransport {
    async fn post_json(&self, endpoint: &Url, body: &Value) -> Result<Envelope, BackendError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                endpoint: endpoint.clone(),
                body: body.clone(),
            });

        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Transport("no scripted reply".into())))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

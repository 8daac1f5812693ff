//! Backend Transport
//!
//! The network exchange itself is a single call-and-await JSON POST.
//! Implementations must not retry and must not impose a timeout.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockTransport, RecordedRequest};

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BackendError;

/// Response envelope returned by every backend endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,

    /// Double-encoded JSON payload on success, plain text on failure
    #[serde(default)]
    pub message: String,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// Unwrap the message, turning a failure envelope into `Rejected`
    pub fn into_message(self) -> Result<String, BackendError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(BackendError::Rejected(self.message))
        }
    }
}

/// Transport trait (Strategy pattern)
///
/// `HttpTransport` talks to the real backend, `MockTransport` serves
/// scripted envelopes in tests.
#[async_trait]
pub trait BackendTransport: Send + Sync {
    /// POST `body` as JSON and decode the response envelope
    async fn post_json(&self, endpoint: &Url, body: &Value) -> Result<Envelope, BackendError>;

    /// Transport name, for logging
    fn name(&self) -> &str;
}

//! HTTP Transport
//!
//! reqwest-backed transport. The default client has no request timeout,
//! so a hung backend hangs the flow; callers needing a deadline wrap the
//! future themselves.

use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde_json::Value;

use super::{BackendTransport, Envelope};
use crate::error::BackendError;

pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Use a preconfigured client (proxies, TLS roots, ...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BackendTransport for HttpTransport {
    async fn post_json(&self, endpoint: &Url, body: &Value) -> Result<Envelope, BackendError> {
        let response = self
            .client
            .post(endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(endpoint = %endpoint, status = %status, "Backend responded");

        // Failure envelopes may arrive with a non-2xx status; the envelope decides.
        response
            .json::<Envelope>()
            .await
            .map_err(|e| BackendError::Transport(format!("invalid response ({status}): {e}")))
    }

    fn name(&self) -> &str {
        "http"
    }
}

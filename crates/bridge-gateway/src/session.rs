//! License Sessions
//!
//! A caller-owned holder for the most recently acquired license bundle.
//! Each checkout flow constructs its own session and passes it along, so
//! independent flows never share state.
//!
//! `acquire` takes `&mut self`, which rules out two acquisitions racing on
//! the same session. Code that shares a session between tasks keeps it
//! behind a `tokio::sync::Mutex` and uses `try_lock`, turning a second
//! concurrent acquisition into [`BridgeError::SessionBusy`].

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bridge_core::{LicenseBundle, Order};

use crate::error::{BridgeError, Result};
use crate::gateway::{BackendGateway, FinalizeRequest, StoreLicenses};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Most recent license bundle for one checkout flow
#[derive(Clone, Debug, Default)]
pub struct LicenseSession {
    id: SessionId,
    held: Option<LicenseBundle>,
    acquired_at: Option<DateTime<Utc>>,
}

impl LicenseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Bundle from the last successful acquisition
    pub fn licenses(&self) -> Option<&LicenseBundle> {
        self.held.as_ref()
    }

    pub fn acquired_at(&self) -> Option<DateTime<Utc>> {
        self.acquired_at
    }

    /// Submit `order` in direct mode and hold the issued bundle.
    ///
    /// A failed attempt leaves the previously held bundle in place.
    pub async fn acquire(
        &mut self,
        gateway: &BackendGateway,
        order: &Order,
        endpoint: &Url,
    ) -> Result<()> {
        gateway
            .submit(order, endpoint, StoreLicenses::new(&mut self.held))
            .await?;

        self.acquired_at = Some(Utc::now());
        tracing::info!(session_id = %self.id, "Acquired licenses");
        Ok(())
    }

    /// Post `{licenses, details}` to the finalize endpoint.
    ///
    /// The held bundle is kept either way; clearing it is up to the caller.
    pub async fn finalize<D: Serialize + Sync>(
        &self,
        gateway: &BackendGateway,
        details: &D,
        endpoint: &Url,
    ) -> Result<()> {
        if self.held.is_none() {
            tracing::warn!(session_id = %self.id, "Finalizing without acquired licenses");
        }

        let request = FinalizeRequest {
            licenses: self.held.as_ref(),
            details,
        };
        gateway.finalize(endpoint, &request).await
    }

    /// Drop the held bundle
    pub fn clear(&mut self) {
        self.held = None;
        self.acquired_at = None;
    }
}

/// Acquire on a shared session, rejecting overlap instead of racing
pub async fn acquire_exclusive(
    session: &tokio::sync::Mutex<LicenseSession>,
    gateway: &BackendGateway,
    order: &Order,
    endpoint: &Url,
) -> Result<LicenseBundle> {
    let mut guard = session.try_lock().map_err(|_| BridgeError::SessionBusy)?;
    guard.acquire(gateway, order, endpoint).await?;
    Ok(guard.licenses().cloned().unwrap_or_default())
}

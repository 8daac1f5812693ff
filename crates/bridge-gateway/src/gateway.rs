//! Backend Gateway
//!
//! Validates an order, posts it to the license backend once, and unwraps
//! the `{ success, message }` envelope. What happens to a successful
//! payload is decided by the caller's [`CompletionHandler`].

use std::sync::Arc;

use bridge_core::{LicenseBundle, LicenseRepacker, Order, OrderValidator};
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{BackendError, Result};
use crate::transport::{BackendTransport, HttpTransport};

/// Consumes the decoded payload of a successful submission
pub trait CompletionHandler {
    /// Shape of the double-encoded `message`
    type Payload: DeserializeOwned;

    /// What the gateway returns to its caller
    type Output;

    fn complete(self, payload: Self::Payload) -> Result<Self::Output>;
}

/// Direct mode: store the issued bundle into a caller-owned slot
pub struct StoreLicenses<'a> {
    slot: &'a mut Option<LicenseBundle>,
}

impl<'a> StoreLicenses<'a> {
    pub fn new(slot: &'a mut Option<LicenseBundle>) -> Self {
        Self { slot }
    }
}

impl CompletionHandler for StoreLicenses<'_> {
    type Payload = LicenseBundle;
    type Output = ();

    fn complete(self, bundle: LicenseBundle) -> Result<()> {
        tracing::info!(
            products = bundle.len(),
            licenses = bundle.license_count(),
            "Stored issued licenses"
        );
        *self.slot = Some(bundle);
        Ok(())
    }
}

/// Webhook mode: repack the returned order into one item per license
pub struct RepackLicenses;

impl CompletionHandler for RepackLicenses {
    type Payload = Order;
    type Output = Order;

    fn complete(self, order: Order) -> Result<Order> {
        Ok(LicenseRepacker::repack(&order)?)
    }
}

/// Body posted to the finalize endpoint
#[derive(Debug, Serialize)]
pub struct FinalizeRequest<'a, D: Serialize> {
    /// `null` when no licenses have been acquired
    pub licenses: Option<&'a LicenseBundle>,
    pub details: &'a D,
}

/// License backend gateway
#[derive(Clone)]
pub struct BackendGateway {
    transport: Arc<dyn BackendTransport>,
}

impl BackendGateway {
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self { transport }
    }

    /// Gateway over a plain reqwest client
    pub fn http() -> Self {
        Self::new(Arc::new(HttpTransport::new()))
    }

    /// Validate and submit `order`, then hand the decoded payload to `handler`.
    ///
    /// A validation failure returns before the transport is touched.
    pub async fn submit<H: CompletionHandler>(
        &self,
        order: &Order,
        endpoint: &Url,
        handler: H,
    ) -> Result<H::Output> {
        OrderValidator::validate(order)?;

        tracing::info!(
            reference_id = ?order.reference_id(),
            items = order.items().len(),
            endpoint = %endpoint,
            transport = self.transport.name(),
            "Submitting order to license backend"
        );

        let message = self.exchange(endpoint, order).await?;
        let payload: H::Payload =
            serde_json::from_str(&message).map_err(|e| BackendError::Decode(e.to_string()))?;

        handler.complete(payload)
    }

    /// Post a finalize body. The success message is ignored.
    pub async fn finalize<D: Serialize + Sync>(
        &self,
        endpoint: &Url,
        request: &FinalizeRequest<'_, D>,
    ) -> Result<()> {
        tracing::info!(
            endpoint = %endpoint,
            has_licenses = request.licenses.is_some(),
            "Finalizing order with license backend"
        );

        self.exchange(endpoint, request).await?;
        Ok(())
    }

    async fn exchange<B: Serialize + ?Sized>(&self, endpoint: &Url, body: &B) -> Result<String> {
        let body =
            serde_json::to_value(body).map_err(|e| BackendError::Transport(e.to_string()))?;

        let outcome = self
            .transport
            .post_json(endpoint, &body)
            .await
            .and_then(crate::transport::Envelope::into_message);

        if let Err(err) = &outcome {
            tracing::warn!(endpoint = %endpoint, error = %err, "License backend call failed");
        }
        Ok(outcome?)
    }
}

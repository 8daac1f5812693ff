//! # bridge-gateway
//!
//! License backend gateway for license-bridge.
//!
//! ## Integration Modes
//!
//! ### 1. Direct mode
//!
//! The caller submits the order and receives the license bundle straight
//! from the backend. The bundle is held by a caller-owned
//! [`LicenseSession`] until the order is finalized.
//!
//! ```text
//! ┌──────────┐  Order   ┌─────────────┐  {success, message}  ┌────────────────┐
//! │  Caller  │─────────▶│   Backend   │─────────────────────▶│ LicenseSession │
//! └──────────┘          └─────────────┘                      └────────────────┘
//! ```
//!
//! ### 2. Webhook mode
//!
//! The backend returns the order with issued keys attached. It is repacked
//! into one line item per key and handed to the payment provider, which
//! later delivers it back to the backend through its own webhook.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_gateway::{BackendGateway, BridgeConfig, LicenseSession};
//!
//! let config = BridgeConfig::from_env()?;
//! let gateway = BackendGateway::http();
//! let mut session = LicenseSession::new();
//!
//! session.acquire(&gateway, &order, &config.submit_url).await?;
//! session.finalize(&gateway, &details, &config.finalize_url).await?;
//! ```

mod config;
mod error;
mod gateway;
mod session;
pub mod transport;

pub use config::{BridgeConfig, DEFAULT_MAX_SESSIONS};
pub use error::{BackendError, BridgeError, Result, SchemaError};
pub use gateway::{BackendGateway, CompletionHandler, FinalizeRequest, RepackLicenses, StoreLicenses};
pub use session::{LicenseSession, SessionId, acquire_exclusive};
pub use transport::{BackendTransport, Envelope, HttpTransport, MockTransport};

pub use reqwest::Url;

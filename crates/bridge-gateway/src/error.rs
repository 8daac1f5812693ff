//! Bridge Error Types

use thiserror::Error;

pub use bridge_core::SchemaError;

/// Result type alias
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failures reported by, or while talking to, the license backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend answered with `success: false`; the message is kept verbatim
    #[error("Backend rejected request: {0}")]
    Rejected(String),

    /// Network failure or a response that is not a JSON envelope
    #[error("Backend transport error: {0}")]
    Transport(String),

    /// Success envelope whose payload does not match the expected shape
    #[error("Backend payload decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Transport(err.to_string())
    }
}

/// Errors surfaced by a checkout flow attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Order failed local validation; nothing was sent
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Another acquisition is already running on this session
    #[error("Session busy: an acquisition is already in flight")]
    SessionBusy,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Whether the failure happened before any request left the process
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            BridgeError::Schema(_) | BridgeError::SessionBusy | BridgeError::Config(_)
        )
    }

    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Schema(_) => "SCHEMA_ERROR",
            BridgeError::Backend(BackendError::Rejected(_)) => "BACKEND_REJECTED",
            BridgeError::Backend(_) => "BACKEND_UNAVAILABLE",
            BridgeError::SessionBusy => "SESSION_BUSY",
            BridgeError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Message suitable for the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            BridgeError::Schema(err) => format!("The order is incomplete: {err}"),
            BridgeError::Backend(BackendError::Rejected(msg)) => msg.clone(),
            BridgeError::Backend(_) => "The license service could not be reached.".into(),
            BridgeError::SessionBusy => "A license request is already in progress.".into(),
            BridgeError::Config(_) => "Service configuration error.".into(),
        }
    }
}

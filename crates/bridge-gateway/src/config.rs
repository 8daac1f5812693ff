//! Bridge Configuration

use reqwest::Url;

use crate::error::{BridgeError, Result};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Endpoints and defaults for one deployment
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Backend endpoint receiving orders
    pub submit_url: Url,

    /// Backend endpoint receiving `{licenses, details}`
    pub finalize_url: Url,

    /// Currency applied to every built order
    pub currency: String,

    /// Server listen address
    pub bind_addr: String,

    /// Upper bound on concurrently open license sessions
    pub max_sessions: usize,
}

impl BridgeConfig {
    pub fn new(submit_url: Url, finalize_url: Url) -> Self {
        Self {
            submit_url,
            finalize_url,
            currency: DEFAULT_CURRENCY.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from any key lookup (environment, test map, ...)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = |key: &str| -> Result<Url> {
            let raw = lookup(key).ok_or_else(|| BridgeError::Config(format!("{key} not set")))?;
            Url::parse(&raw).map_err(|e| BridgeError::Config(format!("{key} is not a URL: {e}")))
        };

        let mut config = Self::new(url("BRIDGE_SUBMIT_URL")?, url("BRIDGE_FINALIZE_URL")?);
        if let Some(currency) = lookup("BRIDGE_CURRENCY") {
            config.currency = currency;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(max) = lookup("BRIDGE_MAX_SESSIONS") {
            config.max_sessions = max.parse().map_err(|e| {
                BridgeError::Config(format!("BRIDGE_MAX_SESSIONS is not a count: {e}"))
            })?;
        }
        Ok(config)
    }
}

//! Application State

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use bridge_core::OrderBuilder;
use bridge_gateway::{
    BackendGateway, BridgeConfig, DEFAULT_MAX_SESSIONS, LicenseSession, SessionId,
};
use tokio::sync::Mutex;

/// A session shared between request handlers
pub type SharedSession = Arc<Mutex<LicenseSession>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// License backend gateway
    pub gateway: BackendGateway,

    /// Builds orders in the configured currency
    pub builder: OrderBuilder,

    /// Backend endpoints
    pub config: Arc<BridgeConfig>,

    /// Live license sessions
    pub sessions: Arc<MemorySessionStore>,
}

impl AppState {
    pub fn new(gateway: BackendGateway, config: BridgeConfig) -> Self {
        Self {
            gateway,
            builder: OrderBuilder::new(config.currency.clone()),
            sessions: Arc::new(MemorySessionStore::with_capacity(config.max_sessions)),
            config: Arc::new(config),
        }
    }
}

/// In-memory session store.
///
/// A session lives until its client ends it or the process exits; nothing
/// expires on its own. `capacity` bounds how many may be open at once, and
/// `create` refuses new sessions beyond it.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
    capacity: usize,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Start a new session and return its id, or `None` when the store is full
    pub fn create(&self) -> Option<SessionId> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions.len() >= self.capacity {
            return None;
        }

        let session = LicenseSession::new();
        let id = session.id().clone();
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        Some(id)
    }

    pub fn get(&self, id: &SessionId) -> Option<SharedSession> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// End a session, dropping its held licenses
    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

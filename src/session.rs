// ⏳ Call Keep-Alive
// A session gets ONE override that stops the call from being hung up early
// when the caller is still engaged.
//
// The store is injected (Arc<dyn KeepAliveStore>) rather than a process-wide
// map, so handlers and tests each own their state.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

// ============================================================================
// STORE TRAIT
// ============================================================================

pub trait KeepAliveStore: Send + Sync {
    /// Record the override. Returns true only the first time for a session.
    fn grant(&self, session_id: &str) -> bool;

    fn is_granted(&self, session_id: &str) -> bool;

    /// Forget the session (call ended). Returns whether it was known.
    fn release(&self, session_id: &str) -> bool;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Grant times keyed by session id. No eviction, no durability.
#[derive(Debug, Default)]
pub struct InMemoryKeepAlive {
    granted: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryKeepAlive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn granted_at(&self, session_id: &str) -> Option<DateTime<Utc>> {
        let granted = self.granted.read().unwrap_or_else(|e| e.into_inner());
        granted.get(session_id).copied()
    }

    pub fn count(&self) -> usize {
        let granted = self.granted.read().unwrap_or_else(|e| e.into_inner());
        granted.len()
    }
}

impl KeepAliveStore for InMemoryKeepAlive {
    fn grant(&self, session_id: &str) -> bool {
        let mut granted = self.granted.write().unwrap_or_else(|e| e.into_inner());

        if granted.contains_key(session_id) {
            return false;
        }

        granted.insert(session_id.to_string(), Utc::now());
        true
    }

    fn is_granted(&self, session_id: &str) -> bool {
        let granted = self.granted.read().unwrap_or_else(|e| e.into_inner());
        granted.contains_key(session_id)
    }

    fn release(&self, session_id: &str) -> bool {
        let mut granted = self.granted.write().unwrap_or_else(|e| e.into_inner());
        granted.remove(session_id).is_some()
    }
}

// ============================================================================
// DECISION
// ============================================================================

/// Keep the call alive only for an engaged caller who hasn't used the override yet
pub fn should_keep_alive(store: &dyn KeepAliveStore, session_id: &str, engaged: bool) -> bool {
    if !engaged {
        debug!(session_id, "No engagement signal, keep-alive not granted");
        return false;
    }

    let granted = store.grant(session_id);
    if granted {
        info!(session_id, "Keep-alive override granted");
    } else {
        debug!(session_id, "Keep-alive override already used");
    }

    granted
}

//! Durable-across-reload client state storage.
//!
//! The browser's ambient storage is wrapped behind an injectable key-value
//! interface so the flow logic can run against an in-memory fake in tests.
//! No concurrency control: a single tab is the implicit model.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::flow::state::{DraftStatus, StoredOptimizationState};
use crate::models::OptimizationDraft;

/// Stored-state entries expire 30 minutes after they are saved.
pub const STATE_EXPIRATION_MS: i64 = 30 * 60 * 1000;

const STATE_KEY: &str = "pendingOptimization";
const RETURN_INTENT_KEY: &str = "authReturnPath";

/// Minimal string key-value storage, the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// The post-auth return destination.
///
/// Set immediately before navigating to login/signup when payment was
/// interrupted by the auth gate; cleared the moment it is consumed. Unlike
/// the stored optimization state it has no expiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnIntent {
    pub target: String,
}

/// Typed access to the two flow storage keys.
pub struct FlowStorage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> FlowStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Overwrite the single stored optimization state (last write wins).
    pub fn save_state(
        &self,
        draft: &OptimizationDraft,
        status: DraftStatus,
        paid: bool,
        payment_pending: bool,
        now_ms: i64,
    ) {
        let state = StoredOptimizationState {
            draft: draft.clone(),
            status,
            paid,
            payment_pending,
            saved_at_ms: now_ms,
        };
        match serde_json::to_string(&state) {
            Ok(json) => self.store.set(STATE_KEY, &json),
            Err(e) => tracing::error!("Failed to serialize stored state: {}", e),
        }
    }

    /// Read the stored state, or `None` if absent or expired.
    ///
    /// Eviction is lazy: an expired (or unreadable) entry is deleted here,
    /// on read, not by any timer.
    pub fn state(&self, now_ms: i64) -> Option<StoredOptimizationState> {
        let raw = self.store.get(STATE_KEY)?;
        let state: StoredOptimizationState = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Discarding unreadable stored state: {}", e);
                self.store.remove(STATE_KEY);
                return None;
            }
        };

        if state.expired(now_ms, STATE_EXPIRATION_MS) {
            self.store.remove(STATE_KEY);
            return None;
        }

        Some(state)
    }

    pub fn clear_state(&self) {
        self.store.remove(STATE_KEY);
    }

    pub fn set_return_intent(&self, intent: &ReturnIntent) {
        match serde_json::to_string(intent) {
            Ok(json) => self.store.set(RETURN_INTENT_KEY, &json),
            Err(e) => tracing::error!("Failed to serialize return intent: {}", e),
        }
    }

    pub fn return_intent(&self) -> Option<ReturnIntent> {
        let raw = self.store.get(RETURN_INTENT_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Consume the return intent: read it and clear it in one step.
    pub fn take_return_intent(&self) -> Option<ReturnIntent> {
        let intent = self.return_intent();
        if intent.is_some() {
            self.clear_return_intent();
        }
        intent
    }

    pub fn clear_return_intent(&self) {
        self.store.remove(RETURN_INTENT_KEY);
    }
}

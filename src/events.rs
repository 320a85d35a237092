//! Change listeners for configuration reloads
//!
//! Listeners are notified once per changed key after a reload has replaced
//! the active configuration.

use crate::resolved::SettingChange;
use crate::sync::RwLockExt;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Type alias for a change callback
pub type ChangeCallback = Arc<dyn Fn(&SettingChange) + Send + Sync>;

/// Manages event listeners for configuration changes
pub struct EventManager {
    /// Global listeners (called for all changes)
    global_listeners: RwLock<Vec<ChangeCallback>>,

    /// Per-key listeners (called only for specific setting changes)
    key_listeners: RwLock<HashMap<String, Vec<ChangeCallback>>>,
}

impl EventManager {
    /// Create a new event manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            global_listeners: RwLock::new(Vec::new()),
            key_listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Register a global change listener (called for every changed key)
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&SettingChange) + Send + Sync + 'static,
    {
        self.global_listeners
            .write_recovered()
            .push(Arc::new(callback));
    }

    /// Register a listener for a specific setting key
    pub fn watch<F>(&self, key: &str, callback: F)
    where
        F: Fn(&SettingChange) + Send + Sync + 'static,
    {
        self.key_listeners
            .write_recovered()
            .entry(key.to_string())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Notify all listeners about a change
    ///
    /// Callbacks are cloned out of the lock first, so a listener may
    /// register further listeners without deadlocking.
    pub fn notify(&self, change: &SettingChange) {
        let mut callbacks: Vec<ChangeCallback> = self.global_listeners.read_recovered().clone();
        if let Some(listeners) = self.key_listeners.read_recovered().get(&change.key) {
            callbacks.extend(listeners.iter().cloned());
        }

        for callback in callbacks {
            callback(change);
        }
    }

    /// Remove all listeners for a specific key
    pub fn unwatch(&self, key: &str) {
        self.key_listeners.write_recovered().remove(key);
    }

    /// Clear all listeners
    pub fn clear(&self) {
        self.global_listeners.write_recovered().clear();
        self.key_listeners.write_recovered().clear();
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("global_listeners", &self.global_listeners.read_recovered().len())
            .field("key_listeners", &self.key_listeners.read_recovered().len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Process-wide keyed storage for the helpdesk client
//!
//! This module provides a string-keyed store that plays the role the
//! browser's local storage plays for the web front end: session attributes
//! are written once at login and read back on every protected-screen
//! activation. All access goes through an async lock; the store itself
//! enforces no schema.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Cloneable handle to the process-wide key-value store
#[derive(Clone, Debug, Default)]
pub struct KeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl KeyValueStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key-value pair, replacing any previous value
    pub async fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
    }

    /// Get a value by key
    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }

    /// Delete a key; removing an absent key is a no-op
    pub async fn delete(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    /// Check whether a key is present
    pub async fn contains(&self, key: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(key)
    }

    /// Remove every key unconditionally
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        debug!("Cleared {} entries from store", removed);
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// Whether the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = KeyValueStore::new();

        store.set("token", "abc123").await;
        assert_eq!(store.get("token").await, Some("abc123".to_string()));

        store.delete("token").await;
        assert_eq!(store.get("token").await, None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = KeyValueStore::new();

        store.set("role", "ROLE_STUDENT").await;
        store.set("role", "ROLE_ADMIN").await;
        assert_eq!(store.get("role").await, Some("ROLE_ADMIN".to_string()));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = KeyValueStore::new();

        store.set("token", "abc").await;
        store.set("exp", "123").await;
        assert_eq!(store.len().await, 2);

        store.clear().await;
        assert!(store.is_empty().await);

        // A second clear on an empty store must also succeed
        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = KeyValueStore::new();
        let handle = store.clone();

        store.set("userId", "42").await;
        assert_eq!(handle.get("userId").await, Some("42".to_string()));
    }
}

//! In-memory token storage.
//!
//! The token lives behind a [`RwLock`] and is lost when the process exits.
//! Use this for tests and for embedding the client where persistence is
//! handled elsewhere.

use std::sync::RwLock;

use super::TokenStorage;

/// Thread-safe, in-memory implementation of [`TokenStorage`].
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: RwLock<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as if persisted by an earlier run.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get_stored(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store(&self, value: Option<&str>) {
        let mut slot = self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = value.filter(|v| !v.is_empty()).map(str::to_string);
    }
}

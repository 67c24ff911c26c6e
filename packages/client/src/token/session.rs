//! The reactive token session shared by every console screen.
//!
//! A [`TokenSession`] is the single source of truth for the access token
//! during one console lifetime. It is passed explicitly to whatever needs the
//! token; there is no process-global instance, so two sessions (two users,
//! two tenants) never see each other's credential.
//!
//! Setting the token writes through to the backing [`TokenStorage`] and then
//! publishes the new value on a [`watch`] channel, so every subscriber sees
//! the change without a separate save step.

use std::sync::Arc;

use tokio::sync::watch;

use super::TokenStorage;

/// Whether a token is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// Reactive holder of the current access token.
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct TokenSession {
    storage: Arc<dyn TokenStorage>,
    tx: Arc<watch::Sender<Option<String>>>,
}

impl TokenSession {
    /// A new session in the [`AuthState::Unauthenticated`] state.
    ///
    /// Nothing is read from `storage` until [`hydrate`](Self::hydrate) runs.
    pub fn new(storage: impl TokenStorage) -> Self {
        Self::with_storage(Arc::new(storage))
    }

    pub fn with_storage(storage: Arc<dyn TokenStorage>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            storage,
            tx: Arc::new(tx),
        }
    }

    /// Load the persisted token and publish it.
    pub fn hydrate(&self) -> AuthState {
        let stored = normalize(self.storage.get_stored());
        self.tx.send_replace(stored);
        self.state()
    }

    /// The token as of now.
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn state(&self) -> AuthState {
        if self.tx.borrow().is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// Persist `value` and publish it. `None` or `""` clears the token.
    pub fn set(&self, value: Option<String>) {
        let value = normalize(value);
        self.storage.store(value.as_deref());
        self.tx.send_replace(value);
    }

    pub fn clear(&self) {
        self.set(None);
    }

    /// Observe every subsequent change to the token.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    /// Display form of the current token, e.g. `ad•••oken`.
    pub fn masked(&self) -> Option<String> {
        self.tx.borrow().as_deref().map(mask)
    }
}

impl std::fmt::Debug for TokenSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSession")
            .field("state", &self.state())
            .field("token", &self.tx.borrow().as_deref().map(redact))
            .finish()
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// [`mask`] for tokens long enough that the marker hides something;
/// shorter ones are hidden entirely.
fn redact(token: &str) -> String {
    if token.chars().count() <= 6 {
        "•••".to_string()
    } else {
        mask(token)
    }
}

/// First two and last four characters around a `•••` marker.
pub fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let head: String = chars.iter().take(2).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}•••{tail}")
}

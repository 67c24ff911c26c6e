//! Durable storage for the single access token.
//!
//! The [`TokenStorage`] trait is one slot: read it, overwrite it, or clear
//! it. Storage failures never reach the caller; they are logged and treated
//! as "no token", so a broken config directory degrades to an
//! unauthenticated console instead of a crash.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`FileTokenStorage`] | The CLI; one file holding the raw token |
//! | [`MemoryTokenStorage`] | Tests and embedding |
//!
//! [`MemoryTokenStorage`]: memory::MemoryTokenStorage

pub mod memory;
pub mod session;

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::ClientConfig;

/// One persisted credential slot.
pub trait TokenStorage: Send + Sync + 'static {
    /// The persisted token, or `None` when absent or unreadable.
    fn get_stored(&self) -> Option<String>;

    /// Overwrite the persisted token. `None` or an empty string deletes it.
    fn store(&self, value: Option<&str>);
}

/// Token persisted as the entire contents of a single file.
///
/// No expiry and no encryption; the file is created with owner-only
/// permissions on Unix.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: Option<PathBuf>,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A store with no durable location. Reads return `None`; writes are dropped.
    pub fn detached() -> Self {
        Self { path: None }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            path: config.token_file.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl TokenStorage for FileTokenStorage {
    fn get_stored(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(raw) => (!raw.is_empty()).then_some(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read stored token");
                None
            }
        }
    }

    fn store(&self, value: Option<&str>) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        match value.filter(|v| !v.is_empty()) {
            None => {
                if let Err(e) = std::fs::remove_file(path) {
                    if e.kind() != ErrorKind::NotFound {
                        warn!(path = %path.display(), error = %e, "failed to remove stored token");
                    }
                }
            }
            Some(token) => {
                if let Err(e) = write_private(path, token) {
                    warn!(path = %path.display(), error = %e, "failed to persist token");
                }
            }
        }
    }
}

fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies on creation; tighten a file left by an older run.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(token.as_bytes())
}

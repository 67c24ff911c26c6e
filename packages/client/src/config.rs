//! Client configuration, populated from environment variables.

use std::path::PathBuf;

use scafold_api::{DEFAULT_API_BASE_URL, TOKEN_HEADER};

/// Runtime configuration for the API client and token store.
///
/// All fields are populated from environment variables with defaults, so the
/// console can start with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `SCAFOLD_API_BASE_URL` | `/api/backend` | Backend base URL, absolute or origin-relative |
/// | `SCAFOLD_ORIGIN` | `http://localhost:3000` | Origin that a relative base URL resolves against |
/// | `SCAFOLD_TOKEN_HEADER` | `X-Scafold-Token` | Header that carries the access token |
/// | `SCAFOLD_TOKEN_FILE` | `<config dir>/scafold/api-token` | File holding the persisted token |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL. A relative value is resolved against [`origin`](Self::origin).
    pub base_url: String,

    /// Console origin, e.g. `"http://localhost:3000"`.
    pub origin: String,

    /// Name of the authentication header.
    pub token_header: String,

    /// Where the credential is persisted.
    /// `None` means there is no durable location: reads yield no token and
    /// writes are dropped.
    pub token_file: Option<PathBuf>,
}

/// Origin assumed when `SCAFOLD_ORIGIN` is not set.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            token_header: TOKEN_HEADER.to_string(),
            token_file: default_token_file(),
        }
    }
}

impl ClientConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: non_empty_var("SCAFOLD_API_BASE_URL").unwrap_or(defaults.base_url),
            origin: non_empty_var("SCAFOLD_ORIGIN").unwrap_or(defaults.origin),
            token_header: non_empty_var("SCAFOLD_TOKEN_HEADER").unwrap_or(defaults.token_header),
            token_file: non_empty_var("SCAFOLD_TOKEN_FILE")
                .map(PathBuf::from)
                .or(defaults.token_file),
        }
    }

    /// Config pointing at an absolute backend URL, with no persisted token.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_file: None,
            ..Self::default()
        }
    }
}

/// `<config dir>/scafold/api-token`, or `None` when the platform has no
/// per-user config directory.
pub fn default_token_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scafold").join("api-token"))
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

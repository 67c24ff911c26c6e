//! Authenticated access layer for the Scafold passage reference API.
//!
//! Every console screen goes through the same three pieces: a token session
//! that owns the single bearer credential, an [`ApiClient`] that performs one
//! authenticated JSON call, and the [`Console`] actions that validate user
//! input and classify failures for display.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | [`ClientConfig`], populated from the environment |
//! | [`token`] | [`TokenStorage`] backends and the reactive [`TokenSession`] |
//! | [`client`] | [`ApiClient`]: URL, header, and body construction; response normalisation |
//! | [`error`] | [`ApiError`] and [`ClientError`] |
//! | [`console`] | Page-level actions and their user-facing messages |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use scafold_client::{ApiClient, ClientConfig, Console, FileTokenStorage, TokenSession};
//!
//! let config = ClientConfig::from_env();
//! let session = TokenSession::new(FileTokenStorage::from_config(&config));
//! session.hydrate();
//!
//! let console = Console::new(ApiClient::new(&config)?, session);
//! let hits = console.search("모의고사", SearchType::Text).await?;
//! ```

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod token;

pub use client::{ApiClient, Method, RequestOptions};
pub use config::ClientConfig;
pub use console::{ActionError, Console, PassageDetail, PassageForm, RequestForm};
pub use error::{ApiError, ClientError};
pub use token::{
    memory::MemoryTokenStorage, session::AuthState, session::TokenSession, FileTokenStorage,
    TokenStorage,
};

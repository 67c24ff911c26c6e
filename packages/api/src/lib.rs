//! Request and response types for the Scafold passage reference API.
//!
//! This crate encodes the HTTP contract of the passage backend as Rust types.
//! It carries no I/O; the authenticated client lives in `scafold-client` and
//! the mock backend used by the end-to-end suite lives in
//! `scafold-conformance`.
//!
//! # Endpoints covered
//!
//! | Method | Path | Type |
//! |--------|------|------|
//! | GET | `/v1/passages/{id}` | → [`Passage`] |
//! | POST | `/v1/passages` | [`NewPassage`] → [`Passage`] |
//! | GET | `/v1/search` | [`SearchQuery`] → `Vec<`[`SearchResult`]`>` |
//! | GET | `/v1/requests` | `?status=` → `Vec<`[`RequestRecord`]`>` |
//! | POST | `/v1/requests` | [`NewRequest`] → [`RequestRecord`] |
//! | PUT | `/v1/requests/{id}/complete` | → [`RequestRecord`] |
//! | GET | `/v1/references/by-passage/{id}` | → [`Reference`] (404 if none yet) |
//! | POST | `/v1/references/generate` | [`GenerateReference`] → [`Reference`] |

pub mod error;
pub mod passage;
pub mod reference;
pub mod request;

pub use error::ErrorResponse;
pub use passage::{NewPassage, Passage, SearchQuery, SearchResult, SearchType};
pub use reference::{
    GenerateReference, Reference, ReferenceItemKind, ReferenceStructuredItem,
    ReferenceStructuredPayload,
};
pub use request::{NewRequest, RequestRecord, RequestStatus};

/// Name of the header that carries the access token.
pub const TOKEN_HEADER: &str = "X-Scafold-Token";

/// Base URL used when none is configured. Relative to the console origin.
pub const DEFAULT_API_BASE_URL: &str = "/api/backend";

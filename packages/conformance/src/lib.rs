//! Mock passage backend for the Scafold end-to-end suite.
//!
//! Provides [`spawn_backend`] — binds a `TcpListener` on an ephemeral port,
//! serves the [`backend`] router from a background task, and returns both the
//! base URL and the shared [`MockStore`] so tests can seed passages or
//! inspect what the backend received without going through HTTP.
//!
//! The mock follows the real backend's conventions: every `/v1` route
//! requires the token header, errors are `{"detail": "..."}`, and the
//! by-passage reference lookup answers 404 until a reference is generated.
//! It also serves a few routes the real backend does not have:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `ANY /echo/{*rest}` | Reflects method, path, query, headers, and body as JSON |
//! | `GET /broken` | 500 with an HTML body |
//! | `GET /malformed` | 200 with a body that is not JSON |
//! | `GET /teapot` | 418 with a JSON body lacking `detail` |

pub mod backend;
pub mod error;
pub mod store;

use std::sync::Arc;

pub use backend::{build_router, MockConfig};
pub use store::MockStore;

/// Token the default [`MockConfig`] accepts.
pub const TEST_TOKEN: &str = "admin-test-token";

/// Start an ephemeral mock backend and return `(base_url, store)`.
///
/// The backend runs in a background `tokio` task bound to an OS-assigned
/// port on `127.0.0.1`, e.g. `http://127.0.0.1:51234`.
///
/// # Panics
///
/// Panics if the listener cannot be bound or the server fails.
pub async fn spawn_backend() -> (String, Arc<MockStore>) {
    spawn_backend_with(MockConfig::default()).await
}

/// [`spawn_backend`] with a custom token header or token list.
pub async fn spawn_backend_with(config: MockConfig) -> (String, Arc<MockStore>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let store = Arc::new(MockStore::new());
    let router = build_router(Arc::clone(&store), config);

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("mock backend error");
    });

    (base_url, store)
}

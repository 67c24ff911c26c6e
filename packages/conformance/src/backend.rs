//! Assembles the mock backend's Axum [`Router`].

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post, put},
    Json, Router,
};
use scafold_api::{
    GenerateReference, NewPassage, NewRequest, Passage, Reference, RequestRecord, RequestStatus,
    SearchQuery, SearchResult, TOKEN_HEADER,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::store::MockStore;
use crate::TEST_TOKEN;

/// Which header carries the token and which tokens are accepted.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub token_header: String,
    pub tokens: Vec<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            token_header: TOKEN_HEADER.to_string(),
            tokens: vec![TEST_TOKEN.to_string()],
        }
    }
}

#[derive(Clone)]
struct AppState {
    store: Arc<MockStore>,
    config: Arc<MockConfig>,
}

/// Build the mock backend router around `store`.
pub fn build_router(store: Arc<MockStore>, config: MockConfig) -> Router {
    let state = AppState {
        store,
        config: Arc::new(config),
    };

    let api = Router::new()
        // Passages
        .route("/v1/passages", post(create_passage))
        .route("/v1/passages/{id}", get(get_passage))
        .route("/v1/search", get(search))
        // Request queue
        .route("/v1/requests", get(list_requests).post(create_request))
        .route("/v1/requests/{id}/complete", put(complete_request))
        // References
        .route("/v1/references/by-passage/{id}", get(reference_by_passage))
        .route("/v1/references/generate", post(generate_reference))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .merge(api)
        .route("/echo/{*rest}", any(echo))
        .route("/broken", get(broken))
        .route("/malformed", get(malformed))
        .route("/teapot", get(teapot))
        .layer(middleware::from_fn_with_state(state.clone(), record_traffic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

async fn record_traffic(State(state): State<AppState>, req: Request, next: Next) -> Response {
    state
        .store
        .record(format!("{} {}", req.method(), req.uri().path()));
    next.run(req).await
}

/// 401 without a token, 403 with one that is not accepted.
async fn require_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = req
        .headers()
        .get(state.config.token_header.as_str())
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    match presented {
        None => Err(AppError::Unauthorized(format!(
            "{} header is required",
            state.config.token_header
        ))),
        Some(token) if !state.config.tokens.contains(&token) => {
            Err(AppError::Forbidden("invalid token".into()))
        }
        Some(_) => Ok(next.run(req).await),
    }
}

// ---------------------------------------------------------------------------
// /v1 handlers
// ---------------------------------------------------------------------------

async fn create_passage(
    State(state): State<AppState>,
    Json(new): Json<NewPassage>,
) -> Result<impl IntoResponse, AppError> {
    if new.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".into()));
    }
    let passage = state.store.insert_passage(new);
    Ok((StatusCode::CREATED, Json(passage)))
}

async fn get_passage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Passage>, AppError> {
    state
        .store
        .get_passage(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("passage not found".into()))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    if query.q.trim().is_empty() {
        return Err(AppError::BadRequest("q is required".into()));
    }
    Ok(Json(state.store.search(&query.q, query.search_type)))
}

#[derive(Debug, Deserialize)]
struct StatusFilter {
    status: Option<RequestStatus>,
}

async fn list_requests(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Json<Vec<RequestRecord>> {
    Json(state.store.list_requests(filter.status))
}

async fn create_request(
    State(state): State<AppState>,
    Json(new): Json<NewRequest>,
) -> Result<impl IntoResponse, AppError> {
    if new.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".into()));
    }
    let record = state.store.add_request(new);
    Ok((StatusCode::CREATED, Json(record)))
}

async fn complete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RequestRecord>, AppError> {
    state
        .store
        .complete_request(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("request not found".into()))
}

async fn reference_by_passage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Reference>, AppError> {
    state
        .store
        .reference_for(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("not found".into()))
}

async fn generate_reference(
    State(state): State<AppState>,
    Json(body): Json<GenerateReference>,
) -> Result<Json<Reference>, AppError> {
    tracing::debug!(passage_id = %body.passage_id, "generating mock reference");
    state
        .store
        .generate_reference(&body.passage_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("passage not found".into()))
}

// ---------------------------------------------------------------------------
// Diagnostic routes
// ---------------------------------------------------------------------------

/// Reflect the request back as JSON. `body` is `null` when nothing was sent.
async fn echo(
    method: Method,
    uri: Uri,
    Query(params): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = (!body.is_empty()).then(|| String::from_utf8_lossy(&body).into_owned());

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "params": params,
        "headers": headers,
        "body": body,
    }))
}

async fn broken() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, "text/html")],
        "<html><body>oops</body></html>",
    )
}

async fn malformed() -> impl IntoResponse {
    (StatusCode::OK, [(CONTENT_TYPE, "application/json")], "{not json")
}

async fn teapot() -> impl IntoResponse {
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({ "error": "short and stout" })),
    )
}

//! One authenticated JSON call against the passage backend.
//!
//! [`ApiClient::request`] is the only place the console touches the network.
//! Each call:
//!
//! 1. Appends the path under the configured base URL and adds every query
//!    pair whose value is non-empty.
//! 2. Sets `Content-Type: application/json`, the token header when a
//!    credential is present, and finally any caller headers (which win).
//! 3. Serialises the body as JSON, except for GET and DELETE, which never
//!    carry one.
//! 4. Resolves 2xx bodies into the caller's type and turns every other status
//!    into an [`ApiError`].
//!
//! The client keeps no state between calls: no retries, no caching, no
//! de-duplication. Two identical calls are two independent requests.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use scafold_api::{
    ErrorResponse, GenerateReference, NewPassage, NewRequest, Passage, Reference, RequestRecord,
    RequestStatus, SearchQuery, SearchResult,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};

/// Message used when an error body parses but names no `detail`.
pub const GENERIC_FAILURE: &str = "API request failed";

// ---------------------------------------------------------------------------
// Request descriptor
// ---------------------------------------------------------------------------

/// HTTP methods the backend API uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// GET and DELETE never transmit a body.
    pub fn allows_body(self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Everything about one call except its path. Built fresh per call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub credential: Option<String>,
    pub body: Option<serde_json::Value>,
    /// Query pairs. Empty values are dropped; a repeated key keeps its last value.
    pub query: Vec<(String, String)>,
    /// Merged last, so these override the content type and token header.
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self::method(Method::Delete)
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// A POST carrying `body` as JSON.
    pub fn post<B: Serialize>(body: &B) -> Result<Self, ClientError> {
        Self::method(Method::Post).json(body)
    }

    /// A PUT carrying `body` as JSON.
    pub fn put<B: Serialize>(body: &B) -> Result<Self, ClientError> {
        Self::method(Method::Put).json(body)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body).map_err(ClientError::Encode)?);
        Ok(self)
    }

    pub fn credential(mut self, credential: Option<&str>) -> Self {
        self.credential = credential.map(str::to_string);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Authenticated JSON client for the passage backend.
///
/// Holds a [`reqwest::Client`] (which pools connections internally), the
/// resolved base URL, and the token header name. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token_header: HeaderName,
}

impl ApiClient {
    /// Build a client from `config` with transport defaults.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Build a client around a pre-configured `reqwest::Client`.
    pub fn with_http_client(
        http: reqwest::Client,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let base = resolve_base_url(&config.base_url, &config.origin)?;
        let token_header = HeaderName::from_bytes(config.token_header.as_bytes())
            .map_err(|e| ClientError::InvalidHeader(format!("{:?}: {e}", config.token_header)))?;
        Ok(Self {
            http,
            base,
            token_header,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn token_header(&self) -> &HeaderName {
        &self.token_header
    }

    /// Base URL + `path` + the non-empty `query` pairs.
    ///
    /// `path` may carry its own query string, which is kept ahead of `query`.
    pub fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ClientError> {
        let (path, inline_query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };

        let mut url = self.base.clone();
        let joined = format!(
            "{}/{}",
            self.base.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.set_query(inline_query.filter(|q| !q.is_empty()));

        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(query.len());
        for (key, value) in query {
            if value.is_empty() {
                continue;
            }
            match pairs.iter_mut().find(|(k, _)| *k == key.as_str()) {
                Some(slot) => slot.1 = value.as_str(),
                None => pairs.push((key.as_str(), value.as_str())),
            }
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Content type, token header (for a non-empty credential), then `extra`.
    pub fn build_headers(
        &self,
        credential: Option<&str>,
        extra: &HeaderMap,
    ) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = credential.filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(token).map_err(|_| {
                ClientError::InvalidHeader(format!(
                    "credential is not a valid {} value",
                    self.token_header
                ))
            })?;
            value.set_sensitive(true);
            headers.insert(self.token_header.clone(), value);
        }

        for name in extra.keys() {
            headers.remove(name);
        }
        for (name, value) in extra {
            headers.append(name.clone(), value.clone());
        }
        Ok(headers)
    }

    /// Perform one call and decode the 2xx body as `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let RequestOptions {
            method,
            credential,
            body,
            query,
            headers,
        } = options;

        let url = self.build_url(path, &query)?;
        let headers = self.build_headers(credential.as_deref(), &headers)?;
        let body = encode_body(method, body)?;

        debug!(%method, %url, "sending request");
        let mut builder = self.http.request(method.to_reqwest(), url).headers(headers);
        if let Some(bytes) = body {
            builder = builder.body(bytes);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "received response");

        if status.is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes).map_err(ClientError::Decode);
        }

        // The status is already known; a body that cannot be read reads as empty.
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(status = status.as_u16(), error = %e, "error body unreadable");
                Default::default()
            }
        };
        Err(ApiError::new(status.as_u16(), resolve_error_message(status, &bytes)).into())
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    /// `GET /v1/passages/{id}`
    pub async fn get_passage(
        &self,
        credential: Option<&str>,
        id: &str,
    ) -> Result<Passage, ClientError> {
        let path = format!("/v1/passages/{}", urlencoding::encode(id));
        self.request(&path, RequestOptions::get().credential(credential))
            .await
    }

    /// `POST /v1/passages`
    pub async fn create_passage(
        &self,
        credential: Option<&str>,
        passage: &NewPassage,
    ) -> Result<Passage, ClientError> {
        self.request(
            "/v1/passages",
            RequestOptions::post(passage)?.credential(credential),
        )
        .await
    }

    /// `GET /v1/search?q=&type=`
    pub async fn search(
        &self,
        credential: Option<&str>,
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, ClientError> {
        let options = RequestOptions {
            query: query.to_pairs(),
            ..RequestOptions::get()
        };
        self.request("/v1/search", options.credential(credential))
            .await
    }

    /// `GET /v1/requests?status=`. `None` lists every status.
    pub async fn list_requests(
        &self,
        credential: Option<&str>,
        status: Option<RequestStatus>,
    ) -> Result<Vec<RequestRecord>, ClientError> {
        let status = status.map(|s| s.as_str()).unwrap_or_default();
        self.request(
            "/v1/requests",
            RequestOptions::get()
                .credential(credential)
                .query("status", status),
        )
        .await
    }

    /// `POST /v1/requests`
    pub async fn create_request(
        &self,
        credential: Option<&str>,
        request: &NewRequest,
    ) -> Result<RequestRecord, ClientError> {
        self.request(
            "/v1/requests",
            RequestOptions::post(request)?.credential(credential),
        )
        .await
    }

    /// `PUT /v1/requests/{id}/complete`
    pub async fn complete_request(
        &self,
        credential: Option<&str>,
        id: &str,
    ) -> Result<RequestRecord, ClientError> {
        let path = format!("/v1/requests/{}/complete", urlencoding::encode(id));
        self.request(
            &path,
            RequestOptions::method(Method::Put).credential(credential),
        )
        .await
    }

    /// `GET /v1/references/by-passage/{id}`. Answers 404 until one is generated.
    pub async fn reference_for_passage(
        &self,
        credential: Option<&str>,
        passage_id: &str,
    ) -> Result<Reference, ClientError> {
        let path = format!(
            "/v1/references/by-passage/{}",
            urlencoding::encode(passage_id)
        );
        self.request(&path, RequestOptions::get().credential(credential))
            .await
    }

    /// `POST /v1/references/generate`
    pub async fn generate_reference(
        &self,
        credential: Option<&str>,
        passage_id: &str,
    ) -> Result<Reference, ClientError> {
        let body = GenerateReference {
            passage_id: passage_id.to_string(),
        };
        self.request(
            "/v1/references/generate",
            RequestOptions::post(&body)?.credential(credential),
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Absolute base URLs are used as is; relative ones resolve against `origin`.
pub fn resolve_base_url(base_url: &str, origin: &str) -> Result<Url, ClientError> {
    if let Ok(url) = Url::parse(base_url) {
        return Ok(url);
    }
    let origin = Url::parse(origin)
        .map_err(|e| ClientError::Config(format!("origin {origin:?}: {e}")))?;
    origin
        .join(base_url)
        .map_err(|e| ClientError::Config(format!("base URL {base_url:?}: {e}")))
}

fn encode_body(
    method: Method,
    body: Option<serde_json::Value>,
) -> Result<Option<Vec<u8>>, ClientError> {
    let Some(body) = body.filter(|b| !b.is_null()) else {
        return Ok(None);
    };
    if !method.allows_body() {
        debug!(%method, "dropping body on a method that never carries one");
        return Ok(None);
    }
    serde_json::to_vec(&body).map(Some).map_err(ClientError::Encode)
}

/// The message for a non-2xx response.
///
/// Parsable JSON: its `detail`, or [`GENERIC_FAILURE`] when there is none.
/// Anything else: the HTTP status text.
pub fn resolve_error_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => serde_json::from_value::<ErrorResponse>(value)
            .ok()
            .and_then(|e| e.message())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        Err(_) => status
            .canonical_reason()
            .unwrap_or(GENERIC_FAILURE)
            .to_string(),
    }
}

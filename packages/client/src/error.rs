//! Error types returned by [`ApiClient`](crate::ApiClient).
//!
//! Callers branch on one question: did the backend answer with a status?
//! [`ClientError::Api`] carries the status and the server's message; every
//! other variant means no usable HTTP answer arrived.

/// The backend rejected or failed a request.
///
/// `status` is the real HTTP status. `message` is the server's `detail` text
/// when the error body was parsable JSON, otherwise the HTTP status text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (HTTP {status})")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Everything that can go wrong during one [`ApiClient::request`](crate::ApiClient::request).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx response.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// DNS, connection, TLS, or mid-body failure. No status is available.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body is not the expected JSON.
    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be serialised.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A header name or value (including the credential) is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The base URL, origin, or request path could not form a URL.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// The HTTP status, for the status-bearing branch only.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(e) => Some(e.status),
            _ => None,
        }
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(e) => Some(e),
            _ => None,
        }
    }
}

//! Error response body returned by the backend.

use serde::{Deserialize, Serialize};

/// The JSON body the backend returns alongside non-2xx statuses.
///
/// ```json
/// { "detail": "not found" }
/// ```
///
/// `detail` is usually a string. Validation failures may carry a structured
/// value instead, so it is kept as raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] with a plain-text detail.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(serde_json::Value::String(detail.into())),
        }
    }

    /// The detail as display text.
    ///
    /// Strings are returned verbatim; any other non-null value is returned as
    /// its compact JSON text. `None` when the field is absent or `null`.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

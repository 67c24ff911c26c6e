//! Passage request queue types.
//!
//! A request is a user asking for a passage that is not in the system yet.
//! Requests queue as `pending` until an admin registers the passage and marks
//! them complete.

use serde::{Deserialize, Serialize};

/// Lifecycle of a [`RequestRecord`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Processing,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Processing => "processing",
            RequestStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "processing" => Ok(RequestStatus::Processing),
            "completed" => Ok(RequestStatus::Completed),
            _ => Err(format!(
                "unknown request status {:?}; expected one of: pending, processing, completed",
                s
            )),
        }
    }
}

/// A queued passage request.
///
/// ```json
/// {
///   "id": "7",
///   "text": "요청 지문 일부",
///   "source": null,
///   "cc_name": "빈칸 추론",
///   "status": "pending",
///   "request_count": 3
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestRecord {
    pub id: String,
    pub text: String,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub cc_name: Option<String>,

    pub status: RequestStatus,

    /// How many users asked for the same passage.
    #[serde(default)]
    pub request_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Request body for `POST /v1/requests`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRequest {
    pub text: String,
    pub source: Option<String>,
    pub cc_name: Option<String>,

    /// Fresh identifier per submission so the backend can count requesters.
    pub requester_id: String,
}

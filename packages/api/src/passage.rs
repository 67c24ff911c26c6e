//! Passage registration, retrieval, and search types.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Passage
// ---------------------------------------------------------------------------

/// A stored reading-comprehension passage.
///
/// Returned by `GET /v1/passages/{id}` and `POST /v1/passages`.
///
/// ```json
/// {
///   "id": "42",
///   "text": "다음 글을 읽고 물음에 답하시오. ...",
///   "source": "2024학년도 6월 모의고사 18번",
///   "cc_labels": ["심경 변화"],
///   "created_at": "2024-06-04T09:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passage {
    pub id: String,

    /// Full passage text.
    pub text: String,

    /// Source citation (exam, year, question number). Optional.
    #[serde(default)]
    pub source: Option<String>,

    /// Classification labels attached by the admin who registered it.
    #[serde(default)]
    pub cc_labels: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Request body for `POST /v1/passages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPassage {
    pub text: String,

    /// Serialised as `null` when absent; the backend expects the key.
    pub source: Option<String>,

    pub cc_labels: Vec<String>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Which field `GET /v1/search` matches the query against.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Passage body text.
    #[default]
    Text,
    /// Classification label name.
    Cc,
    /// Source citation.
    Source,
}

impl SearchType {
    /// The wire value used in the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Text => "text",
            SearchType::Cc => "cc",
            SearchType::Source => "source",
        }
    }

    /// Korean label shown next to the search box.
    pub fn label(&self) -> &'static str {
        match self {
            SearchType::Text => "지문 텍스트",
            SearchType::Cc => "CC 이름",
            SearchType::Source => "출처",
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a [`SearchType`] from its lowercase wire-format string.
impl std::str::FromStr for SearchType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(SearchType::Text),
            "cc" => Ok(SearchType::Cc),
            "source" => Ok(SearchType::Source),
            _ => Err(format!(
                "unknown search type {:?}; expected one of: text, cc, source",
                s
            )),
        }
    }
}

/// Query parameters for `GET /v1/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,

    #[serde(default, rename = "type")]
    pub search_type: SearchType,
}

impl SearchQuery {
    /// Query-string pairs in wire order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("q".to_string(), self.q.clone()),
            ("type".to_string(), self.search_type.as_str().to_string()),
        ]
    }
}

/// One hit returned by `GET /v1/search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub passage_id: String,

    /// Leading excerpt of the passage text.
    pub preview: String,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub cc_labels: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

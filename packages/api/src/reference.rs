//! Generated reference material (questions, answers, explanations).

use serde::{Deserialize, Serialize};

/// Question/answer reference material generated for a passage.
///
/// Returned by `GET /v1/references/by-passage/{id}` and
/// `POST /v1/references/generate`. The by-passage lookup answers 404 until a
/// reference has been generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub passage_id: String,

    /// All questions as one block of text.
    pub questions: String,

    /// All answers as one block of text.
    pub answers: String,

    /// Model that produced this reference, when the backend reports it.
    #[serde(default)]
    pub llm_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,

    /// Per-question breakdown. Older references have none.
    #[serde(default)]
    pub structured_payload: Option<ReferenceStructuredPayload>,
}

impl Reference {
    /// The structured items, or an empty slice when the payload is absent.
    pub fn structured_items(&self) -> &[ReferenceStructuredItem] {
        self.structured_payload
            .as_ref()
            .map(|p| p.items.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceStructuredPayload {
    #[serde(default)]
    pub items: Vec<ReferenceStructuredItem>,
}

/// Whether a structured item targets one paragraph or the whole passage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceItemKind {
    Paragraph,
    Integrated,
}

impl std::fmt::Display for ReferenceItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceItemKind::Paragraph => write!(f, "paragraph"),
            ReferenceItemKind::Integrated => write!(f, "integrated"),
        }
    }
}

/// One question with its answer and explanation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceStructuredItem {
    #[serde(rename = "type")]
    pub kind: ReferenceItemKind,

    /// 1-based paragraph number for [`ReferenceItemKind::Paragraph`] items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,

    pub question: String,
    pub correct_answer: String,
    pub explanation: String,
}

/// Request body for `POST /v1/references/generate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateReference {
    pub passage_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_items_empty_without_payload() {
        let r: Reference = serde_json::from_str(
            r#"{"id":"r1","passage_id":"42","questions":"Q","answers":"A"}"#,
        )
        .unwrap();
        assert!(r.structured_items().is_empty());
        assert!(r.llm_model.is_none());
    }

    #[test]
    fn structured_items_parse() {
        let r: Reference = serde_json::from_str(
            r#"{
                "id": "r1",
                "passage_id": "42",
                "questions": "Q",
                "answers": "A",
                "llm_model": "gpt-4o",
                "structured_payload": {
                    "items": [
                        {"type": "paragraph", "paragraph": 1, "question": "q1",
                         "correct_answer": "a1", "explanation": "e1"},
                        {"type": "integrated", "index": 2, "question": "q2",
                         "correct_answer": "a2", "explanation": "e2"}
                    ]
                }
            }"#,
        )
        .unwrap();
        let items = r.structured_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, ReferenceItemKind::Paragraph);
        assert_eq!(items[0].paragraph, Some(1));
        assert_eq!(items[1].kind, ReferenceItemKind::Integrated);
        assert_eq!(items[1].index, Some(2));
    }

    #[test]
    fn item_kind_serialises_as_type() {
        let item = ReferenceStructuredItem {
            kind: ReferenceItemKind::Integrated,
            paragraph: None,
            index: None,
            question: "q".into(),
            correct_answer: "a".into(),
            explanation: "e".into(),
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["type"], "integrated");
        assert!(v.get("paragraph").is_none());
    }
}

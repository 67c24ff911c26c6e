//! In-memory state behind the mock backend.
//!
//! All data is held in RAM behind a [`RwLock`] and dies with the test.
//! Passages and requests are keyed by sequential numeric ids so listings
//! come back in creation order.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use scafold_api::{
    NewPassage, NewRequest, Passage, Reference, ReferenceItemKind, ReferenceStructuredItem,
    ReferenceStructuredPayload, RequestRecord, RequestStatus, SearchResult, SearchType,
};

/// Characters of passage text included in a search preview.
pub const PREVIEW_CHARS: usize = 80;

/// Model name stamped on generated references.
pub const MOCK_MODEL: &str = "mock-llm";

#[derive(Default)]
struct Inner {
    next_id: u64,
    passages: BTreeMap<u64, Passage>,
    requests: BTreeMap<u64, RequestRecord>,
    /// passage id → reference
    references: HashMap<String, Reference>,
    /// `"METHOD /path"` for every request the router saw, in arrival order.
    received: Vec<String>,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe store shared between the router and the test body.
#[derive(Default)]
pub struct MockStore {
    inner: RwLock<Inner>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|p| p.into_inner())
    }

    // --- Passages ------------------------------------------------------------

    pub fn insert_passage(&self, new: NewPassage) -> Passage {
        let mut inner = self.write();
        let id = inner.next_id();
        let passage = Passage {
            id: id.to_string(),
            text: new.text,
            source: new.source,
            cc_labels: new.cc_labels,
            created_at: Some(timestamp(id)),
        };
        inner.passages.insert(id, passage.clone());
        passage
    }

    pub fn get_passage(&self, id: &str) -> Option<Passage> {
        let key = id.parse::<u64>().ok()?;
        self.read().passages.get(&key).cloned()
    }

    /// Case-sensitive substring match on the field `search_type` selects.
    pub fn search(&self, q: &str, search_type: SearchType) -> Vec<SearchResult> {
        self.read()
            .passages
            .values()
            .filter(|p| match search_type {
                SearchType::Text => p.text.contains(q),
                SearchType::Cc => p.cc_labels.iter().any(|l| l.contains(q)),
                SearchType::Source => p.source.as_deref().is_some_and(|s| s.contains(q)),
            })
            .map(|p| SearchResult {
                passage_id: p.id.clone(),
                preview: preview(&p.text),
                source: p.source.clone(),
                cc_labels: p.cc_labels.clone(),
                created_at: p.created_at.clone(),
            })
            .collect()
    }

    // --- Requests ------------------------------------------------------------

    /// Queue a request. An open request with the same text is bumped instead
    /// of duplicated.
    pub fn add_request(&self, new: NewRequest) -> RequestRecord {
        let mut inner = self.write();
        if let Some(existing) = inner
            .requests
            .values_mut()
            .find(|r| r.text == new.text && r.status != RequestStatus::Completed)
        {
            existing.request_count += 1;
            return existing.clone();
        }
        let id = inner.next_id();
        let record = RequestRecord {
            id: id.to_string(),
            text: new.text,
            source: new.source,
            cc_name: new.cc_name,
            status: RequestStatus::Pending,
            request_count: 1,
            created_at: Some(timestamp(id)),
        };
        inner.requests.insert(id, record.clone());
        record
    }

    pub fn list_requests(&self, status: Option<RequestStatus>) -> Vec<RequestRecord> {
        self.read()
            .requests
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect()
    }

    pub fn complete_request(&self, id: &str) -> Option<RequestRecord> {
        let key = id.parse::<u64>().ok()?;
        let mut inner = self.write();
        let record = inner.requests.get_mut(&key)?;
        record.status = RequestStatus::Completed;
        Some(record.clone())
    }

    // --- References ----------------------------------------------------------

    pub fn reference_for(&self, passage_id: &str) -> Option<Reference> {
        self.read().references.get(passage_id).cloned()
    }

    /// Build a reference for an existing passage, replacing any earlier one.
    pub fn generate_reference(&self, passage_id: &str) -> Option<Reference> {
        let passage = self.get_passage(passage_id)?;
        let mut inner = self.write();
        let id = inner.next_id();

        let mut items: Vec<ReferenceStructuredItem> = passage
            .text
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .enumerate()
            .map(|(i, paragraph)| ReferenceStructuredItem {
                kind: ReferenceItemKind::Paragraph,
                paragraph: Some(i as u32 + 1),
                index: None,
                question: format!("{}문단의 중심 내용은?", i + 1),
                correct_answer: preview(paragraph.trim()),
                explanation: format!("{}문단 요약", i + 1),
            })
            .collect();
        items.push(ReferenceStructuredItem {
            kind: ReferenceItemKind::Integrated,
            paragraph: None,
            index: Some(items.len() as u32 + 1),
            question: "글의 주제로 가장 적절한 것은?".into(),
            correct_answer: passage.cc_labels.first().cloned().unwrap_or_default(),
            explanation: "전체 글의 흐름".into(),
        });

        let reference = Reference {
            id: format!("ref-{id}"),
            passage_id: passage.id.clone(),
            questions: join_lines(items.iter().map(|i| i.question.as_str())),
            answers: join_lines(items.iter().map(|i| i.correct_answer.as_str())),
            llm_model: Some(MOCK_MODEL.into()),
            generated_at: Some(timestamp(id)),
            structured_payload: Some(ReferenceStructuredPayload { items }),
        };
        inner
            .references
            .insert(passage.id.clone(), reference.clone());
        Some(reference)
    }

    // --- Traffic log ---------------------------------------------------------

    pub fn record(&self, line: String) {
        self.write().received.push(line);
    }

    /// Every `"METHOD /path"` the backend received, in arrival order.
    pub fn received(&self) -> Vec<String> {
        self.read().received.clone()
    }

    pub fn count_received(&self, line: &str) -> usize {
        self.read().received.iter().filter(|l| *l == line).count()
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    lines
        .enumerate()
        .map(|(i, l)| format!("{}. {l}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deterministic, monotonically increasing timestamps.
fn timestamp(seq: u64) -> String {
    format!("2024-06-04T09:{:02}:{:02}Z", (seq / 60) % 60, seq % 60)
}

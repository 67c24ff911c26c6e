//! Plain-text rendering of passages, references, search hits, and the
//! request queue.
//!
//! Output is meant for a terminal. It is not a stable format; pass `--json`
//! for machine-readable output.

use scafold_api::{Passage, Reference, ReferenceItemKind, RequestRecord, SearchResult};
use scafold_client::console::messages;

/// Render a passage with its metadata.
///
/// ```text
/// 지문 #42  출처: 2024학년도 6월 모의고사 18번
/// 라벨: 심경 변화, 주제
///
/// 다음 글을 읽고 물음에 답하시오. ...
///
/// 등록: 2024-06-04T09:00:00Z
/// ```
pub fn render_passage(passage: &Passage) -> String {
    let mut out = String::new();

    out.push_str(&format!("지문 #{}", passage.id));
    if let Some(source) = &passage.source {
        out.push_str(&format!("  출처: {}", source));
    }
    out.push('\n');
    if !passage.cc_labels.is_empty() {
        out.push_str(&format!("라벨: {}\n", passage.cc_labels.join(", ")));
    }

    out.push('\n');
    out.push_str(passage.text.trim_end());
    out.push('\n');

    if let Some(created) = &passage.created_at {
        out.push('\n');
        out.push_str(&format!("등록: {}\n", created));
    }
    out
}

/// Render a reference. Structured items are listed one by one; otherwise the
/// raw question and answer blocks are shown.
///
/// ```text
/// 참고자료  생성 모델: gpt-4o
///
/// [1] 1문단
///   Q. 1문단의 중심 내용은?
///   A. ...
///   해설: ...
/// ```
pub fn render_reference(reference: &Reference) -> String {
    let mut out = String::from("참고자료");
    if let Some(model) = &reference.llm_model {
        out.push_str(&format!("  생성 모델: {}", model));
    }
    out.push('\n');

    let items = reference.structured_items();
    if items.is_empty() {
        out.push_str("\n[질문]\n");
        out.push_str(reference.questions.trim_end());
        out.push_str("\n\n[정답]\n");
        out.push_str(reference.answers.trim_end());
        out.push('\n');
    } else {
        for (i, item) in items.iter().enumerate() {
            let number = item.index.unwrap_or(i as u32 + 1);
            let scope = match (item.kind, item.paragraph) {
                (ReferenceItemKind::Paragraph, Some(p)) => format!("{}문단", p),
                (ReferenceItemKind::Paragraph, None) => "문단".to_string(),
                (ReferenceItemKind::Integrated, _) => "통합".to_string(),
            };
            out.push('\n');
            out.push_str(&format!("[{}] {}\n", number, scope));
            out.push_str(&format!("  Q. {}\n", item.question));
            out.push_str(&format!("  A. {}\n", item.correct_answer));
            out.push_str(&format!("  해설: {}\n", item.explanation));
        }
    }

    if let Some(at) = &reference.generated_at {
        out.push('\n');
        out.push_str(&format!("생성: {}\n", at));
    }
    out
}

/// The reference section of the detail screen, with the placeholder when
/// nothing has been generated yet.
pub fn render_reference_section(reference: Option<&Reference>) -> String {
    match reference {
        Some(r) => render_reference(r),
        None => format!("{}\n", messages::REFERENCE_PLACEHOLDER),
    }
}

/// One block per hit, or a single line when there are none.
pub fn render_search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "검색 결과가 없습니다.\n".to_string();
    }
    let mut out = format!("검색 결과 {}건\n", results.len());
    for hit in results {
        out.push('\n');
        out.push_str(&format!("#{}", hit.passage_id));
        if let Some(source) = &hit.source {
            out.push_str(&format!("  {}", source));
        }
        if !hit.cc_labels.is_empty() {
            out.push_str(&format!("  [{}]", hit.cc_labels.join(", ")));
        }
        out.push('\n');
        out.push_str(&format!("  {}\n", hit.preview));
    }
    out
}

/// The admin request queue.
pub fn render_requests(requests: &[RequestRecord]) -> String {
    if requests.is_empty() {
        return "대기 중인 요청이 없습니다.\n".to_string();
    }
    let mut out = String::new();
    for r in requests {
        out.push_str(&format!(
            "#{}  [{}]  요청 {}회",
            r.id, r.status, r.request_count
        ));
        if let Some(cc) = &r.cc_name {
            out.push_str(&format!("  CC: {}", cc));
        }
        if let Some(source) = &r.source {
            out.push_str(&format!("  출처: {}", source));
        }
        out.push('\n');
        out.push_str(&format!("  {}\n", r.text));
    }
    out
}

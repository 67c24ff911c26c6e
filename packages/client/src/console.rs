//! Page-level console actions.
//!
//! Each action is what one button press on a console screen does: validate
//! the form locally, run one unit of work against the backend with the
//! session's current token, and report a failure in one of three shapes
//! (see [`ActionError`]). Validation failures never reach the network.
//!
//! Messages are Korean because they are shown verbatim to console users.

use scafold_api::{
    NewPassage, NewRequest, Passage, Reference, RequestRecord, RequestStatus, SearchQuery,
    SearchResult, SearchType,
};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::{ApiError, ClientError};
use crate::token::session::TokenSession;

/// User-facing strings, grouped by screen.
pub mod messages {
    pub const TOKEN_REQUIRED: &str = "토큰을 입력해주세요.";

    pub const SEARCH_QUERY_REQUIRED: &str = "검색어를 입력하세요.";
    pub const SEARCH_FAILED: &str = "검색 중 오류가 발생했습니다.";

    pub const REQUEST_TEXT_REQUIRED: &str = "요청 지문을 입력해주세요.";
    pub const REQUEST_FAILED: &str = "요청 처리 중 오류가 발생했습니다.";
    pub const REQUEST_ACCEPTED: &str = "요청이 접수되었습니다.";

    pub const PASSAGE_TEXT_REQUIRED: &str = "지문 본문을 입력해주세요.";
    pub const PASSAGE_REGISTER_FAILED: &str = "지문 등록 중 오류가 발생했습니다.";
    pub const PASSAGE_REGISTERED: &str = "지문이 등록되었습니다.";

    pub const REQUEST_LIST_FAILED: &str = "요청 목록을 불러올 수 없습니다.";
    pub const REQUEST_COMPLETE_FAILED: &str = "요청 상태를 변경하지 못했습니다.";

    pub const DETAIL_FAILED: &str = "지문 상세를 불러오지 못했습니다.";
    pub const REFERENCE_GENERATE_FAILED: &str = "참고자료 생성에 실패했습니다.";
    pub const REFERENCE_PLACEHOLDER: &str = "참고자료가 아직 없습니다.";
}

// ---------------------------------------------------------------------------
// ActionError
// ---------------------------------------------------------------------------

/// Why a console action did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// Required input was empty. No request was sent.
    #[error("{0}")]
    Validation(&'static str),

    /// The backend answered with a non-2xx status. Its message is shown as is.
    #[error(transparent)]
    Api(ApiError),

    /// Anything without a status: transport failure, malformed body, bad
    /// configuration. Shown as the action's generic message.
    #[error("{message}")]
    Unexpected {
        message: &'static str,
        #[source]
        source: ClientError,
    },
}

impl ActionError {
    /// The text to put in front of the user.
    pub fn user_message(&self) -> &str {
        match self {
            ActionError::Validation(msg) => *msg,
            ActionError::Api(e) => e.message.as_str(),
            ActionError::Unexpected { message, .. } => *message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ActionError::Api(e) => Some(e.status),
            _ => None,
        }
    }

    fn classify(fallback: &'static str) -> impl FnOnce(ClientError) -> ActionError {
        move |err| match err {
            ClientError::Api(e) => ActionError::Api(e),
            other => ActionError::Unexpected {
                message: fallback,
                source: other,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// The "request a missing passage" form on the search screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestForm {
    pub text: String,
    pub source: String,
    pub cc_name: String,
}

impl RequestForm {
    /// Trimmed payload with a fresh requester id, or `None` when the text is blank.
    pub fn to_payload(&self) -> Option<NewRequest> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        Some(NewRequest {
            text: text.to_string(),
            source: blank_to_none(&self.source),
            cc_name: blank_to_none(&self.cc_name),
            requester_id: Uuid::now_v7().to_string(),
        })
    }
}

/// The admin passage registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassageForm {
    pub text: String,
    pub source: String,
    /// Comma-separated labels, e.g. `"주제, 요지"`.
    pub cc_labels: String,
}

impl PassageForm {
    pub fn to_payload(&self) -> Option<NewPassage> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        Some(NewPassage {
            text: text.to_string(),
            source: blank_to_none(&self.source),
            cc_labels: split_labels(&self.cc_labels),
        })
    }
}

/// Split on commas, trim each label, and drop empties.
pub fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// A passage with its reference, if one has been generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageDetail {
    pub passage: Passage,
    /// `None` when the backend has no reference yet (404 on lookup).
    pub reference: Option<Reference>,
}

/// The console's actions, bound to one client and one token session.
#[derive(Debug, Clone)]
pub struct Console {
    client: ApiClient,
    session: TokenSession,
}

impl Console {
    pub fn new(client: ApiClient, session: TokenSession) -> Self {
        Self { client, session }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    /// Trim and store a token typed into the token form.
    pub fn save_token(&self, input: &str) -> Result<(), ActionError> {
        let token = input.trim();
        if token.is_empty() {
            return Err(ActionError::Validation(messages::TOKEN_REQUIRED));
        }
        self.session.set(Some(token.to_string()));
        Ok(())
    }

    pub fn clear_token(&self) {
        self.session.clear();
    }

    /// Search screen: submit the search box.
    pub async fn search(
        &self,
        query: &str,
        search_type: SearchType,
    ) -> Result<Vec<SearchResult>, ActionError> {
        let q = query.trim();
        if q.is_empty() {
            return Err(ActionError::Validation(messages::SEARCH_QUERY_REQUIRED));
        }
        let query = SearchQuery {
            q: q.to_string(),
            search_type,
        };
        let token = self.session.current();
        self.client
            .search(token.as_deref(), &query)
            .await
            .map_err(ActionError::classify(messages::SEARCH_FAILED))
    }

    /// Search screen: ask for a passage that is not in the system yet.
    pub async fn submit_request(&self, form: &RequestForm) -> Result<RequestRecord, ActionError> {
        let payload = form
            .to_payload()
            .ok_or(ActionError::Validation(messages::REQUEST_TEXT_REQUIRED))?;
        let token = self.session.current();
        self.client
            .create_request(token.as_deref(), &payload)
            .await
            .map_err(ActionError::classify(messages::REQUEST_FAILED))
    }

    /// Admin screen: register a passage.
    pub async fn register_passage(&self, form: &PassageForm) -> Result<Passage, ActionError> {
        let payload = form
            .to_payload()
            .ok_or(ActionError::Validation(messages::PASSAGE_TEXT_REQUIRED))?;
        let token = self.session.current();
        self.client
            .create_passage(token.as_deref(), &payload)
            .await
            .map_err(ActionError::classify(messages::PASSAGE_REGISTER_FAILED))
    }

    /// Admin screen: the queue of pending requests.
    pub async fn pending_requests(&self) -> Result<Vec<RequestRecord>, ActionError> {
        let token = self.session.current();
        self.client
            .list_requests(token.as_deref(), Some(RequestStatus::Pending))
            .await
            .map_err(ActionError::classify(messages::REQUEST_LIST_FAILED))
    }

    /// Admin screen: mark a request complete, then reload the pending queue.
    pub async fn complete_request(&self, id: &str) -> Result<Vec<RequestRecord>, ActionError> {
        let token = self.session.current();
        self.client
            .complete_request(token.as_deref(), id)
            .await
            .map_err(ActionError::classify(messages::REQUEST_COMPLETE_FAILED))?;
        self.pending_requests().await
    }

    /// Detail screen: the passage and its reference, fetched concurrently.
    ///
    /// A 404 on the reference lookup means "not generated yet" and yields
    /// `reference: None`. Any other failure on either side fails the whole
    /// load and nothing partial is returned.
    pub async fn passage_detail(&self, id: &str) -> Result<PassageDetail, ActionError> {
        let token = self.session.current();
        let token = token.as_deref();
        let (passage, reference) = tokio::try_join!(
            self.client.get_passage(token, id),
            self.reference_if_any(token, id),
        )
        .map_err(ActionError::classify(messages::DETAIL_FAILED))?;
        Ok(PassageDetail { passage, reference })
    }

    /// Detail screen: generate (or regenerate) the reference.
    pub async fn generate_reference(&self, passage_id: &str) -> Result<Reference, ActionError> {
        let token = self.session.current();
        self.client
            .generate_reference(token.as_deref(), passage_id)
            .await
            .map_err(ActionError::classify(messages::REFERENCE_GENERATE_FAILED))
    }

    async fn reference_if_any(
        &self,
        token: Option<&str>,
        passage_id: &str,
    ) -> Result<Option<Reference>, ClientError> {
        match self.client.reference_for_passage(token, passage_id).await {
            Ok(reference) => Ok(Some(reference)),
            Err(ClientError::Api(e)) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

//! End-to-end tests for the Scafold API client.
//!
//! Each test spawns an ephemeral mock backend (real TCP, real HTTP) via
//! [`scafold_conformance::spawn_backend`] and drives the real `ApiClient` or
//! `Console` against it.
//!
//! The `/echo/...` route reflects exactly what arrived on the wire, which is
//! how the tests check URL, header, and body construction without trusting
//! the client's own view of the request.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use scafold_api::{NewPassage, Passage, RequestStatus, SearchResult, SearchType};
use scafold_client::console::messages;
use scafold_client::{
    ActionError, ApiClient, ClientConfig, ClientError, Console, FileTokenStorage,
    MemoryTokenStorage, Method, PassageForm, RequestForm, RequestOptions, TokenSession,
    TokenStorage,
};
use scafold_conformance::{spawn_backend, spawn_backend_with, MockConfig, MockStore, TEST_TOKEN};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn client_for(base: &str) -> ApiClient {
    ApiClient::new(&ClientConfig::for_base_url(base)).unwrap()
}

fn console_for(base: &str, token: Option<&str>) -> Console {
    let session = TokenSession::new(MemoryTokenStorage::new());
    if let Some(token) = token {
        session.set(Some(token.to_string()));
    }
    Console::new(client_for(base), session)
}

fn seed_passage(store: &Arc<MockStore>, text: &str, source: Option<&str>, labels: &[&str]) -> Passage {
    store.insert_passage(NewPassage {
        text: text.into(),
        source: source.map(str::to_string),
        cc_labels: labels.iter().map(|l| l.to_string()).collect(),
    })
}

async fn echo(client: &ApiClient, path: &str, options: RequestOptions) -> Value {
    client
        .request::<Value>(&format!("/echo{path}"), options)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_query_values_never_reach_the_wire() {
    let (base, _store) = spawn_backend().await;
    let client = client_for(&base);

    let seen = echo(
        &client,
        "/search",
        RequestOptions::get()
            .query("q", "모의고사")
            .query("type", "")
            .query("status", "pending"),
    )
    .await;

    assert_eq!(seen["params"], json!({"q": "모의고사", "status": "pending"}));
    assert!(!seen["query"].as_str().unwrap().contains("type"));
}

#[tokio::test]
async fn query_values_are_url_encoded() {
    let (base, _store) = spawn_backend().await;
    let client = client_for(&base);

    let seen = echo(&client, "/q", RequestOptions::get().query("q", "a&b=c 지문")).await;
    assert_eq!(seen["params"]["q"], "a&b=c 지문");
    let raw = seen["query"].as_str().unwrap();
    assert!(!raw.contains(' '));
    assert!(raw.starts_with("q=a%26b%3Dc"));
}

#[tokio::test]
async fn relative_base_resolves_against_origin() {
    let (origin, _store) = spawn_backend().await;
    let config = ClientConfig {
        base_url: "/echo/api/backend".into(),
        origin: origin.clone(),
        token_file: None,
        ..ClientConfig::default()
    };
    let client = ApiClient::new(&config).unwrap();

    let seen: Value = client
        .request("/v1/search", RequestOptions::get())
        .await
        .unwrap();
    assert_eq!(seen["path"], "/echo/api/backend/v1/search");
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn credential_travels_in_token_header() {
    let (base, _store) = spawn_backend().await;
    let client = client_for(&base);

    let seen = echo(&client, "/h", RequestOptions::get().credential(Some("abc"))).await;
    assert_eq!(seen["headers"]["x-scafold-token"], "abc");
    assert_eq!(seen["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn absent_credential_omits_header() {
    let (base, _store) = spawn_backend().await;
    let client = client_for(&base);

    for options in [
        RequestOptions::get(),
        RequestOptions::get().credential(Some("")),
    ] {
        let seen = echo(&client, "/h", options).await;
        assert!(seen["headers"].get("x-scafold-token").is_none());
        assert_eq!(seen["headers"]["content-type"], "application/json");
    }
}

#[tokio::test]
async fn caller_headers_override_defaults() {
    let (base, _store) = spawn_backend().await;
    let client = client_for(&base);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/merge-patch+json"));
    headers.insert("x-request-source", HeaderValue::from_static("console"));
    let options = RequestOptions {
        headers,
        ..RequestOptions::get().credential(Some("abc"))
    };

    let seen = echo(&client, "/h", options).await;
    assert_eq!(seen["headers"]["content-type"], "application/merge-patch+json");
    assert_eq!(seen["headers"]["x-request-source"], "console");
    assert_eq!(seen["headers"]["x-scafold-token"], "abc");
}

#[tokio::test]
async fn custom_token_header_name() {
    let (base, store) = spawn_backend_with(MockConfig {
        token_header: "X-Tutor-Key".into(),
        tokens: vec!["tutor-1".into()],
    })
    .await;
    seed_passage(&store, "본문", None, &[]);

    let config = ClientConfig {
        token_header: "X-Tutor-Key".into(),
        ..ClientConfig::for_base_url(&base)
    };
    let client = ApiClient::new(&config).unwrap();
    let passage = client.get_passage(Some("tutor-1"), "1").await.unwrap();
    assert_eq!(passage.text, "본문");

    // The default header name is not what this backend reads.
    let err = client_for(&base)
        .get_passage(Some("tutor-1"), "1")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_and_delete_never_transmit_a_body() {
    let (base, _store) = spawn_backend().await;
    let client = client_for(&base);
    let body = json!({"passage_id": "42"});

    for method in [Method::Get, Method::Delete] {
        let options = RequestOptions::method(method).json(&body).unwrap();
        let seen = echo(&client, "/b", options).await;
        assert_eq!(seen["method"], method.to_string());
        assert!(seen["body"].is_null(), "{method} carried a body");
    }
}

#[tokio::test]
async fn post_and_put_transmit_json() {
    let (base, _store) = spawn_backend().await;
    let client = client_for(&base);
    let body = json!({"text": "지문", "cc_labels": ["주제"], "source": null});

    for options in [
        RequestOptions::post(&body).unwrap(),
        RequestOptions::put(&body).unwrap(),
    ] {
        let seen = echo(&client, "/b", options).await;
        assert_eq!(seen["headers"]["content-type"], "application/json");
        let sent: Value = serde_json::from_str(seen["body"].as_str().unwrap()).unwrap();
        assert_eq!(sent, body);
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_resolves_typed_results() {
    let (base, store) = spawn_backend().await;
    seed_passage(&store, "2024 모의고사 지문", Some("6월 모의고사"), &[]);
    seed_passage(&store, "다른 지문", None, &["주제"]);
    let client = client_for(&base);

    let hits: Vec<SearchResult> = client
        .request(
            "/v1/search",
            RequestOptions::get()
                .credential(Some(TEST_TOKEN))
                .query("q", "모의고사")
                .query("type", "text"),
        )
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].passage_id, "1");
    assert_eq!(hits[0].preview, "2024 모의고사 지문");
    assert!(hits[0].cc_labels.is_empty());
}

#[tokio::test]
async fn missing_credential_is_401_with_server_message() {
    let (base, store) = spawn_backend().await;
    seed_passage(&store, "본문", None, &[]);

    let err = client_for(&base).get_passage(None, "42").await.unwrap_err();
    let api = err.as_api().expect("status-bearing error");
    assert_eq!(api.status, 401);
    assert_eq!(api.message, "X-Scafold-Token header is required");

    // The console shows the server's message, not a generic one.
    let console = console_for(&base, None);
    let err = console.passage_detail("1").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.user_message(), "X-Scafold-Token header is required");
}

#[tokio::test]
async fn wrong_credential_is_403() {
    let (base, _store) = spawn_backend().await;
    let err = client_for(&base)
        .list_requests(Some("not-a-token"), None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.as_api().unwrap().message, "invalid token");
}

#[tokio::test]
async fn missing_reference_is_404_not_found() {
    let (base, store) = spawn_backend().await;
    seed_passage(&store, "본문", None, &[]);

    let err = client_for(&base)
        .reference_for_passage(Some(TEST_TOKEN), "1")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.as_api().unwrap().message, "not found");
}

#[tokio::test]
async fn unparsable_error_body_uses_status_text() {
    let (base, _store) = spawn_backend().await;
    let err = client_for(&base)
        .request::<Value>("/broken", RequestOptions::get())
        .await
        .unwrap_err();
    let api = err.as_api().unwrap();
    assert_eq!(api.status, 500);
    assert_eq!(api.message, "Internal Server Error");
}

#[tokio::test]
async fn error_body_without_detail_uses_generic_message() {
    let (base, _store) = spawn_backend().await;
    let err = client_for(&base)
        .request::<Value>("/teapot", RequestOptions::get())
        .await
        .unwrap_err();
    let api = err.as_api().unwrap();
    assert_eq!(api.status, 418);
    assert_eq!(api.message, "API request failed");
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let (base, _store) = spawn_backend().await;
    let err = client_for(&base)
        .request::<Value>("/malformed", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base = format!("http://{addr}");
    let err = client_for(&base)
        .get_passage(Some(TEST_TOKEN), "1")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.status(), None);

    let err = console_for(&base, Some(TEST_TOKEN))
        .passage_detail("1")
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::Unexpected { .. }));
    assert_eq!(err.user_message(), messages::DETAIL_FAILED);
}

#[tokio::test]
async fn truncated_error_body_keeps_the_status() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Promises 100 bytes, sends 9, then hangs up.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\n\
                  Content-Type: application/json\r\n\
                  Content-Length: 100\r\n\r\n\
                  {\"detail\"",
            )
            .await;
        let _ = socket.shutdown().await;
    });

    let err = client_for(&format!("http://{addr}"))
        .request::<Value>("/v1/passages/1", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.as_api().unwrap().message, "Internal Server Error");
}

// ---------------------------------------------------------------------------
// Console flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn detail_without_reference_shows_placeholder_state() {
    let (base, store) = spawn_backend().await;
    let passage = seed_passage(&store, "본문", Some("출처"), &["주제"]);
    let console = console_for(&base, Some(TEST_TOKEN));

    let detail = console.passage_detail(&passage.id).await.unwrap();
    assert_eq!(detail.passage, passage);
    assert!(detail.reference.is_none());

    // Both halves were requested.
    assert_eq!(store.count_received("GET /v1/passages/1"), 1);
    assert_eq!(store.count_received("GET /v1/references/by-passage/1"), 1);
}

#[tokio::test]
async fn detail_fails_whole_when_passage_is_missing() {
    let (base, _store) = spawn_backend().await;
    let console = console_for(&base, Some(TEST_TOKEN));

    let err = console.passage_detail("999").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "passage not found");
}

#[tokio::test]
async fn generate_then_detail_includes_reference() {
    let (base, store) = spawn_backend().await;
    let passage = seed_passage(&store, "첫 문단\n\n둘째 문단", None, &["주제"]);
    let console = console_for(&base, Some(TEST_TOKEN));

    let generated = console.generate_reference(&passage.id).await.unwrap();
    assert_eq!(generated.passage_id, passage.id);
    assert_eq!(generated.structured_items().len(), 3);

    let detail = console.passage_detail(&passage.id).await.unwrap();
    assert_eq!(detail.reference, Some(generated));
}

#[tokio::test]
async fn generate_for_unknown_passage_surfaces_api_message() {
    let (base, _store) = spawn_backend().await;
    let console = console_for(&base, Some(TEST_TOKEN));

    let err = console.generate_reference("999").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "passage not found");
}

#[tokio::test]
async fn identical_actions_are_not_coalesced() {
    let (base, store) = spawn_backend().await;
    let passage = seed_passage(&store, "본문", None, &[]);
    let console = console_for(&base, Some(TEST_TOKEN));

    let (a, b) = tokio::join!(
        console.generate_reference(&passage.id),
        console.generate_reference(&passage.id),
    );
    assert_ne!(a.unwrap().id, b.unwrap().id);
    assert_eq!(store.count_received("POST /v1/references/generate"), 2);
}

#[tokio::test]
async fn search_action_validates_then_queries() {
    let (base, store) = spawn_backend().await;
    seed_passage(&store, "본문", Some("2023 수능"), &["빈칸 추론"]);
    let console = console_for(&base, Some(TEST_TOKEN));

    let err = console.search("   ", SearchType::Text).await.unwrap_err();
    assert!(matches!(err, ActionError::Validation(_)));
    assert!(store.received().is_empty(), "validation must not hit the network");

    let hits = console.search("  빈칸 ", SearchType::Cc).await.unwrap();
    assert_eq!(hits.len(), 1);
    let hits = console.search("수능", SearchType::Source).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn request_queue_flow() {
    let (base, store) = spawn_backend().await;
    let console = console_for(&base, Some(TEST_TOKEN));

    let form = RequestForm {
        text: " 없는 지문 ".into(),
        source: "".into(),
        cc_name: "요지".into(),
    };
    let first = console.submit_request(&form).await.unwrap();
    assert_eq!(first.text, "없는 지문");
    assert_eq!(first.source, None);
    assert_eq!(first.status, RequestStatus::Pending);

    let again = console.submit_request(&form).await.unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.request_count, 2);

    let pending = console.pending_requests().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(store.count_received("GET /v1/requests"), 1);

    let remaining = console.complete_request(&first.id).await.unwrap();
    assert!(remaining.is_empty());
    assert_eq!(store.count_received("PUT /v1/requests/1/complete"), 1);
    assert_eq!(store.count_received("GET /v1/requests"), 2);

    let err = console.complete_request("404").await.unwrap_err();
    assert_eq!(err.user_message(), "request not found");
}

#[tokio::test]
async fn register_passage_flow() {
    let (base, store) = spawn_backend().await;
    let console = console_for(&base, Some(TEST_TOKEN));

    let passage = console
        .register_passage(&PassageForm {
            text: "  새 지문  ".into(),
            source: " 2024 9월 모의고사 ".into(),
            cc_labels: "주제, 요지,,".into(),
        })
        .await
        .unwrap();
    assert_eq!(passage.text, "새 지문");
    assert_eq!(passage.source.as_deref(), Some("2024 9월 모의고사"));
    assert_eq!(passage.cc_labels, vec!["주제", "요지"]);
    assert_eq!(store.get_passage(&passage.id), Some(passage));
}

#[tokio::test]
async fn token_persists_across_sessions() {
    let (base, store) = spawn_backend().await;
    seed_passage(&store, "본문", None, &[]);
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("scafold").join("api-token");

    let first = Console::new(
        client_for(&base),
        TokenSession::new(FileTokenStorage::new(&token_file)),
    );
    first.save_token(&format!("  {TEST_TOKEN}\n")).unwrap();
    assert_eq!(
        FileTokenStorage::new(&token_file).get_stored().as_deref(),
        Some(TEST_TOKEN)
    );

    // A fresh session starts unauthenticated and picks the token up on hydrate.
    let session = TokenSession::new(FileTokenStorage::new(&token_file));
    assert!(session.current().is_none());
    session.hydrate();
    let second = Console::new(client_for(&base), session);
    assert!(second.passage_detail("1").await.is_ok());

    second.clear_token();
    assert!(!token_file.exists());
    let err = second.passage_detail("1").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

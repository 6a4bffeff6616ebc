use std::sync::Arc;

use super::*;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode as AxumStatus},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct MockState {
    status: AxumStatus,
    body: Value,
    seen: Arc<Mutex<Vec<(String, String, Option<String>, Value)>>>,
}

async fn create_record(
    State(state): State<MockState>,
    Path((base, table)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.seen.lock().await.push((base, table, auth, body));
    (state.status, Json(state.body.clone()))
}

async fn list_records(State(state): State<MockState>) -> impl IntoResponse {
    (state.status, Json(state.body.clone()))
}

async fn spawn_mock(status: AxumStatus, body: Value) -> (String, MockState) {
    let state = MockState {
        status,
        body,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/:base/:table", post(create_record))
        .route("/:base/:table", get(list_records))
        .with_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), state)
}

fn store_for(api_url: String) -> AirtableStore {
    AirtableStore::new(AirtableConfig {
        api_url,
        api_key: Some("key-test".into()),
        base_id: Some("appBase".into()),
        ..AirtableConfig::default()
    })
    .expect("store")
}

fn payload() -> IdeaPayload {
    IdeaPayload {
        title: "Chess App".into(),
        problem: "No puzzles".into(),
        solution: "Daily puzzle feed".into(),
        resources: String::new(),
        category: "Other".into(),
    }
}

#[tokio::test]
async fn create_posts_fields_with_bearer_auth() {
    let (url, mock) = spawn_mock(AxumStatus::OK, json!({ "id": "rec123", "fields": {} })).await;
    let store = store_for(url);

    let response = store.create_idea_record(&payload()).await.expect("create");
    assert_eq!(response, CreateRecordResponse::created());

    let seen = mock.seen.lock().await;
    assert_eq!(seen.len(), 1);
    let (base, table, auth, body) = &seen[0];
    assert_eq!(base, "appBase");
    assert_eq!(table, "Ideas");
    assert_eq!(auth.as_deref(), Some("Bearer key-test"));
    assert_eq!(
        body,
        &json!({
            "fields": {
                "Title": "Chess App",
                "Problem": "No puzzles",
                "Solution": "Daily puzzle feed",
                "Resources": "",
                "Category": "Other",
            },
            "typecast": true,
        })
    );
}

#[tokio::test]
async fn unprocessable_entity_maps_to_safe_message_and_keeps_detail() {
    let (url, _mock) = spawn_mock(
        AxumStatus::UNPROCESSABLE_ENTITY,
        json!({ "error": { "type": "INVALID_MULTIPLE_CHOICE_OPTIONS", "message": "Insufficient permissions to create new select option \"Space\"" } }),
    )
    .await;
    let store = store_for(url);

    let response = store.create_idea_record(&payload()).await.expect("create");
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some(MSG_FIELDS_REJECTED));
    let detail = response.detail.expect("detail");
    assert!(detail.contains("422"));
    assert!(detail.contains("INVALID_MULTIPLE_CHOICE_OPTIONS"));
}

#[tokio::test]
async fn server_error_leaves_user_message_to_caller() {
    let (url, _mock) =
        spawn_mock(AxumStatus::INTERNAL_SERVER_ERROR, json!({ "error": "SERVER_ERROR" })).await;
    let store = store_for(url);

    let response = store.create_idea_record(&payload()).await.expect("create");
    assert!(!response.success);
    assert_eq!(response.error, None);
}

#[tokio::test]
async fn malformed_success_body_is_a_transport_error() {
    let (url, _mock) = spawn_mock(AxumStatus::OK, json!(["not", "a", "record"])).await;
    let store = store_for(url);

    let err = store
        .create_idea_record(&payload())
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::Http(_)));
}

#[tokio::test]
async fn unreachable_store_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let store = store_for(format!("http://{addr}"));

    let err = store
        .create_idea_record(&payload())
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::Http(_)));
}

#[tokio::test]
async fn missing_credentials_fail_without_network() {
    let store = AirtableStore::new(AirtableConfig {
        api_url: "http://127.0.0.1:9".into(),
        ..AirtableConfig::default()
    })
    .expect("store");

    let response = store.create_idea_record(&payload()).await.expect("create");
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some(MSG_NOT_CONFIGURED));
    assert!(store.list_blog_posts().await.expect("list").is_empty());
}

#[tokio::test]
async fn blog_records_map_to_posts_and_skip_untitled() {
    let (url, _mock) = spawn_mock(
        AxumStatus::OK,
        json!({
            "records": [
                { "id": "rec1", "fields": { "Title": "Demo Day", "Slug": "demo-day", "Category": "Events", "Date": "2025-03-14" } },
                { "id": "rec2", "fields": { "Excerpt": "draft without a title" } },
                { "id": "rec3", "fields": { "Title": "Studio Notes", "Excerpt": "What we learned" } }
            ]
        }),
    )
    .await;
    let store = store_for(url);

    let posts = store.list_blog_posts().await.expect("list");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].slug, "demo-day");
    assert_eq!(posts[0].published_on, NaiveDate::from_ymd_opt(2025, 3, 14));
    assert_eq!(posts[1].slug, "rec3");
    assert_eq!(posts[1].excerpt.as_deref(), Some("What we learned"));
}

#[test]
fn table_url_appends_segments_to_versioned_api_url() {
    let store = AirtableStore::new(AirtableConfig::default()).expect("store");
    let url = store.table_url("appBase", "Blog Posts").expect("url");
    assert_eq!(url.as_str(), "https://api.airtable.com/v0/appBase/Blog%20Posts");
}

#[test]
fn rejection_messages_cover_auth_and_rate_limits() {
    assert_eq!(rejection_message(StatusCode::FORBIDDEN), Some(MSG_UNAVAILABLE));
    assert_eq!(
        rejection_message(StatusCode::TOO_MANY_REQUESTS),
        Some(MSG_RATE_LIMITED)
    );
    assert_eq!(rejection_message(StatusCode::BAD_GATEWAY), None);
}

#[tokio::test]
async fn unreadable_rejection_body_is_noted_in_detail() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf).await;
        // promise more bytes than are sent, then hang up
        stream
            .write_all(b"HTTP/1.1 429 Too Many Requests\r\ncontent-length: 64\r\n\r\ncut")
            .await
            .expect("write");
        stream.shutdown().await.expect("shutdown");
        let mut rest = Vec::new();
        let _ = stream.read_to_end(&mut rest).await;
    });
    let store = store_for(format!("http://{addr}"));

    let response = store.create_idea_record(&payload()).await.expect("create");
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some(MSG_RATE_LIMITED));
    let detail = response.detail.expect("detail");
    assert!(detail.contains("429"));
    assert!(detail.contains("body unreadable"));
}

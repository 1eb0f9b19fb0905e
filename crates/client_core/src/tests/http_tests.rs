use std::sync::Arc;

use super::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::PreferredContact;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    list_queries: Arc<Mutex<Vec<ListParams>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

fn record_json(id: i64, input: &Value) -> Value {
    let mut record = input.clone();
    record["id"] = json!(id);
    record["created_at"] = json!("2024-01-01T00:00:00Z");
    record["updated_at"] = json!("2024-01-02T00:00:00Z");
    record
}

fn sample_input() -> SubmissionInput {
    SubmissionInput {
        full_name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        phone_number: "5550001111".to_string(),
        age: 45,
        address: None,
        preferred_contact: PreferredContact::Both,
    }
}

async fn handle_list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    state.list_queries.lock().await.push(params);
    let item = record_json(
        7,
        &serde_json::to_value(sample_input()).expect("input json"),
    );
    Json(json!({ "total": 23, "items": [item] }))
}

async fn handle_get(Path(id): Path<i64>) -> impl IntoResponse {
    if id == 7 {
        let item = record_json(7, &serde_json::to_value(sample_input()).expect("input json"));
        (StatusCode::OK, Json(item))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Submission not found" })),
        )
    }
}

async fn handle_create(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.bodies.lock().await.push(body.clone());
    match body["email"].as_str() {
        Some("dup@example.com") => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": { "detail": "Duplicate email" } })),
        ),
        Some("noid@example.com") => (StatusCode::OK, Json(body)),
        _ => (StatusCode::CREATED, Json(record_json(24, &body))),
    }
}

async fn handle_update(Path(id): Path<i64>, Json(body): Json<Value>) -> impl IntoResponse {
    (StatusCode::OK, Json(record_json(id, &body)))
}

async fn handle_delete(Path(id): Path<i64>) -> impl IntoResponse {
    match id {
        99 => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Submission not found" })),
        )
            .into_response(),
        500 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn spawn_submissions_server() -> anyhow::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/submissions/", get(handle_list).post(handle_create))
        .route(
            "/api/submissions/:id",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

#[tokio::test]
async fn list_sends_offset_limit_and_search() {
    let (server_url, state) = spawn_submissions_server().await.expect("spawn server");
    let client = HttpSubmissionsClient::new(format!("{server_url}/"));

    let page = client
        .list(&ListParams {
            skip: 20,
            limit: 10,
            search: Some("grace".to_string()),
        })
        .await
        .expect("list");
    assert_eq!(page.total, 23);
    assert_eq!(page.items[0].id, SubmissionId(7));

    client
        .list(&ListParams {
            skip: 0,
            limit: 5,
            search: None,
        })
        .await
        .expect("list without search");

    let queries = state.list_queries.lock().await.clone();
    assert_eq!(queries[0].skip, 20);
    assert_eq!(queries[0].search.as_deref(), Some("grace"));
    assert_eq!(queries[1].limit, 5);
    assert_eq!(queries[1].search, None);
}

#[tokio::test]
async fn create_posts_input_and_decodes_record() {
    let (server_url, state) = spawn_submissions_server().await.expect("spawn server");
    let client = HttpSubmissionsClient::new(server_url);

    let created = client.create(&sample_input()).await.expect("create");
    assert_eq!(created.id, SubmissionId(24));
    assert_eq!(created.preferred_contact, PreferredContact::Both);

    let bodies = state.bodies.lock().await.clone();
    assert_eq!(bodies[0]["preferred_contact"], "Both");
    assert!(bodies[0].get("address").is_none());
}

#[tokio::test]
async fn create_response_without_id_is_an_error() {
    let (server_url, _) = spawn_submissions_server().await.expect("spawn server");
    let client = HttpSubmissionsClient::new(server_url);
    let mut input = sample_input();
    input.email = "noid@example.com".to_string();

    let err = client.create(&input).await.expect_err("missing id");
    assert!(matches!(err, ClientError::MissingId), "unexpected: {err:?}");
}

#[tokio::test]
async fn rejected_create_carries_nested_detail() {
    let (server_url, _) = spawn_submissions_server().await.expect("spawn server");
    let client = HttpSubmissionsClient::new(server_url);
    let mut input = sample_input();
    input.email = "dup@example.com".to_string();

    let err = client.create(&input).await.expect_err("duplicate");
    assert!(matches!(err, ClientError::Application { status: 400, .. }));
    assert_eq!(err.detail(), Some("Duplicate email"));
}

#[tokio::test]
async fn update_and_get_address_items_by_id() {
    let (server_url, _) = spawn_submissions_server().await.expect("spawn server");
    let client = HttpSubmissionsClient::new(server_url);

    let updated = client
        .update(SubmissionId(12), &sample_input())
        .await
        .expect("update");
    assert_eq!(updated.id, SubmissionId(12));

    let fetched = client.get(SubmissionId(7)).await.expect("get");
    assert_eq!(fetched.full_name, "Grace Hopper");

    let missing = client.get(SubmissionId(8)).await.expect_err("missing");
    assert!(matches!(missing, ClientError::NotFound { .. }));
}

#[tokio::test]
async fn delete_maps_status_classes() {
    let (server_url, _) = spawn_submissions_server().await.expect("spawn server");
    let client = HttpSubmissionsClient::new(server_url);

    client.delete(SubmissionId(3)).await.expect("delete");

    let not_found = client.delete(SubmissionId(99)).await.expect_err("404");
    assert_eq!(not_found.detail(), Some("Submission not found"));

    let server = client.delete(SubmissionId(500)).await.expect_err("500");
    assert!(server.is_server_fault());
    assert_eq!(server.detail(), None);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpSubmissionsClient::new(format!("http://{addr}"));
    let err = client
        .list(&ListParams {
            skip: 0,
            limit: 10,
            search: None,
        })
        .await
        .expect_err("refused");
    assert!(err.is_network(), "unexpected: {err:?}");
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let client = HttpSubmissionsClient::new("http://localhost:8000///");
    assert_eq!(client.base_url(), "http://localhost:8000");
    assert_eq!(
        client.item_url(SubmissionId(5)),
        "http://localhost:8000/api/submissions/5"
    );
}

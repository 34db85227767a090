use axum::http::StatusCode;
use funnel_core::config::Config;
use funnel_core::store::FileStore;
use funnel_core::Workspace;
use funnel_llm::{ChatClient, CopyRequest, CopyWriter, LlmCopyWriter, LlmError};
use funnel_server::{build_router, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Copy writer that answers without a network call.
struct Fixed(Result<String, (u16, String)>);

#[async_trait::async_trait]
impl CopyWriter for Fixed {
    async fn write(&self, request: &CopyRequest) -> Result<String, LlmError> {
        match &self.0 {
            Ok(text) => Ok(format!("{text} ({} items)", request.total_items())),
            Err((status, body)) => Err(LlmError::Upstream {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

fn app_with(dir: &TempDir, writer: Arc<dyn CopyWriter>) -> axum::Router {
    let workspace = Workspace::open(FileStore::for_root(dir.path())).unwrap();
    let state = AppState::new(
        dir.path().to_path_buf(),
        Config::new("test-project"),
        workspace,
        writer,
    );
    build_router(state)
}

fn app(dir: &TempDir) -> axum::Router {
    app_with(dir, Arc::new(Fixed(Ok("## Discover".into()))))
}

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            axum::body::Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => axum::body::Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

// ---------------------------------------------------------------------------
// Copy proxy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_copy_rejects_get_with_405() {
    let dir = TempDir::new().unwrap();
    let (status, json) = get(app(&dir), "/api/generate-copy").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["ok"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn generate_copy_returns_ok_and_copy() {
    let dir = TempDir::new().unwrap();
    let body = serde_json::json!({
        "funnelContent": {"discover": [{"type": "Blog Post", "name": "Hello"}]},
        "persona": "Sarah",
        "tone": "friendly"
    });
    let (status, json) = post_json(app(&dir), "/api/generate-copy", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["copy"], "## Discover (1 items)");
}

#[tokio::test]
async fn generate_copy_maps_upstream_failure_to_502() {
    let dir = TempDir::new().unwrap();
    let writer = Arc::new(Fixed(Err((401, "invalid api key".into()))));
    let (status, json) = post_json(
        app_with(&dir, writer),
        "/api/generate-copy",
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"], "invalid api key");
}

#[tokio::test]
async fn generate_copy_bad_body_is_500() {
    let dir = TempDir::new().unwrap();
    let (status, json) = post_json(
        app(&dir),
        "/api/generate-copy",
        serde_json::json!({"funnelContent": {"nowhere": []}}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["ok"], false);
}

#[tokio::test]
async fn generate_copy_through_model_client() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r###"{"choices":[{"message":{"content":"## Trust\nProof."}}]}"###)
        .create_async()
        .await;
    let client = ChatClient::new(server.url(), "m", None, Duration::from_secs(5)).unwrap();

    let dir = TempDir::new().unwrap();
    let app = app_with(&dir, Arc::new(LlmCopyWriter::new(client)));
    let (status, json) = post_json(app, "/api/generate-copy", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["copy"], "## Trust\nProof.");
}

#[tokio::test]
async fn upstream_body_passes_through_model_client() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;
    let client = ChatClient::new(server.url(), "m", None, Duration::from_secs(5)).unwrap();

    let dir = TempDir::new().unwrap();
    let app = app_with(&dir, Arc::new(LlmCopyWriter::new(client)));
    let (status, json) = post_json(app, "/api/generate-copy", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "overloaded");
}

// ---------------------------------------------------------------------------
// Workspace API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn persona_lifecycle() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, created) =
        post_json(app.clone(), "/api/personas", serde_json::json!({"name": "Sarah"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        app.clone(),
        "PUT",
        &format!("/api/personas/{id}"),
        Some(serde_json::json!({"summary": "Ops lead"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["summary"], "Ops lead");

    let (_, list) = get(app.clone(), "/api/personas").await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, deleted) = send(app.clone(), "DELETE", &format!("/api/personas/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);

    let (_, again) = send(app.clone(), "DELETE", &format!("/api/personas/{id}"), None).await;
    assert_eq!(again["deleted"], false);

    let (_, list) = get(app, "/api/personas").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn blank_persona_name_is_400() {
    let dir = TempDir::new().unwrap();
    let (status, json) =
        post_json(app(&dir), "/api/personas", serde_json::json!({"name": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn update_missing_persona_is_404() {
    let dir = TempDir::new().unwrap();
    let (status, _) = send(
        app(&dir),
        "PUT",
        "/api/personas/nope",
        Some(serde_json::json!({"summary": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assign_moves_asset_between_library_and_stages() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (_, asset) = post_json(
        app.clone(),
        "/api/library",
        serde_json::json!({"type": "Case Study", "name": "Acme"}),
    )
    .await;
    let id = asset["id"].as_str().unwrap().to_string();

    let (status, _) = post_json(
        app.clone(),
        &format!("/api/assets/{id}/assign"),
        serde_json::json!({"stage": "trust"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    post_json(
        app.clone(),
        &format!("/api/assets/{id}/assign"),
        serde_json::json!({"stage": "authority"}),
    )
    .await;

    let (_, library) = get(app.clone(), "/api/library").await;
    assert!(library.as_array().unwrap().is_empty());
    let (_, stages) = get(app.clone(), "/api/stages").await;
    let counts: Vec<u64> = stages
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![0, 0, 0, 0, 1]);

    post_json(app.clone(), &format!("/api/assets/{id}/unassign"), serde_json::json!({})).await;
    let (_, library) = get(app, "/api/library").await;
    assert_eq!(library.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn assign_to_unknown_stage_is_400() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let (_, asset) = post_json(
        app.clone(),
        "/api/library",
        serde_json::json!({"type": "Blog Post", "name": "Hello"}),
    )
    .await;
    let id = asset["id"].as_str().unwrap();
    let (status, _) = post_json(
        app,
        &format!("/api/assets/{id}/assign"),
        serde_json::json!({"stage": "awareness"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_staged_asset_cascades() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let (status, asset) = post_json(
        app.clone(),
        "/api/stages/discover",
        serde_json::json!({"type": "Blog Post", "name": "Hello"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = asset["id"].as_str().unwrap().to_string();

    let (_, deleted) = send(app.clone(), "DELETE", &format!("/api/library/{id}"), None).await;
    assert_eq!(deleted["deleted"], true);
    let (_, state) = get(app, "/api/state").await;
    assert!(state["funnelContent"]["discover"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn gaps_default_to_configured_goal() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let (_, json) = get(app.clone(), "/api/gaps").await;
    assert_eq!(json["goal"], 2);
    let gaps = json["gaps"].as_array().unwrap();
    assert_eq!(gaps.len(), 5);
    assert!(gaps.iter().all(|g| g["deficit"] == 2));
    assert_eq!(json["healthy"], false);

    let (_, json) = get(app, "/api/gaps?goal=0").await;
    assert!(json["gaps"].as_array().unwrap().is_empty());
    assert_eq!(json["healthy"], true);
}

#[tokio::test]
async fn render_and_save_copy() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, json) = get(app.clone(), "/api/copy/render").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["copy"], funnel_core::copy::EMPTY_GUIDANCE);

    let (status, _) = get(app.clone(), "/api/copy/render?tone=shouty").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app.clone(),
        "PUT",
        "/api/copy",
        Some(serde_json::json!({"copy": "# Funnel"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, saved) = get(app.clone(), "/api/copy").await;
    assert_eq!(saved["copy"], "# Funnel");
    assert!(dir.path().join(".funnel/store/marketingCopy.md").exists());

    send(app.clone(), "DELETE", "/api/copy", None).await;
    let (_, saved) = get(app, "/api/copy").await;
    assert_eq!(saved["copy"], "");
}

#[tokio::test]
async fn wizard_unlocks_follow_data() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (_, json) = post_json(
        app.clone(),
        "/api/wizard",
        serde_json::json!({"step": "content-audit"}),
    )
    .await;
    assert_eq!(json["moved"], false);
    assert_eq!(json["current"], "personas");

    post_json(app.clone(), "/api/personas", serde_json::json!({"name": "Sarah"})).await;
    let (_, json) = post_json(
        app.clone(),
        "/api/wizard",
        serde_json::json!({"step": "content_audit"}),
    )
    .await;
    assert_eq!(json["moved"], true);

    let (_, json) = get(app, "/api/wizard").await;
    assert_eq!(json["current"], "content_audit");
    let unlocked: Vec<bool> = json["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["unlocked"].as_bool().unwrap())
        .collect();
    assert_eq!(unlocked, vec![true, true, false, false]);
}

#[tokio::test]
async fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    post_json(app(&dir), "/api/personas", serde_json::json!({"name": "Sarah"})).await;
    let (_, state) = get(app(&dir), "/api/state").await;
    assert_eq!(state["project"], "test-project");
    assert_eq!(state["personas"][0]["name"], "Sarah");
    assert_eq!(state["progress"]["personas"], 1);
}

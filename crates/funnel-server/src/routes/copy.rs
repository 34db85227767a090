use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use funnel_core::copy::{self, CopyTone};
use funnel_llm::{CopyRequest, LlmError};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

fn copy_failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "ok": false, "error": message.into() });
    (status, Json(body)).into_response()
}

/// ANY /api/generate-copy: proxy a copy request to the language model.
///
/// Only POST is served. A non-success answer from the model API is passed
/// back as 502 with the upstream body; anything else that goes wrong is 500.
pub async fn generate_copy(State(app): State<AppState>, method: Method, body: Bytes) -> Response {
    if method != Method::POST {
        let mut response = copy_failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        response
            .headers_mut()
            .insert(header::ALLOW, header::HeaderValue::from_static("POST"));
        return response;
    }

    let request: CopyRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return copy_failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    match app.copy_writer.write(&request).await {
        Ok(copy) => Json(serde_json::json!({ "ok": true, "copy": copy })).into_response(),
        Err(LlmError::Upstream { status, body }) => {
            tracing::warn!(status, "model API rejected copy request");
            copy_failure(StatusCode::BAD_GATEWAY, body)
        }
        Err(e) => {
            tracing::error!(error = %e, "copy generation failed");
            copy_failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[derive(Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub tone: Option<String>,
}

/// GET /api/copy/render: deterministic template copy from current counts.
pub async fn render_copy(
    State(app): State<AppState>,
    Query(query): Query<RenderQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tone = match query.tone.as_deref() {
        Some(t) => t.parse::<CopyTone>()?,
        None => app.config.copy.tone,
    };
    let copy = app
        .with_workspace(move |ws| {
            Ok(copy::render_with_tone(
                &ws.stage_counts(),
                ws.personas(),
                tone,
            ))
        })
        .await?;
    Ok(Json(serde_json::json!({ "tone": tone, "copy": copy })))
}

/// GET /api/copy: the saved copy blob.
pub async fn get_copy(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let copy = app.with_workspace(|ws| Ok(ws.copy().to_string())).await?;
    Ok(Json(serde_json::json!({ "copy": copy })))
}

#[derive(Deserialize)]
pub struct SaveCopyBody {
    pub copy: String,
}

/// PUT /api/copy: replace the saved copy blob.
pub async fn save_copy(
    State(app): State<AppState>,
    Json(body): Json<SaveCopyBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let len = body.copy.len();
    app.with_workspace(move |ws| ws.save_copy(body.copy)).await?;
    Ok(Json(serde_json::json!({ "saved": true, "bytes": len })))
}

/// DELETE /api/copy: forget the saved copy.
pub async fn clear_copy(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    app.with_workspace(|ws| ws.clear_copy()).await?;
    Ok(Json(serde_json::json!({ "cleared": true })))
}

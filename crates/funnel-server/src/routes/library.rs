use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use funnel_core::content::{AssetDraft, AssetOrigin, AssetPatch, ContentAsset};
use funnel_core::workspace::Location;
use funnel_core::Stage;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/library: unassigned content.
pub async fn list_library(
    State(app): State<AppState>,
) -> Result<Json<Vec<ContentAsset>>, AppError> {
    let library = app.with_workspace(|ws| Ok(ws.library().to_vec())).await?;
    Ok(Json(library))
}

/// POST /api/library: add an asset; `type` and `name` are required.
pub async fn add_to_library(
    State(app): State<AppState>,
    Json(body): Json<AssetDraft>,
) -> Result<(StatusCode, Json<ContentAsset>), AppError> {
    let asset = app.with_workspace(move |ws| ws.add_to_library(body)).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// POST /api/stages/:stage: create an asset directly inside a stage.
pub async fn add_to_stage(
    State(app): State<AppState>,
    Path(stage): Path<String>,
    Json(body): Json<AssetDraft>,
) -> Result<(StatusCode, Json<ContentAsset>), AppError> {
    let stage: Stage = stage.parse()?;
    let asset = app
        .with_workspace(move |ws| ws.add_to_stage(stage, body, AssetOrigin::Manual))
        .await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// PUT /api/library/:id: edit an asset wherever it lives.
pub async fn update_asset(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AssetPatch>,
) -> Result<Json<ContentAsset>, AppError> {
    let asset = app
        .with_workspace(move |ws| ws.update_asset(&id, &body))
        .await?;
    Ok(Json(asset))
}

/// DELETE /api/library/:id: remove from the library and any stage.
pub async fn remove_from_library(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let lookup = id.clone();
    let deleted = app
        .with_workspace(move |ws| ws.remove_from_library(&lookup))
        .await?;
    Ok(Json(serde_json::json!({ "id": id, "deleted": deleted })))
}

#[derive(Deserialize)]
pub struct AssignBody {
    pub stage: String,
}

/// POST /api/assets/:id/assign: move an asset to the end of a stage.
pub async fn assign_asset(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AssignBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let stage: Stage = body.stage.parse()?;
    let lookup = id.clone();
    app.with_workspace(move |ws| ws.assign(&lookup, stage))
        .await?;
    Ok(Json(serde_json::json!({
        "id": id,
        "location": Location::Stage(stage),
    })))
}

/// POST /api/assets/:id/unassign: return a staged asset to the library.
pub async fn unassign_asset(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let lookup = id.clone();
    app.with_workspace(move |ws| ws.unassign(&lookup)).await?;
    Ok(Json(serde_json::json!({
        "id": id,
        "location": Location::Library,
    })))
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use funnel_core::persona::{Persona, PersonaDraft, PersonaPatch};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/personas: all personas in insertion order.
pub async fn list_personas(State(app): State<AppState>) -> Result<Json<Vec<Persona>>, AppError> {
    let personas = app.with_workspace(|ws| Ok(ws.personas().to_vec())).await?;
    Ok(Json(personas))
}

/// POST /api/personas: create a persona; a blank name is rejected.
pub async fn create_persona(
    State(app): State<AppState>,
    Json(body): Json<PersonaDraft>,
) -> Result<(StatusCode, Json<Persona>), AppError> {
    let persona = app.with_workspace(move |ws| ws.create_persona(body)).await?;
    tracing::info!(id = %persona.id, "persona created");
    Ok((StatusCode::CREATED, Json(persona)))
}

/// PUT /api/personas/:id: partial update.
pub async fn update_persona(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PersonaPatch>,
) -> Result<Json<Persona>, AppError> {
    let persona = app
        .with_workspace(move |ws| ws.update_persona(&id, body))
        .await?;
    Ok(Json(persona))
}

/// DELETE /api/personas/:id: idempotent.
pub async fn delete_persona(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let lookup = id.clone();
    let deleted = app
        .with_workspace(move |ws| ws.delete_persona(&lookup))
        .await?;
    Ok(Json(serde_json::json!({ "id": id, "deleted": deleted })))
}

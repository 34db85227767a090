use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/state: the full persisted state plus derived counts.
pub async fn get_state(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let (snapshot, counts, progress) = app
        .with_workspace(|ws| Ok((ws.snapshot(), ws.stage_counts(), ws.progress())))
        .await?;
    let mut body = serde_json::to_value(&snapshot)?;
    if let Some(obj) = body.as_object_mut() {
        obj.insert("project".into(), serde_json::json!(app.config.project.name));
        obj.insert("counts".into(), serde_json::to_value(counts)?);
        obj.insert("progress".into(), serde_json::to_value(progress)?);
    }
    Ok(Json(body))
}

use axum::extract::State;
use axum::Json;
use funnel_core::wizard::{Progress, Step, Wizard};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

fn wizard_json(wizard: &Wizard, progress: &Progress) -> serde_json::Value {
    serde_json::json!({
        "current": wizard.current(),
        "steps": wizard.steps(progress),
    })
}

fn current_wizard(app: &AppState) -> Result<Wizard, AppError> {
    app.wizard
        .lock()
        .map(|w| *w)
        .map_err(|_| AppError(anyhow::anyhow!("wizard lock poisoned")))
}

/// GET /api/wizard: steps with unlock flags computed from current data.
pub async fn get_wizard(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let progress = app.with_workspace(|ws| Ok(ws.progress())).await?;
    let wizard = current_wizard(&app)?;
    Ok(Json(wizard_json(&wizard, &progress)))
}

#[derive(Deserialize)]
pub struct GoToBody {
    pub step: String,
}

/// POST /api/wizard: move to a step; a locked step leaves the wizard as is.
pub async fn go_to_step(
    State(app): State<AppState>,
    Json(body): Json<GoToBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let step: Step = body.step.parse()?;
    let progress = app.with_workspace(|ws| Ok(ws.progress())).await?;
    let mut guard = app
        .wizard
        .lock()
        .map_err(|_| AppError(anyhow::anyhow!("wizard lock poisoned")))?;
    let moved = guard.go_to(step, &progress);
    let mut body = wizard_json(&guard, &progress);
    body["moved"] = serde_json::json!(moved);
    Ok(Json(body))
}

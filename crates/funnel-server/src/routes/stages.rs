use axum::extract::{Query, State};
use axum::Json;
use funnel_core::stage::STAGE_DEFS;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/stages: every stage in funnel order with its items.
pub async fn list_stages(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let goal = app.config.goal_per_stage;
    let stages = app.with_workspace(|ws| Ok(ws.stages().clone())).await?;
    let list: Vec<serde_json::Value> = STAGE_DEFS
        .iter()
        .map(|def| {
            let items = stages.get(def.stage);
            serde_json::json!({
                "stage": def.stage,
                "label": def.label,
                "purpose": def.purpose,
                "hint": def.hint,
                "count": items.len(),
                "goal": goal,
                "items": items,
            })
        })
        .collect();
    Ok(Json(serde_json::json!(list)))
}

#[derive(Deserialize)]
pub struct GapsQuery {
    #[serde(default)]
    pub goal: Option<usize>,
}

/// GET /api/gaps?goal=N: stages below the advisory goal.
pub async fn get_gaps(
    State(app): State<AppState>,
    Query(query): Query<GapsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let goal = query.goal.unwrap_or(app.config.goal_per_stage);
    let counts = app.with_workspace(|ws| Ok(ws.stage_counts())).await?;
    Ok(Json(serde_json::json!({
        "goal": goal,
        "counts": counts,
        "gaps": counts.gaps(goal),
        "healthy": counts.is_healthy(goal),
    })))
}

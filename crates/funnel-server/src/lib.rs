//! HTTP surface for the funnel planner: the copy-generation proxy plus a
//! JSON API over the local workspace.

pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{any, get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Copy generation proxy
        .route("/api/generate-copy", any(routes::copy::generate_copy))
        // State
        .route("/api/state", get(routes::state::get_state))
        // Personas
        .route(
            "/api/personas",
            get(routes::personas::list_personas).post(routes::personas::create_persona),
        )
        .route(
            "/api/personas/{id}",
            put(routes::personas::update_persona).delete(routes::personas::delete_persona),
        )
        // Content library
        .route(
            "/api/library",
            get(routes::library::list_library).post(routes::library::add_to_library),
        )
        .route(
            "/api/library/{id}",
            put(routes::library::update_asset).delete(routes::library::remove_from_library),
        )
        .route(
            "/api/assets/{id}/assign",
            post(routes::library::assign_asset),
        )
        .route(
            "/api/assets/{id}/unassign",
            post(routes::library::unassign_asset),
        )
        // Stages
        .route("/api/stages", get(routes::stages::list_stages))
        .route("/api/stages/{stage}", post(routes::library::add_to_stage))
        .route("/api/gaps", get(routes::stages::get_gaps))
        // Copy
        .route("/api/copy/render", get(routes::copy::render_copy))
        .route(
            "/api/copy",
            get(routes::copy::get_copy)
                .put(routes::copy::save_copy)
                .delete(routes::copy::clear_copy),
        )
        // Wizard
        .route(
            "/api/wizard",
            get(routes::wizard::get_wizard).post(routes::wizard::go_to_step),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the funnel API server for the project at `root`.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(AppState::load(&root)?);

    tracing::info!("funnel server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/wizard");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}

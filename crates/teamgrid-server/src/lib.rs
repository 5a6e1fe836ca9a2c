pub mod broadcast;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post};
use axum::Router;
use std::future::Future;
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
        // Availability
        .route(
            "/api/availability",
            get(routes::availability::list_availability)
                .post(routes::availability::upsert_availability),
        )
        // Live updates (SSE)
        .route(
            "/api/availability-updates",
            get(routes::events::availability_stream).post(routes::events::publish_update),
        )
        // Projects
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(routes::projects::get_project).patch(routes::projects::update_project),
        )
        .route(
            "/api/projects/{id}/members",
            post(routes::projects::add_member),
        )
        .route(
            "/api/projects/{id}/members/{user_id}",
            delete(routes::projects::remove_member),
        )
        .route(
            "/api/projects/{id}/sprints",
            get(routes::projects::list_sprints)
                .post(routes::projects::add_sprint)
                .delete(routes::projects::remove_sprint),
        )
        // Users
        .route(
            "/api/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(app_state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    serve_on(app_state, listener, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Serve on a pre-bound listener until `shutdown` resolves.
///
/// Accepting an already bound `TcpListener` lets the caller read the actual
/// port first (useful when `port = 0` and the OS picks a free port). On
/// shutdown every broadcast sink is dropped so open SSE streams end and the
/// graceful drain can finish.
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let hub = app_state.hub.clone();
    let app = build_router(app_state);

    tracing::info!("teamgrid server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let closed = hub.teardown();
            tracing::info!(closed, "shutting down, closed live update streams");
        })
        .await?;
    Ok(())
}

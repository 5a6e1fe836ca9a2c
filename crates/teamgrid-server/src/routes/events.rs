use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use std::convert::Infallible;
use teamgrid_core::event::BroadcastEvent;
use tokio_stream::StreamExt as _;

use crate::error::AppError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// GET /api/availability-updates: SSE stream with one `data:` frame per
/// published availability change, for every project.
pub async fn availability_stream(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let subscription = app.hub.subscribe();
    tracing::debug!(subscriber = subscription.id(), "viewer connected");
    let stream = subscription.map(|frame| Ok::<Event, Infallible>(Event::default().data(frame.json())));
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(app.keep_alive)
            .text("keep-alive"),
    )
}

/// POST /api/availability-updates: fan an event out to every viewer.
///
/// Delivery problems are handled inside the hub; the caller only learns
/// that the event was accepted.
pub async fn publish_update(
    State(app): State<AppState>,
    JsonBody(event): JsonBody<BroadcastEvent>,
) -> Result<Json<serde_json::Value>, AppError> {
    let report = app.hub.publish(&event)?;
    tracing::debug!(
        project = %event.project_id,
        user = %event.user_id,
        delivered = report.delivered,
        "availability update broadcast"
    );
    Ok(Json(serde_json::json!({ "success": true })))
}

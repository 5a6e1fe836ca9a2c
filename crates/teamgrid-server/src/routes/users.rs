use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use teamgrid_core::member::{NewUser, User};

use crate::error::AppError;
use crate::extract::JsonBody;
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(State(app): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let store = app.store.clone();
    let users = tokio::task::spawn_blocking(move || store.list_users())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(users))
}

/// POST /api/users
pub async fn create_user(
    State(app): State<AppState>,
    JsonBody(body): JsonBody<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = body.into_user()?;
    let store = app.store.clone();
    let user = tokio::task::spawn_blocking(move || store.create_user(user))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    tracing::info!(user = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

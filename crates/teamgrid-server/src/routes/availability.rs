use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use teamgrid_core::record::{AvailabilityRecord, AvailabilityWrite};

use crate::error::AppError;
use crate::extract::{JsonBody, QueryParams};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub project_id: Option<String>,
}

/// GET /api/availability?projectId=P: every record for the project's
/// members, regardless of date.
pub async fn list_availability(
    State(app): State<AppState>,
    QueryParams(query): QueryParams<AvailabilityQuery>,
) -> Result<Json<Vec<AvailabilityRecord>>, AppError> {
    let project_id = query
        .project_id
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::bad_request("projectId is required"))?;

    let store = app.store.clone();
    let records = tokio::task::spawn_blocking(move || store.list_project_availability(&project_id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(records))
}

/// POST /api/availability: upsert one cell and return the stored record.
/// The user must exist.
pub async fn upsert_availability(
    State(app): State<AppState>,
    JsonBody(body): JsonBody<AvailabilityWrite>,
) -> Result<Json<AvailabilityRecord>, AppError> {
    let (cell, status) = body.parse()?;

    let store = app.store.clone();
    let record = tokio::task::spawn_blocking(move || store.upsert_user_availability(&cell, status))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::debug!(cell = %record.cell().storage_key(), status = %record.status, "availability stored");
    Ok(Json(record))
}

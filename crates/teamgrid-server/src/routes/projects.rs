use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use teamgrid_core::calendar;
use teamgrid_core::project::{NewProject, Project, ProjectDetail, ProjectPatch};

use crate::error::AppError;
use crate::extract::{JsonBody, QueryParams};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub user_id: String,
}

/// Body of a sprint add, or query of a sprint removal.
#[derive(Deserialize)]
pub struct SprintRequest {
    pub date: String,
}

/// GET /api/projects
pub async fn list_projects(State(app): State<AppState>) -> Result<Json<Vec<Project>>, AppError> {
    let store = app.store.clone();
    let projects = tokio::task::spawn_blocking(move || store.list_projects())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(projects))
}

/// POST /api/projects
pub async fn create_project(
    State(app): State<AppState>,
    JsonBody(body): JsonBody<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = body.into_project()?;
    let store = app.store.clone();
    let project = tokio::task::spawn_blocking(move || store.create_project(project))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    tracing::info!(project = %project.id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/{id}: project with its members resolved.
pub async fn get_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetail>, AppError> {
    let store = app.store.clone();
    let detail = tokio::task::spawn_blocking(move || store.project_detail(&id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(detail))
}

/// PATCH /api/projects/{id}
pub async fn update_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ProjectPatch>,
) -> Result<Json<Project>, AppError> {
    let store = app.store.clone();
    let project = tokio::task::spawn_blocking(move || {
        store.update_project(&id, &mut |project| {
            patch.clone().apply(project)?;
            Ok(true)
        })
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(project))
}

/// POST /api/projects/{id}/members
pub async fn add_member(
    State(app): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<MemberRequest>,
) -> Result<Json<ProjectDetail>, AppError> {
    let store = app.store.clone();
    let detail = tokio::task::spawn_blocking(move || store.add_member(&id, &body.user_id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(detail))
}

/// DELETE /api/projects/{id}/members/{user_id}
pub async fn remove_member(
    State(app): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<ProjectDetail>, AppError> {
    let store = app.store.clone();
    let detail = tokio::task::spawn_blocking(move || store.remove_member(&id, &user_id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(detail))
}

/// GET /api/projects/{id}/sprints: sprint start dates, ascending.
pub async fn list_sprints(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    let store = app.store.clone();
    let project = tokio::task::spawn_blocking(move || store.get_project(&id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(project.sprints))
}

/// POST /api/projects/{id}/sprints
pub async fn add_sprint(
    State(app): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SprintRequest>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    let start = calendar::parse_date(&body.date)?;
    let store = app.store.clone();
    let sprints = tokio::task::spawn_blocking(move || store.add_sprint(&id, start))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(sprints))
}

/// DELETE /api/projects/{id}/sprints?date=YYYY-MM-DD
pub async fn remove_sprint(
    State(app): State<AppState>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<SprintRequest>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    let start = calendar::parse_date(&query.date)?;
    let store = app.store.clone();
    let sprints = tokio::task::spawn_blocking(move || store.remove_sprint(&id, start))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(sprints))
}

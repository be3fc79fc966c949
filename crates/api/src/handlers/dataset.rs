//! Handlers for the `/datasets` resource and `/projects/{id}/datasets`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use labelhub_core::entities::{CreateDataset, Dataset, UpdateDataset};
use labelhub_core::types::EntityId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{id}/datasets
pub async fn list_by_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Vec<Dataset>>>> {
    let datasets = state
        .gateway
        .list_datasets(Some(&user.identity), &project_id)
        .await?;
    Ok(Json(DataResponse { data: datasets }))
}

/// POST /api/v1/projects/{id}/datasets
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<EntityId>,
    Json(input): Json<CreateDataset>,
) -> AppResult<(StatusCode, Json<DataResponse<Dataset>>)> {
    let dataset = state
        .gateway
        .create_dataset(Some(&user.identity), &project_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: dataset })))
}

/// GET /api/v1/datasets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Dataset>>> {
    let dataset = state.gateway.get_dataset(Some(&user.identity), &id).await?;
    Ok(Json(DataResponse { data: dataset }))
}

/// PUT /api/v1/datasets/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateDataset>,
) -> AppResult<Json<DataResponse<Dataset>>> {
    let dataset = state
        .gateway
        .update_dataset(Some(&user.identity), &id, &input)
        .await?;
    Ok(Json(DataResponse { data: dataset }))
}

/// DELETE /api/v1/datasets/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    state.gateway.delete_dataset(Some(&user.identity), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! User status admin endpoints.

use api_types::{
    admin::{ListResponse, SearchParams},
    status::{StatusForm, StatusView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{StatusInput, UserStatus};

use crate::{
    ServerError,
    listing::{full_list, list_row},
    server::ServerState,
};

fn map_status(status: UserStatus) -> StatusView {
    StatusView {
        label: status.label().to_string(),
        id: status.id,
        status: status.status,
        title: status.title,
        description: status.description,
    }
}

fn input_from(form: StatusForm) -> StatusInput {
    StatusInput {
        status: form.status,
        title: form.title,
        description: form.description,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListResponse>, ServerError> {
    let rows = state
        .engine
        .list_statuses(params.q.as_deref())
        .await?
        .iter()
        .map(|status| list_row(status, state.site.time_zone))
        .collect();
    Ok(Json(full_list::<UserStatus>(rows)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StatusForm>,
) -> Result<(StatusCode, Json<StatusView>), ServerError> {
    let status = state.engine.create_status(&input_from(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_status(status))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<StatusView>, ServerError> {
    let status = state.engine.status(id).await?;
    Ok(Json(map_status(status)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusForm>,
) -> Result<Json<StatusView>, ServerError> {
    let status = state.engine.update_status(id, &input_from(payload)).await?;
    Ok(Json(map_status(status)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_status(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

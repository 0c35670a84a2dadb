//! Department admin endpoints.

use api_types::{
    admin::{ListResponse, SearchParams},
    department::{DepartmentForm, DepartmentView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{DepartmentInput, UserDepartment};

use crate::{
    ServerError,
    listing::{full_list, list_row},
    server::ServerState,
};

fn map_department(department: UserDepartment) -> DepartmentView {
    DepartmentView {
        label: department.label().to_string(),
        id: department.id,
        title: department.title,
        block: department.block,
        department: department.department,
        group: department.group,
        branch: department.branch,
        description: department.description,
    }
}

fn input_from(form: DepartmentForm) -> DepartmentInput {
    DepartmentInput {
        title: form.title,
        block: form.block,
        department: form.department,
        group: form.group,
        branch: form.branch,
        description: form.description,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListResponse>, ServerError> {
    let rows = state
        .engine
        .list_departments(params.q.as_deref())
        .await?
        .iter()
        .map(|department| list_row(department, state.site.time_zone))
        .collect();
    Ok(Json(full_list::<UserDepartment>(rows)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DepartmentForm>,
) -> Result<(StatusCode, Json<DepartmentView>), ServerError> {
    let department = state
        .engine
        .create_department(&input_from(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(map_department(department))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<DepartmentView>, ServerError> {
    let department = state.engine.department(id).await?;
    Ok(Json(map_department(department)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DepartmentForm>,
) -> Result<Json<DepartmentView>, ServerError> {
    let department = state
        .engine
        .update_department(id, &input_from(payload))
        .await?;
    Ok(Json(map_department(department)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_department(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

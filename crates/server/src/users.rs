//! Identity admin endpoints.
//!
//! Creating a user also creates its profile, deleting it removes the profile.

use api_types::{
    admin::{ListResponse, SearchParams},
    user::{UserForm, UserView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{EngineError, Identity, IdentityInput};

use crate::{
    ServerError,
    listing::{full_list, list_row, render_time},
    server::ServerState,
};

async fn map_user(state: &ServerState, user: Identity) -> Result<UserView, ServerError> {
    let profile_link = match state.engine.profile_by_user(user.id).await {
        Ok(profile) => Some(format!("/admin/profiles/{}", profile.id)),
        Err(EngineError::KeyNotFound(_)) => None,
        Err(err) => return Err(err.into()),
    };
    Ok(UserView {
        date_joined: render_time(user.date_joined, state.site.time_zone),
        id: user.id,
        username: user.username,
        email: user.email,
        is_active: user.is_active,
        profile_link,
    })
}

fn input_from(form: UserForm) -> IdentityInput {
    IdentityInput {
        username: form.username,
        email: form.email,
        is_active: form.is_active.unwrap_or(true),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListResponse>, ServerError> {
    let rows = state
        .engine
        .list_identities(params.q.as_deref())
        .await?
        .iter()
        .map(|user| list_row(user, state.site.time_zone))
        .collect();
    Ok(Json(full_list::<Identity>(rows)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserForm>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state.engine.create_identity(&input_from(payload)).await?;
    Ok((StatusCode::CREATED, Json(map_user(&state, user).await?)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.identity(id).await?;
    Ok(Json(map_user(&state, user).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserForm>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .update_identity(id, &input_from(payload))
        .await?;
    Ok(Json(map_user(&state, user).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_identity(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Profile admin endpoints.
//!
//! Profiles are never created here; they come into existence with their
//! user.

use api_types::{
    admin::ListResponse,
    profile::{AvatarParams, ProfileForm, ProfileInlineEdit, ProfileListParams, ProfileView},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::NaiveDate;
use csv::Writer;
use engine::{ProfileInput, ProfileListItem, ProfileQuery};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    ServerError,
    listing::{list_display, list_row, render_time},
    server::ServerState,
};

fn map_profile(state: &ServerState, item: ProfileListItem) -> ProfileView {
    let tz = state.site.time_zone;
    let user_link = item.user_link();
    let profile = item.profile;
    ProfileView {
        full_name: profile.full_name(),
        short_name: profile.short_name(),
        abbreviation: profile.abbreviation(),
        mobile_phone: profile.show_mobile_phone(state.engine.phone_region()),
        phone: profile.show_phone(state.engine.phone_region()),
        created_time: render_time(profile.created_time, tz),
        updated_time: render_time(profile.updated_time, tz),
        avatar_url: format!("/media/{}", profile.avatar),
        id: profile.id,
        user_id: profile.user_id,
        username: item.username,
        user_link,
        status_id: profile.status_id,
        status: item.status.map(|s| s.to_string()),
        department_id: profile.department_id,
        department: item.department.map(|d| d.to_string()),
        avatar: profile.avatar,
        last_name: profile.last_name,
        first_name: profile.first_name,
        middle_name: profile.middle_name,
        description: profile.description,
        experience_start: profile.experience_start,
        experience_now: profile.experience_now,
        experience_description: profile.experience_description,
        post: profile.post,
    }
}

fn query_from(params: ProfileListParams) -> ProfileQuery {
    ProfileQuery {
        search: params.q,
        status_id: params.status_id,
        department_id: params.department_id,
        post: params.post,
        page: params.page.unwrap_or(1),
        per_page: 0,
    }
}

fn input_from(form: ProfileForm) -> ProfileInput {
    ProfileInput {
        status_id: form.status_id,
        department_id: form.department_id,
        last_name: form.last_name,
        first_name: form.first_name,
        middle_name: form.middle_name,
        mobile_phone: form.mobile_phone,
        phone: form.phone,
        description: form.description,
        experience_start: form.experience_start,
        experience_now: form.experience_now,
        experience_description: form.experience_description,
        post: form.post,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ProfileListParams>,
) -> Result<Json<ListResponse>, ServerError> {
    let page = state.engine.list_profiles(&query_from(params)).await?;
    Ok(Json(ListResponse {
        entity: engine::PROFILE_ADMIN.name.to_string(),
        list_display: list_display::<ProfileListItem>(),
        rows: page
            .items
            .iter()
            .map(|item| list_row(item, state.site.time_zone))
            .collect(),
        total: page.total,
        pages: page.pages(),
        page: page.page,
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>, ServerError> {
    let item = state.engine.profile_item(id).await?;
    Ok(Json(map_profile(&state, item)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProfileForm>,
) -> Result<Json<ProfileView>, ServerError> {
    state
        .engine
        .update_profile(id, &input_from(payload))
        .await?;
    let item = state.engine.profile_item(id).await?;
    Ok(Json(map_profile(&state, item)))
}

pub async fn inline_update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProfileInlineEdit>,
) -> Result<Json<ProfileView>, ServerError> {
    state
        .engine
        .inline_update_profile(id, payload.status_id, payload.department_id)
        .await?;
    let item = state.engine.profile_item(id).await?;
    Ok(Json(map_profile(&state, item)))
}

pub async fn upload_avatar(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(params): Query<AvatarParams>,
    body: Bytes,
) -> Result<Json<ProfileView>, ServerError> {
    state
        .engine
        .set_profile_avatar(id, &params.filename, &body, &state.media)
        .await?;
    let item = state.engine.profile_item(id).await?;
    Ok(Json(map_profile(&state, item)))
}

#[derive(Serialize)]
struct ExportRow {
    id: Uuid,
    username: String,
    last_name: Option<String>,
    first_name: Option<String>,
    middle_name: Option<String>,
    status: Option<String>,
    department: Option<String>,
    post: Option<String>,
    mobile_phone: Option<String>,
    phone: Option<String>,
    experience_start: Option<NaiveDate>,
    experience_now: Option<NaiveDate>,
    created_time: String,
    updated_time: String,
}

/// Every profile matching the list filters, as CSV.
pub async fn export(
    State(state): State<ServerState>,
    Query(params): Query<ProfileListParams>,
) -> Result<impl IntoResponse, ServerError> {
    let query = ProfileQuery {
        page: 1,
        per_page: u64::MAX,
        ..query_from(params)
    };
    let page = state.engine.list_profiles(&query).await?;
    let tz = state.site.time_zone;

    let mut writer = Writer::from_writer(vec![]);
    for item in page.items {
        let profile = item.profile;
        writer
            .serialize(ExportRow {
                id: profile.id,
                username: item.username,
                last_name: profile.last_name,
                first_name: profile.first_name,
                middle_name: profile.middle_name,
                status: item.status.map(|s| s.to_string()),
                department: item.department.map(|d| d.to_string()),
                post: profile.post,
                mobile_phone: profile.mobile_phone,
                phone: profile.phone,
                experience_start: profile.experience_start,
                experience_now: profile.experience_now,
                created_time: render_time(profile.created_time, tz),
                updated_time: render_time(profile.updated_time, tz),
            })
            .map_err(|err| {
                tracing::error!("failed to serialize export row: {err}");
                ServerError::Generic("failed to build export".to_string())
            })?;
    }
    let data = writer.into_inner().map_err(|err| {
        tracing::error!("failed to finish export: {err}");
        ServerError::Generic("failed to build export".to_string())
    })?;
    tracing::info!("exported {} profiles", page.total);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"profiles.csv\"",
            ),
        ],
        data,
    ))
}

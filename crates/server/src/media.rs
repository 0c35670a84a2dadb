//! Media file serving for debug deployments.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::server::ServerState;

fn content_type(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

pub async fn serve(
    State(state): State<ServerState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let file = state.media.resolve(&path).map_err(|_| StatusCode::NOT_FOUND)?;
    let data = tokio::fs::read(&file).await.map_err(|err| {
        tracing::debug!("media file {} not readable: {err}", file.display());
        StatusCode::NOT_FOUND
    })?;
    Ok(([(header::CONTENT_TYPE, content_type(&path))], data))
}

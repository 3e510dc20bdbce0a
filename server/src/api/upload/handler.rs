//! Image Upload Handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub size: usize,
    pub url: String,
}

/// POST /api/upload - 上传商品图片 (multipart, 字段名 `file`)
pub async fn upload(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::validation("Missing file name"))?;
        let data = field.bytes().await?;

        let filename = state.image_store.put(&original_name, &data).await?;
        tracing::info!(user = %user.id, file = %filename, "image uploaded");

        return Ok(Json(UploadResponse {
            url: state.config.image_url(&filename),
            size: data.len(),
            filename,
        }));
    }

    Err(AppError::validation("No 'file' field in upload"))
}

#[derive(Debug, Deserialize)]
pub struct DeleteUploadQuery {
    /// Full image URL or bare stored filename
    pub url: String,
}

/// DELETE /api/upload?url=... - 删除已上传图片
pub async fn delete_upload(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<DeleteUploadQuery>,
) -> AppResult<Json<bool>> {
    let filename = query
        .url
        .rsplit('/')
        .next()
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::validation("Invalid image url"))?;

    state.image_store.delete(filename).await?;
    tracing::info!(user = %user.id, file = %filename, "image deleted");
    Ok(Json(true))
}

/// GET /api/images/:filename - 读取已上传图片
pub async fn serve_image(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(AppError::validation("Invalid image filename"));
    }

    let path = state.image_store.images_dir().join(&filename);
    let data = match fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::not_found(format!("Image {filename} not found")));
        }
        Err(e) => return Err(AppError::internal(format!("Failed to read image: {e}"))),
    };

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.as_ref().to_string())],
        data,
    )
        .into_response())
}

//! # 파일 업로드 핸들러
//!
//! - `POST /uploads/exercise-image` (multipart `file`) → `{ "url": "/uploads/exercises/..." }`

use crate::{
    error::AppError,
    middleware::auth::TrainerUser,
    routes::AppState,
    services::uploads::save_exercise_image,
};
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Value};

/// multipart 본문에서 `file` 필드를 찾아 (파일명, 내용)을 돌려줍니다.
pub(crate) async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| AppError::BadRequest("File name is required".to_string()))?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read uploaded file: {}", e)))?;

        return Ok((filename, data));
    }

    Err(AppError::BadRequest("Missing 'file' field".to_string()))
}

pub async fn upload_exercise_image(
    State(state): State<AppState>,
    _trainer: TrainerUser,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let (filename, data) = read_file_field(&mut multipart).await?;
    let url = save_exercise_image(&state.uploads_path, &filename, &data).await?;

    Ok(Json(json!({ "url": url })))
}

//! # 운동 이미지 업로드 저장
//!
//! 트레이너가 올린 이미지를 `UPLOADS_PATH/exercises/` 아래에 저장하고
//! `/uploads/exercises/<파일명>` URL을 돌려줍니다. 정적 서빙은 main.rs의 `ServeDir`이 합니다.

use std::path::PathBuf;

use tokio::fs;

use crate::error::AppError;

const IMAGE_DIR: &str = "exercises";
const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// 허용된 이미지 확장자면 소문자로 돌려줍니다.
pub fn image_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// 저장 파일명: `<slug>-<uuid>.<ext>`
///
/// 원래 이름은 slug로 바꿔 경로 문자가 들어가지 않게 하고, uuid로 충돌을 피합니다.
pub fn stored_file_name(filename: &str, ext: &str) -> String {
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    let slug = slug::slugify(stem);
    let id = uuid::Uuid::now_v7();
    if slug.is_empty() {
        format!("{}.{}", id, ext)
    } else {
        format!("{}-{}.{}", slug, id, ext)
    }
}

/// 이미지를 디스크에 저장하고 공개 URL을 반환합니다.
pub async fn save_exercise_image(
    uploads_path: &str,
    filename: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let ext = image_extension(filename).ok_or_else(|| {
        AppError::BadRequest("Only png, jpg, jpeg, gif or webp images are accepted".to_string())
    })?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    let name = stored_file_name(filename, &ext);
    let dir = PathBuf::from(uploads_path).join(IMAGE_DIR);
    fs::create_dir_all(&dir).await?;
    fs::write(dir.join(&name), bytes).await?;

    tracing::debug!(file = %name, size = bytes.len(), "Stored exercise image");
    Ok(format!("/uploads/{}/{}", IMAGE_DIR, name))
}

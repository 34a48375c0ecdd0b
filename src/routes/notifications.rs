//! # 알림 핸들러
//!
//! - `GET /notifications` → 최신 50개
//! - `PUT /notifications/{id}/read`
//! - `PUT /notifications/read-all`
//!
//! 트레이너와 학생 모두 자기 알림만 다룹니다 (`AuthUser`).

use crate::{db, error::AppError, middleware::auth::AuthUser, routes::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /notifications` — `{ "notifications": [...] }`
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let notifications = db::list_notifications(&state.pool, &user.user_id).await?;
    Ok(Json(json!({ "notifications": notifications })))
}

/// `PUT /notifications/{id}/read` — 204. 남의 알림이거나 없으면 404
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !db::mark_notification_read(&state.pool, &user.user_id, &id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /notifications/read-all` — 바뀐 개수를 `{ "updated": n }`으로 돌려줍니다.
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let updated = db::mark_all_notifications_read(&state.pool, &user.user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}

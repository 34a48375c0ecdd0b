//! # 알림 데이터베이스 쿼리 모듈
//!
//! 학생 등록, 새 운동 계획 배정 같은 이벤트가 생기면 `notifications` 테이블에
//! 한 줄씩 쌓입니다. 읽음 처리는 항상 본인 알림으로 제한합니다.

use crate::error::AppError;
use crate::models::Notification;
use sqlx::SqlitePool;

/// 목록 조회 시 최대 개수
const NOTIFICATION_LIMIT: i64 = 50;

/// 알림 한 건을 저장합니다.
///
/// # 매개변수
/// - `user_id`: 받는 사람
/// - `kind`: `models::kind`의 상수 (`WORKOUT`, `INFO` 등). JSON에서는 `type`으로 나갑니다.
pub async fn create_notification(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    message: &str,
    kind: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, title, message, kind)
        VALUES (?, ?, ?, ?, ?)
        "#,
        // is_read, created_at은 테이블 기본값 사용
    )
    // UUIDv7: 시간 순으로 정렬되는 ID
    .bind(uuid::Uuid::now_v7().to_string())
    .bind(user_id)
    .bind(title)
    .bind(message)
    .bind(kind)
    .execute(pool)
    .await?;

    Ok(())
}

/// 최신 알림 50개
pub async fn list_notifications(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<Notification>, AppError> {
    let notifications = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, user_id, title, message, kind, is_read, created_at
        FROM notifications
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#,
        // ↑ 같은 밀리초에 생긴 알림은 rowid(삽입 순서)로 최신 것을 앞에
    )
    .bind(user_id)
    .bind(NOTIFICATION_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

/// 알림 하나를 읽음 처리합니다.
///
/// # 반환값
/// - `Ok(true)`: 처리됨 (이미 읽은 알림도 true)
/// - `Ok(false)`: 본인 알림이 아니거나 없음
pub async fn mark_notification_read(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 안 읽은 알림을 모두 읽음 처리하고, 바뀐 개수를 반환합니다.
pub async fn mark_all_notifications_read(pool: &SqlitePool, user_id: &str) -> Result<u64, AppError> {
    // is_read = 0 조건: 이미 읽은 알림은 개수에 포함하지 않음
    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

//! 대시보드 통계용 집계 쿼리
//!
//! 모두 `query_scalar`로 값 하나(개수 또는 날짜 목록)만 꺼냅니다.

use crate::error::AppError;
use sqlx::SqlitePool;

/// 트레이너가 담당하는 학생 수
pub async fn count_students(pool: &SqlitePool, personal_id: &str) -> Result<i64, AppError> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE role = 'student' AND personal_id = ?",
    )
    .bind(personal_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// 보관되지 않은 운동 계획 수
pub async fn count_current_workouts(pool: &SqlitePool, personal_id: &str) -> Result<i64, AppError> {
    let count =
        sqlx::query_scalar("SELECT COUNT(*) FROM workouts WHERE personal_id = ? AND archived = 0")
            .bind(personal_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// `since` 이후 담당 학생들이 남긴 기록 수
pub async fn count_student_progress_since(
    pool: &SqlitePool,
    personal_id: &str,
    since: &str,
) -> Result<i64, AppError> {
    let count = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM progress p
        JOIN users u ON u.id = p.student_id
        WHERE u.personal_id = ? AND p.logged_at >= ?
        "#,
        // ↑ logged_at은 ISO 8601 문자열이라 문자열 비교가 곧 시간 비교
    )
    .bind(personal_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

pub async fn count_progress(pool: &SqlitePool, student_id: &str) -> Result<i64, AppError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM progress WHERE student_id = ?")
        .bind(student_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// 기록이 있는 날짜 (`YYYY-MM-DD`, 중복 없음, 최신순)
pub async fn progress_dates(pool: &SqlitePool, student_id: &str) -> Result<Vec<String>, AppError> {
    let dates = sqlx::query_scalar(
        r#"
        SELECT DISTINCT substr(logged_at, 1, 10) AS day
        FROM progress
        WHERE student_id = ?
        ORDER BY day DESC
        "#,
        // ↑ substr(…, 1, 10): "2024-05-01T07:30:00.000Z" → "2024-05-01"
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(dates)
}

//! # 운동 기록 데이터베이스 쿼리 모듈
//!
//! 학생이 운동을 마칠 때마다 `progress`에 한 줄을 남깁니다.
//! 세트별 기록(`SetLog` 목록)은 `sets_completed` 컬럼에 JSON 텍스트로 저장되고,
//! 읽을 때 `sqlx::types::Json`이 다시 구조체로 바꿔 줍니다.

use crate::error::AppError;
use crate::models::{ProgressEntry, SetLog};
use sqlx::SqlitePool;

/// 운동 기록 한 건을 저장하고 저장된 행을 돌려줍니다.
///
/// # 매개변수
/// - `student_id`: 기록을 남긴 학생 (핸들러에서 토큰으로 확인한 본인)
/// - `workout_id`: 어떤 운동 계획을 하다가 남긴 기록인지
/// - `sets_completed`: 세트별 무게/횟수. 빈 슬라이스도 허용합니다.
/// - `notes`: 선택 메모
///
/// # 반환값
/// - `Ok(ProgressEntry)`: `logged_at`이 채워진 저장 결과
pub async fn log_progress(
    pool: &SqlitePool,
    student_id: &str,
    workout_id: &str,
    exercise_name: &str,
    sets_completed: &[SetLog],
    notes: Option<&str>,
) -> Result<ProgressEntry, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    // &[SetLog] → JSON 문자열. 직렬화 실패는 서버 내부 에러로 취급
    let sets = serde_json::to_string(sets_completed)
        .map_err(|e| AppError::Internal(format!("Failed to serialize sets: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO progress (id, student_id, workout_id, exercise_name, sets_completed, notes)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(student_id)
    .bind(workout_id)
    .bind(exercise_name)
    .bind(sets)
    .bind(notes)
    .execute(pool)
    .await?;

    // logged_at은 DB 기본값으로 채워지므로 다시 조회해서 반환
    let entry = sqlx::query_as::<_, ProgressEntry>(
        r#"
        SELECT id, student_id, workout_id, exercise_name, sets_completed, notes, logged_at
        FROM progress WHERE id = ?
        "#,
    )
    .bind(&id)
    .fetch_one(pool)
    .await?;

    Ok(entry)
}

/// 한 번에 돌려주는 최대 기록 수
const PROGRESS_LIMIT: i64 = 500;

/// 기록 조회 범위
#[derive(Debug, Clone, Copy)]
pub enum ProgressScope<'a> {
    /// 학생 한 명의 기록
    Student(&'a str),
    /// 트레이너가 담당하는 모든 학생의 기록
    Personal(&'a str),
}

/// 운동 기록 목록. `exercise_name`이 있으면 그 운동만.
///
/// `ascending`이 true면 오래된 순 (변화 추이 차트용), 아니면 최신순.
/// 어느 쪽이든 최대 `PROGRESS_LIMIT`개입니다.
pub async fn list_progress(
    pool: &SqlitePool,
    scope: ProgressScope<'_>,
    exercise_name: Option<&str>,
    ascending: bool,
) -> Result<Vec<ProgressEntry>, AppError> {
    let (filter, scope_id) = match scope {
        ProgressScope::Student(id) => ("student_id = ?", id),
        ProgressScope::Personal(id) => (
            "student_id IN (SELECT id FROM users WHERE role = 'student' AND personal_id = ?)",
            id,
        ),
    };
    // 정렬 방향은 바인딩할 수 없는 SQL 키워드라 format!으로 넣습니다.
    // 고정된 두 문자열 중 하나이므로 사용자 입력이 SQL에 섞이지 않습니다.
    let order = if ascending { "ASC" } else { "DESC" };

    let entries = sqlx::query_as::<_, ProgressEntry>(&format!(
        r#"
        SELECT id, student_id, workout_id, exercise_name, sets_completed, notes, logged_at
        FROM progress
        WHERE {filter} AND (? IS NULL OR exercise_name = ?)
        ORDER BY logged_at {order}, rowid {order}
        LIMIT ?
        "#
        // ↑ (? IS NULL OR exercise_name = ?): 같은 값을 두 번 바인딩해서
        //   None이면 조건 전체가 참, Some이면 이름이 일치하는 행만
    ))
    .bind(scope_id)
    .bind(exercise_name)
    .bind(exercise_name)
    .bind(PROGRESS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

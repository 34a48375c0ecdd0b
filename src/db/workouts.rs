//! # 운동 계획 쿼리
//!
//! 슬롯 = (student_id, personal_id, routine_id). 학생이 지정된 슬롯에서는
//! 보관되지 않은 문서가 최대 하나이고 버전은 1부터 중복 없이 증가합니다.
//! 두 조건은 마이그레이션의 부분 유니크 인덱스가 보장하며, `insert_versioned`는
//! 버전 계산, 이전 문서 보관, 삽입을 한 트랜잭션에서 처리합니다.
//!
//! 트랜잭션은 `BEGIN IMMEDIATE`로 열어 시작 시점에 쓰기 잠금을 잡습니다.
//! 다른 업로드는 busy_timeout 동안 기다렸다가 차례로 들어옵니다.
//!
//! 학생이 지정되지 않은 문서는 슬롯이 없으므로 항상 버전 1로 저장됩니다.

use std::time::Duration;

use crate::error::AppError;
use crate::models::{NewWorkout, Workout, WorkoutDay};
use rand_core::{OsRng, RngCore};
use sqlx::{types::Json, SqlitePool};

const WORKOUT_COLUMNS: &str =
    "id, name, student_id, personal_id, routine_id, days, version, archived, created_at, updated_at";

/// 동시 업로드 충돌 시 전체 트랜잭션을 다시 시도하는 횟수
const MAX_INSERT_ATTEMPTS: u32 = 3;

/// 조회 범위: 트레이너는 자신이 만든 문서, 학생은 자신에게 배정된 문서
#[derive(Debug, Clone, Copy)]
pub enum WorkoutScope<'a> {
    Personal(&'a str),
    Student(&'a str),
}

impl WorkoutScope<'_> {
    fn column(&self) -> &'static str {
        match self {
            WorkoutScope::Personal(_) => "personal_id",
            WorkoutScope::Student(_) => "student_id",
        }
    }

    fn id(&self) -> &str {
        match self {
            WorkoutScope::Personal(id) | WorkoutScope::Student(id) => id,
        }
    }
}

/// 재시도 전 대기 시간: 시도 횟수 × 25ms + 0~19ms 무작위 지연
///
/// 같은 순간에 실패한 업로드들이 동시에 다시 부딪히지 않도록 흩어 놓습니다.
fn retry_backoff(attempt: u32) -> Duration {
    let jitter = u64::from(OsRng.next_u32() % 20);
    Duration::from_millis(25 * u64::from(attempt) + jitter)
}

/// SQLite: unique 위반, SQLITE_BUSY(5), SQLITE_LOCKED(6), SQLITE_BUSY_SNAPSHOT(517)
fn is_retryable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                || matches!(db_err.code().as_deref(), Some("5" | "6" | "517"))
        }
        _ => false,
    }
}

/// 새 운동 계획을 다음 버전으로 저장하고, 같은 슬롯의 이전 문서를 보관합니다.
///
/// # 매개변수
/// - `new`: 저장할 문서. `student_id`가 None이면 버전 관리 없이 버전 1로 저장
///
/// # 반환값
/// - `Ok(Workout)`: 저장된 새 문서 (`archived = false`)
/// - `Err(AppError::Conflict)`: 재시도를 다 써도 충돌이 계속된 경우 (409)
pub async fn insert_versioned(pool: &SqlitePool, new: &NewWorkout<'_>) -> Result<Workout, AppError> {
    let days = serde_json::to_string(new.days)
        .map_err(|e| AppError::Internal(format!("Failed to serialize workout days: {}", e)))?;

    // 직렬화는 한 번만 하고 재시도마다 같은 문자열을 씁니다.
    let mut attempt = 1;
    loop {
        match try_insert_versioned(pool, new, &days).await {
            Ok(workout) => return Ok(workout),
            Err(e) if is_retryable(&e) && attempt < MAX_INSERT_ATTEMPTS => {
                tracing::warn!(attempt, student_id = ?new.student_id, "Workout slot conflict, retrying: {}", e);
                tokio::time::sleep(retry_backoff(attempt)).await;
                attempt += 1;
            }
            Err(e) if is_retryable(&e) => {
                tracing::warn!(student_id = ?new.student_id, "Workout slot conflict persisted: {}", e);
                return Err(AppError::Conflict(
                    "Workout was updated concurrently, please try again".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn try_insert_versioned(
    pool: &SqlitePool,
    new: &NewWorkout<'_>,
    days: &str,
) -> Result<Workout, sqlx::Error> {
    let id = uuid::Uuid::now_v7().to_string();
    // 읽기(MAX) 뒤에 쓰기로 승격하다 SQLITE_BUSY로 끝나는 일을 막기 위해 처음부터 쓰기 잠금
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let version: i64 = match new.student_id {
        Some(student_id) => {
            // 1) 다음 버전 = 슬롯 안의 최대 버전 + 1 (보관된 문서 포함, 없으면 1)
            let next: i64 = sqlx::query_scalar(
                r#"
                SELECT COALESCE(MAX(version), 0) + 1 FROM workouts
                WHERE student_id = ? AND personal_id = ? AND COALESCE(routine_id, '') = COALESCE(?, '')
                "#,
            )
            .bind(student_id)
            .bind(new.personal_id)
            .bind(new.routine_id)
            // &mut *tx: 트랜잭션 안의 연결을 빌려서 실행
            .fetch_one(&mut *tx)
            .await?;

            // 2) 현재 문서를 보관 처리
            sqlx::query(
                r#"
                UPDATE workouts
                SET archived = 1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                WHERE student_id = ? AND personal_id = ? AND COALESCE(routine_id, '') = COALESCE(?, '')
                  AND archived = 0
                "#,
            )
            .bind(student_id)
            .bind(new.personal_id)
            .bind(new.routine_id)
            .execute(&mut *tx)
            .await?;

            next
        }
        // 슬롯이 없는 문서는 다른 문서와 겹치지 않음
        None => 1,
    };

    // 3) 새 문서 삽입

    sqlx::query(
        r#"
        INSERT INTO workouts (id, name, student_id, personal_id, routine_id, days, version, archived)
        VALUES (?, ?, ?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(&id)
    .bind(new.name)
    .bind(new.student_id)
    .bind(new.personal_id)
    .bind(new.routine_id)
    .bind(days)
    .bind(version)
    .execute(&mut *tx)
    .await?;

    let workout = sqlx::query_as::<_, Workout>(&format!(
        "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?"
    ))
    .bind(&id)
    .fetch_one(&mut *tx)
    .await?;

    // commit 전에 에러로 빠져나가면 tx가 drop되면서 자동 롤백됩니다.
    tx.commit().await?;
    Ok(workout)
}

/// 보관되지 않은 운동 계획 목록 (최신순)
///
/// # 매개변수
/// - `scope`: 트레이너는 자신이 만든 문서, 학생은 자신에게 배정된 문서
/// - `student_id`, `routine_id`: 선택 필터. None이면 거르지 않음
pub async fn list_current_workouts(
    pool: &SqlitePool,
    scope: &WorkoutScope<'_>,
    student_id: Option<&str>,
    routine_id: Option<&str>,
) -> Result<Vec<Workout>, AppError> {
    let workouts = sqlx::query_as::<_, Workout>(&format!(
        r#"
        SELECT {WORKOUT_COLUMNS} FROM workouts
        WHERE {scope_column} = ? AND archived = 0
          AND (? IS NULL OR student_id = ?)
          AND (? IS NULL OR routine_id = ?)
        ORDER BY created_at DESC, rowid DESC
        "#,
        // 컬럼 이름은 바인딩할 수 없어 format!으로 넣습니다 (고정된 두 값 중 하나).
        scope_column = scope.column(),
    ))
    .bind(scope.id())
    .bind(student_id)
    .bind(student_id)
    .bind(routine_id)
    .bind(routine_id)
    .fetch_all(pool)
    .await?;

    Ok(workouts)
}

/// 한 슬롯의 모든 버전 (버전 내림차순, 보관된 문서 포함)
///
/// 트레이너 전용입니다. 다른 트레이너의 슬롯은 빈 목록이 됩니다.
pub async fn list_workout_history(
    pool: &SqlitePool,
    personal_id: &str,
    student_id: &str,
    routine_id: Option<&str>,
) -> Result<Vec<Workout>, AppError> {
    let workouts = sqlx::query_as::<_, Workout>(&format!(
        r#"
        SELECT {WORKOUT_COLUMNS} FROM workouts
        WHERE personal_id = ? AND student_id = ? AND COALESCE(routine_id, '') = COALESCE(?, '')
        ORDER BY version DESC
        "#
    ))
    .bind(personal_id)
    .bind(student_id)
    .bind(routine_id)
    .fetch_all(pool)
    .await?;

    Ok(workouts)
}

/// 범위 확인 없이 ID로 조회합니다. 범위 확인이 끝난 뒤나 테스트에서만 씁니다.
pub async fn find_workout(pool: &SqlitePool, id: &str) -> Result<Option<Workout>, AppError> {
    let workout =
        sqlx::query_as::<_, Workout>(&format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(workout)
}

/// 범위 안의 문서만 돌려줍니다. 범위 밖이면 None.
pub async fn get_workout(
    pool: &SqlitePool,
    scope: &WorkoutScope<'_>,
    id: &str,
) -> Result<Option<Workout>, AppError> {
    let workout = sqlx::query_as::<_, Workout>(&format!(
        "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ? AND {} = ?",
        scope.column()
    ))
    .bind(id)
    .bind(scope.id())
    .fetch_optional(pool)
    .await?;

    Ok(workout)
}

/// 운동 항목 하나의 `image_url`만 교체합니다. 버전은 바뀌지 않습니다.
pub async fn update_exercise_image(
    pool: &SqlitePool,
    personal_id: &str,
    id: &str,
    day_index: usize,
    exercise_index: usize,
    image_url: &str,
) -> Result<Workout, AppError> {
    let workout = get_workout(pool, &WorkoutScope::Personal(personal_id), id)
        .await?
        .ok_or(AppError::NotFound)?;

    // Json 래퍼를 벗겨서 Vec<WorkoutDay>를 직접 수정
    let Json(mut days): Json<Vec<WorkoutDay>> = workout.days;
    let exercise = days
        .get_mut(day_index)
        .and_then(|day| day.exercises.get_mut(exercise_index))
        // 인덱스가 범위를 벗어나면 400
        .ok_or_else(|| AppError::BadRequest("Invalid day or exercise index".to_string()))?;
    exercise.image_url = Some(image_url.to_string());

    let days = serde_json::to_string(&days)
        .map_err(|e| AppError::Internal(format!("Failed to serialize workout days: {}", e)))?;

    sqlx::query(
        r#"
        UPDATE workouts
        SET days = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(days)
    .bind(id)
    .execute(pool)
    .await?;

    find_workout(pool, id).await?.ok_or(AppError::NotFound)
}

/// 운동 계획 하나를 삭제합니다. 이전 버전들은 그대로 남습니다.
///
/// 삭제된 행이 없으면 false (없거나 다른 트레이너의 문서).
pub async fn delete_workout(pool: &SqlitePool, personal_id: &str, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM workouts WHERE id = ? AND personal_id = ?")
        .bind(id)
        .bind(personal_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{
        sample_days, seed_personal, seed_student, seed_workout, setup_file_test_db, setup_test_db,
    };

    #[tokio::test]
    async fn versions_increase_and_only_latest_is_current() {
        let pool = setup_test_db().await;
        let coach = seed_personal(&pool, "coach@example.com").await;
        let student = seed_student(&pool, &coach, "aluno@example.com").await;

        let mut ids = Vec::new();
        for expected in 1..=3 {
            let w = seed_workout(&pool, &coach, Some(&student), None).await;
            assert_eq!(w.version, expected);
            assert!(!w.archived);
            ids.push(w.id);
        }

        let history = list_workout_history(&pool, &coach, &student, None).await.unwrap();
        let versions: Vec<i64> = history.iter().map(|w| w.version).collect();
        assert_eq!(versions, [3, 2, 1]);
        assert_eq!(history.iter().filter(|w| !w.archived).count(), 1);
        assert_eq!(history[0].id, ids[2]);
    }

    #[tokio::test]
    async fn concurrent_uploads_on_shared_file_db_all_succeed() {
        let dir = std::env::temp_dir().join(format!("trainerdesk-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let pool = setup_file_test_db(&dir.join("workouts.db")).await;
        let coach = seed_personal(&pool, "coach@example.com").await;
        let student = seed_student(&pool, &coach, "aluno@example.com").await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let pool = pool.clone();
            let coach = coach.clone();
            let student = student.clone();
            handles.push(tokio::spawn(async move {
                let days = sample_days();
                let name = format!("Treino {}", i);
                insert_versioned(
                    &pool,
                    &NewWorkout {
                        name: &name,
                        student_id: Some(&student),
                        personal_id: &coach,
                        routine_id: Some("hipertrofia"),
                        days: &days,
                    },
                )
                .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let history = list_workout_history(&pool, &coach, &student, Some("hipertrofia"))
            .await
            .unwrap();
        let mut versions: Vec<i64> = history.iter().map(|w| w.version).collect();
        versions.sort();
        assert_eq!(versions, (1..=8).collect::<Vec<i64>>());
        assert_eq!(history.iter().filter(|w| !w.archived).count(), 1);

        pool.close().await;
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn slot_unique_violations_are_retryable() {
        let pool = setup_test_db().await;
        let coach = seed_personal(&pool, "coach@example.com").await;
        let student = seed_student(&pool, &coach, "aluno@example.com").await;
        let existing = seed_workout(&pool, &coach, Some(&student), None).await;

        // 같은 슬롯에 같은 버전으로 직접 삽입하면 uq_workouts_slot_version 위반
        let err = sqlx::query(
            "INSERT INTO workouts (id, name, student_id, personal_id, routine_id, days, version, archived)
             VALUES (?, 'Treino B', ?, ?, NULL, '[]', ?, 1)",
        )
        .bind(uuid::Uuid::now_v7().to_string())
        .bind(&student)
        .bind(&coach)
        .bind(existing.version)
        .execute(&pool)
        .await
        .unwrap_err();

        assert!(is_retryable(&err));
        assert!(!is_retryable(&sqlx::Error::RowNotFound));
        assert!(retry_backoff(2) >= Duration::from_millis(50));
        assert!(retry_backoff(2) < Duration::from_millis(70));
    }

    #[tokio::test]
    async fn unassigned_workouts_are_never_versioned() {
        let pool = setup_test_db().await;
        let coach = seed_personal(&pool, "coach@example.com").await;

        let first = seed_workout(&pool, &coach, None, None).await;
        let second = seed_workout(&pool, &coach, None, None).await;

        assert_eq!((first.version, second.version), (1, 1));
        let current = list_current_workouts(&pool, &WorkoutScope::Personal(&coach), None, None)
            .await
            .unwrap();
        assert_eq!(current.len(), 2);
    }

    #[tokio::test]
    async fn student_scope_only_sees_assigned_workouts() {
        let pool = setup_test_db().await;
        let coach = seed_personal(&pool, "coach@example.com").await;
        let ana = seed_student(&pool, &coach, "ana@example.com").await;
        let bia = seed_student(&pool, &coach, "bia@example.com").await;
        let for_ana = seed_workout(&pool, &coach, Some(&ana), None).await;
        seed_workout(&pool, &coach, Some(&bia), None).await;

        let visible = list_current_workouts(&pool, &WorkoutScope::Student(&ana), None, None)
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, for_ana.id);

        let filtered =
            list_current_workouts(&pool, &WorkoutScope::Personal(&coach), Some(&bia), None)
                .await
                .unwrap();
        assert_eq!(filtered.len(), 1);

        assert!(get_workout(&pool, &WorkoutScope::Student(&bia), &for_ana.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn exercise_image_patch_keeps_version() {
        let pool = setup_test_db().await;
        let coach = seed_personal(&pool, "coach@example.com").await;
        let student = seed_student(&pool, &coach, "aluno@example.com").await;
        let w = seed_workout(&pool, &coach, Some(&student), None).await;

        let updated = update_exercise_image(&pool, &coach, &w.id, 0, 1, "/uploads/crucifixo.png")
            .await
            .unwrap();
        assert_eq!(updated.version, w.version);
        assert_eq!(
            updated.days[0].exercises[1].image_url.as_deref(),
            Some("/uploads/crucifixo.png")
        );
        assert_eq!(updated.days[0].exercises[0], sample_days()[0].exercises[0]);

        let out_of_range = update_exercise_image(&pool, &coach, &w.id, 0, 9, "x").await;
        assert!(matches!(out_of_range, Err(AppError::BadRequest(_))));

        let other = seed_personal(&pool, "other@example.com").await;
        let foreign = update_exercise_image(&pool, &other, &w.id, 0, 0, "x").await;
        assert!(matches!(foreign, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn delete_is_scoped_to_owner() {
        let pool = setup_test_db().await;
        let coach = seed_personal(&pool, "coach@example.com").await;
        let other = seed_personal(&pool, "other@example.com").await;
        let w = seed_workout(&pool, &coach, None, None).await;

        assert!(!delete_workout(&pool, &other, &w.id).await.unwrap());
        assert!(delete_workout(&pool, &coach, &w.id).await.unwrap());
        assert!(find_workout(&pool, &w.id).await.unwrap().is_none());
    }
}

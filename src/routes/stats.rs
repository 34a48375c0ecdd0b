//! # 대시보드 통계 핸들러
//!
//! - `GET /stats/personal` (트레이너)
//! - `GET /stats/student` (학생)

use crate::{
    db::{self, WorkoutScope},
    error::AppError,
    middleware::auth::{StudentUser, TrainerUser},
    models::{PersonalStats, StudentStats},
    routes::AppState,
    services::progress::workout_streak,
};
use axum::{extract::State, Json};
use chrono::{Duration, Utc};

/// 최근 기록 집계 기간 (일)
const RECENT_PROGRESS_DAYS: i64 = 7;

/// 학생 수, 현재 계획 수, 최근 7일 기록 수
pub async fn personal_stats(
    State(state): State<AppState>,
    trainer: TrainerUser,
) -> Result<Json<PersonalStats>, AppError> {
    // DB의 logged_at과 같은 형식이어야 문자열 비교가 맞습니다.
    let since = (Utc::now() - Duration::days(RECENT_PROGRESS_DAYS))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    Ok(Json(PersonalStats {
        students_count: db::count_students(&state.pool, &trainer.user_id).await?,
        workouts_count: db::count_current_workouts(&state.pool, &trainer.user_id).await?,
        recent_progress: db::count_student_progress_since(&state.pool, &trainer.user_id, &since)
            .await?,
    }))
}

/// 현재 계획의 운동 수, 기록 수, 연속 운동 일수
pub async fn student_stats(
    State(state): State<AppState>,
    student: StudentUser,
) -> Result<Json<StudentStats>, AppError> {
    let workouts = db::list_current_workouts(
        &state.pool,
        &WorkoutScope::Student(&student.user_id),
        None,
        None,
    )
    .await?;
    let dates = db::progress_dates(&state.pool, &student.user_id).await?;

    Ok(Json(StudentStats {
        total_exercises: workouts.iter().map(|w| w.exercise_count()).sum(),
        progress_logged: db::count_progress(&state.pool, &student.user_id).await?,
        workout_streak: workout_streak(dates.as_slice(), Utc::now().date_naive()),
        has_workout: !workouts.is_empty(),
    }))
}

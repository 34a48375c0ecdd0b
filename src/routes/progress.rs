//! # 운동 기록 핸들러
//!
//! - `POST /progress` → 기록 남기기 (학생 전용)
//! - `GET  /progress?exercise_name=&student_id=`
//! - `GET  /progress/evolution?exercise_name=&student_id=` → 차트용 점 목록 (오래된 순)
//!
//! 학생은 자기 기록만, 트레이너는 담당 학생 기록을 봅니다.
//! 트레이너가 `student_id`를 주면 그 학생으로 좁히고, 담당이 아니면 404입니다.

use crate::{
    db::{self, ProgressScope},
    error::AppError,
    middleware::auth::{AuthUser, StudentUser},
    models::{EvolutionPoint, EvolutionQuery, LogProgressRequest, ProgressEntry, ProgressQuery, Role},
    routes::AppState,
    services::progress::evolution_points,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// 요청자 역할과 `student_id` 파라미터로 조회 범위를 정합니다.
///
/// 라이프타임 `'a`: 반환되는 범위가 `user`나 `student_id`의 문자열을 빌려 씁니다.
/// 학생이 `student_id`를 보내도 무시하고 항상 본인 범위입니다.
async fn resolve_scope<'a>(
    state: &AppState,
    user: &'a AuthUser,
    student_id: Option<&'a str>,
) -> Result<ProgressScope<'a>, AppError> {
    match (user.role, student_id) {
        (Role::Student, _) => Ok(ProgressScope::Student(&user.user_id)),
        (Role::Personal, None) => Ok(ProgressScope::Personal(&user.user_id)),
        (Role::Personal, Some(student_id)) => {
            if db::student_belongs_to(&state.pool, student_id, &user.user_id).await? {
                Ok(ProgressScope::Student(student_id))
            } else {
                Err(AppError::NotFound)
            }
        }
    }
}

/// `POST /progress` — 학생이 운동 기록을 남깁니다.
///
/// # 반환값
/// 201 Created + 저장된 기록 (`logged_at` 포함)
pub async fn log_progress(
    State(state): State<AppState>,
    student: StudentUser,
    Json(req): Json<LogProgressRequest>,
) -> Result<(StatusCode, Json<ProgressEntry>), AppError> {
    if req.exercise_name.trim().is_empty() {
        return Err(AppError::BadRequest("exercise_name is required".to_string()));
    }

    let entry = db::log_progress(
        &state.pool,
        &student.user_id,
        &req.workout_id,
        req.exercise_name.trim(),
        &req.sets_completed,
        req.notes.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /progress` — 최신순 기록 목록 `{ "progress": [...] }`
pub async fn list_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ProgressQuery>,
) -> Result<Json<Value>, AppError> {
    let scope = resolve_scope(&state, &user, params.student_id.as_deref()).await?;
    let entries = db::list_progress(&state.pool, scope, params.exercise_name.as_deref(), false).await?;

    Ok(Json(json!({ "progress": entries })))
}

/// `GET /progress/evolution` — 한 운동의 변화 추이
///
/// 기록마다 날짜, 최대 무게, 총 횟수를 담은 점 하나. 차트에 바로 쓰도록 오래된 순입니다.
/// `exercise_name`은 필수 쿼리 파라미터라 없으면 `Query` 추출 단계에서 400입니다.
pub async fn progress_evolution(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<EvolutionQuery>,
) -> Result<Json<Vec<EvolutionPoint>>, AppError> {
    let scope = resolve_scope(&state, &user, params.student_id.as_deref()).await?;
    // ascending = true: 오래된 기록부터
    let entries = db::list_progress(&state.pool, scope, Some(params.exercise_name.as_str()), true).await?;

    Ok(Json(evolution_points(&entries)))
}

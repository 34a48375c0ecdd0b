//! # 운동 계획 핸들러
//!
//! ## 엔드포인트
//! - `POST   /workouts/upload?student_id=&routine_id=` → 시트 가져오기 (트레이너)
//! - `POST   /workouts`                    → JSON으로 직접 생성 (트레이너)
//! - `GET    /workouts?student_id=&routine_id=` → 현재 계획 목록
//! - `GET    /workouts/history?student_id=&routine_id=` → 한 슬롯의 모든 버전 (트레이너)
//! - `GET    /workouts/{id}`
//! - `PUT    /workouts/{id}/exercise-image` → 운동 항목 이미지 교체 (트레이너)
//! - `DELETE /workouts/{id}` (트레이너)
//!
//! 트레이너는 자신이 만든 계획을, 학생은 자신에게 배정된 계획만 봅니다.
//!
//! ## 역할 추출기
//! - `AuthUser`: 로그인한 누구나 (역할에 따라 조회 범위가 달라짐)
//! - `TrainerUser`: 트레이너만. 학생 토큰이면 핸들러가 실행되기 전에 403

use crate::{
    db::{self, WorkoutScope},
    error::AppError,
    middleware::auth::{AuthUser, TrainerUser},
    models::{
        CreateWorkoutRequest, ExerciseImageUpdate, ImportSummary, NewWorkout, Role,
        UploadWorkoutParams, Workout, WorkoutListParams,
    },
    routes::{uploads::read_file_field, AppState},
    services::importer::{import_workout, WorkoutUpload},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// 빈 문자열 쿼리 값(`?routine_id=`)은 지정하지 않은 것으로 봅니다.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 토큰의 역할로 조회 범위를 정합니다.
fn scope_of(user: &AuthUser) -> WorkoutScope<'_> {
    match user.role {
        Role::Personal => WorkoutScope::Personal(&user.user_id),
        Role::Student => WorkoutScope::Student(&user.user_id),
    }
}

/// `POST /workouts/upload` — 운동 시트를 가져와 새 버전으로 저장합니다.
///
/// # Extractor
/// - `Query(params)`: `?student_id=&routine_id=` (둘 다 선택)
/// - `Multipart`: 본문의 `file` 필드. 추출기 중 본문을 읽는 것은 마지막에 와야 합니다.
///
/// # 반환값
/// 저장된 버전과 운동일/운동 수를 담은 `ImportSummary`
pub async fn upload_workout(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Query(params): Query<UploadWorkoutParams>,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, AppError> {
    let (filename, data) = read_file_field(&mut multipart).await?;
    tracing::debug!(%filename, size = data.len(), "Received workout sheet");

    // Arc<dyn ExerciseMedia> → &dyn ExerciseMedia
    let summary = import_workout(
        &state.pool,
        state.media.as_ref(),
        WorkoutUpload {
            bytes: &data,
            filename: &filename,
            student_id: non_blank(&params.student_id),
            routine_id: non_blank(&params.routine_id),
            personal_id: &trainer.user_id,
        },
    )
    .await?;

    Ok(Json(summary))
}

/// `POST /workouts` — 시트 없이 JSON 운동일 목록으로 계획을 만듭니다.
///
/// 시트 가져오기와 같은 버전 관리 삽입을 거치므로 슬롯의 이전 계획은 보관됩니다.
pub async fn create_workout(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Json(req): Json<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<Workout>), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Workout name is required".to_string()));
    }
    // 다른 트레이너의 학생이면 존재하지 않는 것처럼 404
    if !db::student_belongs_to(&state.pool, &req.student_id, &trainer.user_id).await? {
        return Err(AppError::NotFound);
    }

    let workout = db::insert_versioned(
        &state.pool,
        &NewWorkout {
            name,
            student_id: Some(&req.student_id),
            personal_id: &trainer.user_id,
            routine_id: non_blank(&req.routine_id),
            days: &req.days,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(workout)))
}

/// `GET /workouts` — 보관되지 않은 계획 목록
///
/// # 반환값
/// `{ "workouts": [...] }`
pub async fn list_workouts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<WorkoutListParams>,
) -> Result<Json<Value>, AppError> {
    // 학생은 자기 계획만 보므로 student_id 필터는 트레이너에게만 의미가 있습니다.
    let student_filter = match user.role {
        Role::Personal => non_blank(&params.student_id),
        Role::Student => None,
    };

    let workouts = db::list_current_workouts(
        &state.pool,
        &scope_of(&user),
        student_filter,
        non_blank(&params.routine_id),
    )
    .await?;

    Ok(Json(json!({ "workouts": workouts })))
}

/// `GET /workouts/history` — 한 슬롯의 모든 버전. `student_id`가 필수입니다.
pub async fn workout_history(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Query(params): Query<WorkoutListParams>,
) -> Result<Json<Value>, AppError> {
    let student_id = non_blank(&params.student_id)
        .ok_or_else(|| AppError::BadRequest("student_id is required".to_string()))?;
    if !db::student_belongs_to(&state.pool, student_id, &trainer.user_id).await? {
        return Err(AppError::NotFound);
    }

    let workouts = db::list_workout_history(
        &state.pool,
        &trainer.user_id,
        student_id,
        non_blank(&params.routine_id),
    )
    .await?;

    Ok(Json(json!({ "workouts": workouts })))
}

/// `GET /workouts/{id}` — 범위 밖의 문서는 404
pub async fn get_workout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Workout>, AppError> {
    let workout = db::get_workout(&state.pool, &scope_of(&user), &id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(workout))
}

/// `PUT /workouts/{id}/exercise-image` — 운동 항목 하나의 이미지 URL을 바꿉니다.
///
/// 보통 `POST /uploads/exercise-image`로 받은 URL을 그대로 넘깁니다.
pub async fn update_exercise_image(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
    Json(req): Json<ExerciseImageUpdate>,
) -> Result<Json<Workout>, AppError> {
    let workout = db::update_exercise_image(
        &state.pool,
        &trainer.user_id,
        &id,
        req.day_index,
        req.exercise_index,
        &req.image_url,
    )
    .await?;

    Ok(Json(workout))
}

/// `DELETE /workouts/{id}` — 성공하면 204 No Content (본문 없음)
pub async fn delete_workout(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !db::delete_workout(&state.pool, &trainer.user_id, &id).await? {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

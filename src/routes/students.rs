//! # 학생 관리 핸들러 (트레이너 전용)
//!
//! - `GET    /students`
//! - `POST   /students`       → 학생 계정 생성 + 환영 알림
//! - `GET    /students/{id}`
//! - `PUT    /students/{id}`  → name/phone/notes 부분 수정
//! - `DELETE /students/{id}`  → 학생의 운동 계획, 기록, 알림도 함께 삭제
//!
//! 다른 트레이너의 학생은 404로 응답합니다.

use crate::{
    db::{self, users as db_users},
    error::AppError,
    middleware::auth::{hash_password, TrainerUser},
    models::{kind, CreateStudentRequest, UpdateStudentRequest, UserResponse},
    routes::{auth::validate_account, AppState},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /students` — 이름순 학생 목록
///
/// # 반환값
/// `{ "students": [...] }`. 비밀번호 해시가 빠진 `UserResponse`로 변환해서 내보냅니다.
pub async fn list_students(
    State(state): State<AppState>,
    trainer: TrainerUser,
) -> Result<Json<Value>, AppError> {
    let students: Vec<UserResponse> = db::list_students(&state.pool, &trainer.user_id)
        .await?
        .into_iter()
        // User → UserResponse (From 구현 사용)
        .map(Into::into)
        .collect();

    Ok(Json(json!({ "students": students })))
}

/// `POST /students` — 학생 계정을 만들고 환영 알림을 보냅니다.
///
/// # 반환값
/// - 201 Created + 생성된 학생
/// - 이메일 중복이면 409
pub async fn create_student(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Json(req): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    validate_account(&req.email, &req.name, &req.password)?;

    // 환영 메시지에 트레이너 이름이 들어가므로 트레이너 행을 조회
    let personal = db_users::find_by_id(&state.pool, &trainer.user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    let password_hash = hash_password(&req.password)?;
    let student = db::create_student(
        &state.pool,
        &personal.id,
        req.email.trim(),
        req.name.trim(),
        &password_hash,
        req.phone.as_deref(),
        req.notes.as_deref(),
    )
    .await?;

    // 알림 실패는 경고만 남기고 학생 생성은 성공으로 처리
    let message = format!("Você foi cadastrado por {}. Aguarde seu treino!", personal.name);
    if let Err(e) =
        db::create_notification(&state.pool, &student.id, "Bem-vindo!", &message, kind::INFO).await
    {
        tracing::warn!(student_id = %student.id, "Failed to send welcome notification: {}", e);
    }

    tracing::info!(student_id = %student.id, personal_id = %personal.id, "Created student");
    Ok((StatusCode::CREATED, Json(student.into())))
}

/// `GET /students/{id}`
pub async fn get_student(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let student = db::get_student(&state.pool, &trainer.user_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(student.into()))
}

/// `PUT /students/{id}` — 보낸 필드만 수정합니다.
///
/// `name`을 보냈다면 비어 있으면 안 됩니다. 보내지 않으면 기존 이름 유지.
pub async fn update_student(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if req.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    let student = db::update_student(&state.pool, &trainer.user_id, &id, &req)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(student.into()))
}

/// `DELETE /students/{id}` — 204 No Content
pub async fn delete_student(
    State(state): State<AppState>,
    trainer: TrainerUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !db::delete_student(&state.pool, &trainer.user_id, &id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!(student_id = %id, "Deleted student");
    Ok(StatusCode::NO_CONTENT)
}

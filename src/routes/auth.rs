//! # 인증 핸들러
//!
//! - `POST /auth/register`: 트레이너 계정 생성
//! - `POST /auth/login`: 이메일 + 비밀번호
//! - `POST /auth/refresh`: refresh 토큰 교체 (이전 토큰은 폐기)
//! - `POST /auth/logout`: 해당 사용자의 refresh 토큰 모두 폐기
//! - `GET  /auth/me`

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::auth::{
        create_access_token, create_refresh_token, hash_password, hash_token, verify_password,
        verify_token, AuthUser, TokenKind, REFRESH_TOKEN_DAYS,
    },
    models::{AuthResponse, LoginRequest, NewUser, RefreshRequest, RegisterRequest, Role, User, UserResponse},
    routes::AppState,
};
use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

const MIN_PASSWORD_LEN: usize = 8;

/// 이메일/이름/비밀번호 기본 검증 (학생 등록에서도 사용)
pub(crate) fn validate_account(email: &str, name: &str, password: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    let email = email.trim();
    if email.len() < 3 || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    Ok(())
}

/// access/refresh 토큰을 발급하고 refresh 토큰 해시를 저장합니다.
async fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let access_token = create_access_token(&user.id, user.role, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    let refresh_token = create_refresh_token(&user.id, user.role, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    let expires_at = (Utc::now() + Duration::days(REFRESH_TOKEN_DAYS))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();
    db_users::store_refresh_token(&state.pool, &user.id, &hash_token(&refresh_token), &expires_at)
        .await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
        token_type: "bearer",
    })
}

/// `POST /auth/register` — 트레이너 계정을 만들고 바로 토큰을 발급합니다.
///
/// 학생 계정은 여기서 만들 수 없습니다 (`POST /students`).
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_account(&req.email, &req.name, &req.password)?;

    let password_hash = hash_password(&req.password)?;
    let user = db_users::create_user(
        &state.pool,
        &NewUser {
            email: req.email.trim(),
            name: req.name.trim(),
            password_hash: &password_hash,
            role: Role::Personal,
            personal_id: None,
            phone: None,
            notes: None,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Registered personal trainer");
    Ok(Json(issue_tokens(&state, user).await?))
}

/// `POST /auth/login`
///
/// 이메일이 없을 때와 비밀번호가 틀릴 때 같은 메시지를 돌려줘
/// 가입 여부가 드러나지 않게 합니다.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = db_users::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    Ok(Json(issue_tokens(&state, user).await?))
}

/// `POST /auth/refresh` — refresh 토큰으로 새 토큰 쌍을 받습니다.
///
/// 처리 순서: 서명/종류 검증 → 저장된 해시 조회 → 만료 확인 → 이전 토큰 폐기 → 새로 발급
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    verify_token(&req.refresh_token, &state.jwt_secret, TokenKind::Refresh)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let token_hash = hash_token(&req.refresh_token);
    let (_token_id, user_id, expires_at) = db_users::find_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = chrono::NaiveDateTime::parse_from_str(&expires_at, "%Y-%m-%dT%H:%M:%S%.3fZ")
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        db_users::delete_refresh_token(&state.pool, &token_hash).await?;
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, &user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    // 한 번 쓴 refresh 토큰은 폐기. 동시에 들어온 같은 토큰은 먼저 지운 요청만 통과
    if !db_users::delete_refresh_token(&state.pool, &token_hash).await? {
        return Err(AppError::Unauthorized(
            "Refresh token not found or revoked".to_string(),
        ));
    }

    Ok(Json(issue_tokens(&state, user).await?))
}

/// `POST /auth/logout` — 모든 기기의 refresh 토큰을 폐기합니다.
///
/// access 토큰은 서버에 저장하지 않으므로 만료(15분)될 때까지는 유효합니다.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, &auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// `GET /auth/me` — 토큰 주인의 계정 정보
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}

//! # 인증 미들웨어
//!
//! JWT 발급/검증, 비밀번호 해싱, 그리고 핸들러에서 쓰는 추출기(extractor)입니다.
//!
//! - `AuthUser`: 로그인한 사용자 (역할 무관)
//! - `TrainerUser`: 트레이너(`personal`)만 허용, 아니면 403
//! - `StudentUser`: 학생만 허용, 아니면 403

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::{error::AppError, models::Role, routes::AppState};

/// access 토큰 유효 시간 (분)
pub const ACCESS_TOKEN_MINUTES: i64 = 15;
/// refresh 토큰 유효 시간 (일)
pub const REFRESH_TOKEN_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub role: Role,
    pub kind: TokenKind,
    /// 같은 초에 발급된 refresh 토큰끼리도 해시가 겹치지 않도록 하는 고유값
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_token(token, &state.jwt_secret, TokenKind::Access)?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// 트레이너 전용 핸들러용 추출기
#[derive(Debug, Clone)]
pub struct TrainerUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for TrainerUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match user.role {
            Role::Personal => Ok(TrainerUser {
                user_id: user.user_id,
            }),
            Role::Student => Err(AuthError::Forbidden("Only personal trainers can do this")),
        }
    }
}

/// 학생 전용 핸들러용 추출기
#[derive(Debug, Clone)]
pub struct StudentUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for StudentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match user.role {
            Role::Student => Ok(StudentUser {
                user_id: user.user_id,
            }),
            Role::Personal => Err(AuthError::Forbidden("Only students can do this")),
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    Forbidden(&'static str),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization token is required",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authorization token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "expired_token",
                "Authorization token has expired",
            ),
            AuthError::Forbidden(message) => (StatusCode::FORBIDDEN, "forbidden", message),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn create_token(
    user_id: &str,
    role: Role,
    kind: TokenKind,
    lifetime: Duration,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        kind,
        jti: uuid::Uuid::now_v7().to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn create_access_token(
    user_id: &str,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(
        user_id,
        role,
        TokenKind::Access,
        Duration::minutes(ACCESS_TOKEN_MINUTES),
        secret,
    )
}

pub fn create_refresh_token(
    user_id: &str,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(
        user_id,
        role,
        TokenKind::Refresh,
        Duration::days(REFRESH_TOKEN_DAYS),
        secret,
    )
}

/// 서명과 만료를 검증하고, 토큰 종류가 `expected`와 같은지 확인합니다.
pub fn verify_token(token: &str, secret: &str, expected: TokenKind) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.kind != expected {
        return Err(AuthError::InvalidToken);
    }

    Ok(token_data.claims)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Argon2id 해시 (PHC 문자열)
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// 비밀번호가 맞으면 true. 저장된 해시 형식이 잘못되었으면 에러입니다.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn access_token_round_trip_keeps_role() {
        let token = create_access_token("user-1", Role::Student, SECRET).unwrap();
        let claims = verify_token(&token, SECRET, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Student);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let token = create_refresh_token("user-1", Role::Personal, SECRET).unwrap();
        assert!(matches!(
            verify_token(&token, SECRET, TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
        assert!(verify_token(&token, SECRET, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn tokens_issued_together_hash_differently() {
        let a = create_refresh_token("user-1", Role::Personal, SECRET).unwrap();
        let b = create_refresh_token("user-1", Role::Personal, SECRET).unwrap();
        assert_ne!(hash_token(&a), hash_token(&b));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_access_token("user-1", Role::Personal, SECRET).unwrap();
        assert!(matches!(
            verify_token(&token, "other", TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }
}

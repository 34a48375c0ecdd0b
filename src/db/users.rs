//! # 사용자 / 인증 토큰 데이터베이스 쿼리 모듈
//!
//! `users` 테이블에는 트레이너와 학생이 함께 들어 있고 `role` 컬럼으로 구분합니다.
//! `refresh_tokens`에는 토큰 원문이 아니라 SHA-256 해시만 저장합니다.

use crate::error::AppError;
use crate::models::{NewUser, User};
use sqlx::SqlitePool;

// SELECT 절을 여러 쿼리에서 재사용하기 위한 컬럼 목록 (User 구조체 필드와 같은 이름)
const USER_COLUMNS: &str = "id, email, name, password_hash, role, personal_id, phone, notes, created_at, updated_at";

/// 사용자를 만들고 저장된 행을 돌려줍니다.
///
/// 이메일이 이미 있으면 `Conflict`입니다.
pub async fn create_user(pool: &SqlitePool, new: &NewUser<'_>) -> Result<User, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, role, personal_id, phone, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new.email)
    .bind(new.name)
    .bind(new.password_hash)
    .bind(new.role.as_str())
    .bind(new.personal_id)
    .bind(new.phone)
    .bind(new.notes)
    .execute(pool)
    // 여기서는 ?를 쓰지 않고 Result를 그대로 받아, unique 위반만 따로 409로 바꿉니다.
    .await;

    // email 컬럼의 UNIQUE 제약 위반 = 이미 가입된 이메일
    if let Err(sqlx::Error::Database(db_err)) = &result {
        if db_err.is_unique_violation() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
    }
    result?;

    find_by_id(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

/// ID로 사용자를 조회합니다. 없으면 `Ok(None)`.
pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// 이메일은 대소문자를 구분하지 않고 비교합니다.
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
    ))
    .bind(email.trim())
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// refresh 토큰 해시를 만료 시각과 함께 저장합니다.
///
/// # 매개변수
/// - `token_hash`: `hash_token()`으로 만든 SHA-256 hex 문자열
/// - `expires_at`: ISO 8601 문자열 (`...Z`)
pub async fn store_refresh_token(
    pool: &SqlitePool,
    user_id: &str,
    token_hash: &str,
    expires_at: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(uuid::Uuid::now_v7().to_string())
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// 해시로 refresh 토큰을 찾습니다.
///
/// # 반환값
/// - `Ok(Some((token id, user id, expires_at)))`: 저장된 토큰
/// - `Ok(None)`: 폐기되었거나 발급된 적 없는 토큰
pub async fn find_refresh_token(
    pool: &SqlitePool,
    token_hash: &str,
) -> Result<Option<(String, String, String)>, AppError> {
    let row = sqlx::query_as::<_, (String, String, String)>(
        r#"
        SELECT id, user_id, expires_at
        FROM refresh_tokens
        WHERE token_hash = ?
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// refresh 토큰 하나를 폐기합니다.
///
/// 실제로 지운 행이 있을 때만 true. 같은 토큰으로 동시에 갱신하면
/// 한 요청만 true를 받으므로, 토큰 회전(rotation)은 이 값으로 판단합니다.
pub async fn delete_refresh_token(pool: &SqlitePool, token_hash: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 사용자의 refresh 토큰을 모두 폐기합니다 (로그아웃).
pub async fn delete_user_refresh_tokens(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

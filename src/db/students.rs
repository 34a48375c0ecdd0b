//! # 학생 데이터베이스 쿼리 모듈
//!
//! 학생은 `role = 'student'`이고 `personal_id`가 담당 트레이너인 `users` 행입니다.
//! 별도 테이블 없이 `users`를 그대로 쓰며, 이 모듈의 모든 조회는
//! 트레이너 범위로 제한됩니다. 다른 트레이너의 학생은 없는 것처럼 보입니다.

use crate::error::AppError;
use crate::models::{NewUser, Role, UpdateStudentRequest, User};
use sqlx::SqlitePool;

// 학생 계정 생성은 일반 사용자 생성(이메일 중복 검사 포함)을 그대로 재사용합니다.
use super::users;

/// 트레이너의 학생 목록을 이름순으로 조회합니다.
///
/// # 매개변수
/// - `pool`: DB 연결 풀
/// - `personal_id`: 로그인한 트레이너의 ID
///
/// # 반환값
/// - `Ok(Vec<User>)`: 학생 목록 (없으면 빈 Vec)
pub async fn list_students(pool: &SqlitePool, personal_id: &str) -> Result<Vec<User>, AppError> {
    let students = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, password_hash, role, personal_id, phone, notes, created_at, updated_at
        FROM users
        WHERE role = 'student' AND personal_id = ?
        ORDER BY name COLLATE NOCASE
        "#,
        // ↑ COLLATE NOCASE: "ana"와 "Ana"를 같은 순서로 정렬
    )
    .bind(personal_id)
    .fetch_all(pool)
    .await?;

    Ok(students)
}

/// 트레이너 소속 학생 한 명을 조회합니다.
///
/// # 반환값
/// - `Ok(Some(User))`: 해당 트레이너의 학생인 경우
/// - `Ok(None)`: 없거나 다른 트레이너의 학생인 경우 (핸들러에서 404)
pub async fn get_student(
    pool: &SqlitePool,
    personal_id: &str,
    student_id: &str,
) -> Result<Option<User>, AppError> {
    let student = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, password_hash, role, personal_id, phone, notes, created_at, updated_at
        FROM users
        WHERE id = ? AND role = 'student' AND personal_id = ?
        "#,
    )
    // ? 자리표시자 순서대로 바인딩: id, personal_id
    .bind(student_id)
    .bind(personal_id)
    // 0행이면 None
    .fetch_optional(pool)
    .await?;

    Ok(student)
}

/// 학생이 해당 트레이너 소속인지 확인합니다.
///
/// 시트 가져오기와 수동 생성에서 운동 계획을 저장하기 전에 호출합니다.
pub async fn student_belongs_to(
    pool: &SqlitePool,
    student_id: &str,
    personal_id: &str,
) -> Result<bool, AppError> {
    // query_scalar: 첫 번째 컬럼 하나만 꺼냅니다. 여기서는 행 존재 여부만 필요합니다.
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM users WHERE id = ? AND role = 'student' AND personal_id = ?",
    )
    .bind(student_id)
    .bind(personal_id)
    .fetch_optional(pool)
    .await?;

    Ok(found.is_some())
}

/// 트레이너 소속 학생 계정을 만듭니다.
///
/// # 매개변수
/// - `password_hash`: 핸들러에서 Argon2로 해싱한 값 (평문을 받지 않습니다)
/// - `phone`, `notes`: 선택 항목. `Option<&str>`이라 빌린 값 그대로 전달합니다.
///
/// # 에러
/// - 이메일이 이미 있으면 `AppError::Conflict`
pub async fn create_student(
    pool: &SqlitePool,
    personal_id: &str,
    email: &str,
    name: &str,
    password_hash: &str,
    phone: Option<&str>,
    notes: Option<&str>,
) -> Result<User, AppError> {
    users::create_user(
        pool,
        &NewUser {
            email,
            name,
            password_hash,
            role: Role::Student,
            personal_id: Some(personal_id),
            phone,
            notes,
        },
    )
    .await
}

/// 학생 정보를 부분 업데이트합니다. None인 필드는 기존 값을 유지합니다.
///
/// # 반환값
/// - `Ok(Some(User))`: 수정 후 다시 조회한 학생
/// - `Ok(None)`: 해당 트레이너의 학생이 아닌 경우
pub async fn update_student(
    pool: &SqlitePool,
    personal_id: &str,
    student_id: &str,
    req: &UpdateStudentRequest,
) -> Result<Option<User>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE users SET
            name = COALESCE(?, name),
            phone = COALESCE(?, phone),
            notes = COALESCE(?, notes),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND role = 'student' AND personal_id = ?
        "#,
        // ↑ COALESCE(?, name): 바인딩 값이 NULL(None)이면 기존 name 유지
    )
    // Option<String> → Option<&str>: as_deref()로 소유권 없이 빌려서 바인딩
    .bind(req.name.as_deref())
    .bind(req.phone.as_deref())
    .bind(req.notes.as_deref())
    .bind(student_id)
    .bind(personal_id)
    .execute(pool)
    .await?;

    // 영향받은 행이 없음 = 범위 밖이거나 없는 학생
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_student(pool, personal_id, student_id).await
}

/// 학생과 그 학생의 운동 계획, 기록, 알림을 함께 삭제합니다 (FK CASCADE).
///
/// 삭제된 행이 없으면 false.
pub async fn delete_student(
    pool: &SqlitePool,
    personal_id: &str,
    student_id: &str,
) -> Result<bool, AppError> {
    let result =
        sqlx::query("DELETE FROM users WHERE id = ? AND role = 'student' AND personal_id = ?")
            .bind(student_id)
            .bind(personal_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

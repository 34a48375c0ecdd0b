//! 테스트용 DB 준비와 시드 데이터

use std::path::Path;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::models::{Exercise, NewUser, NewWorkout, Role, Workout, WorkoutDay};

/// 마이그레이션이 적용된 인메모리 SQLite 풀
///
/// 연결마다 별도의 인메모리 DB가 생기므로 연결은 하나로 고정하고
/// 유휴 연결이 정리되지 않도록 합니다.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// 마이그레이션이 적용된 파일 기반 SQLite 풀
///
/// 여러 연결이 같은 DB를 실제로 공유해야 하는 동시성 테스트용입니다.
pub async fn setup_file_test_db(path: &Path) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("Failed to create file database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub async fn seed_personal(pool: &SqlitePool, email: &str) -> String {
    super::users::create_user(
        pool,
        &NewUser {
            email,
            name: "Coach",
            password_hash: "not-a-real-hash",
            role: Role::Personal,
            personal_id: None,
            phone: None,
            notes: None,
        },
    )
    .await
    .expect("seed personal")
    .id
}

pub async fn seed_student(pool: &SqlitePool, personal_id: &str, email: &str) -> String {
    super::create_student(pool, personal_id, email, "Aluno", "not-a-real-hash", None, None)
        .await
        .expect("seed student")
        .id
}

pub fn sample_days() -> Vec<WorkoutDay> {
    vec![WorkoutDay {
        day_name: "A".to_string(),
        exercises: vec![
            Exercise {
                name: "Supino reto".to_string(),
                muscle_group: "Peito".to_string(),
                sets: 4,
                reps: "8-12".to_string(),
                weight: Some("40kg".to_string()),
                notes: None,
                image_url: None,
                video_url: None,
                description: None,
                rest_time: 90,
            },
            Exercise {
                name: "Crucifixo".to_string(),
                muscle_group: "Peito".to_string(),
                sets: 3,
                reps: "12".to_string(),
                weight: None,
                notes: None,
                image_url: None,
                video_url: None,
                description: None,
                rest_time: 60,
            },
        ],
    }]
}

pub async fn seed_workout(
    pool: &SqlitePool,
    personal_id: &str,
    student_id: Option<&str>,
    routine_id: Option<&str>,
) -> Workout {
    let days = sample_days();
    super::insert_versioned(
        pool,
        &NewWorkout {
            name: "Treino A",
            student_id,
            personal_id,
            routine_id,
            days: &days,
        },
    )
    .await
    .expect("seed workout")
}

/// 기록 하나를 `logged_at`을 지정해 넣습니다.
pub async fn seed_progress_at(
    pool: &SqlitePool,
    student_id: &str,
    exercise_name: &str,
    sets_json: &str,
    logged_at: &str,
) {
    sqlx::query(
        r#"
        INSERT INTO progress (id, student_id, workout_id, exercise_name, sets_completed, logged_at)
        VALUES (?, ?, 'w', ?, ?, ?)
        "#,
    )
    .bind(uuid::Uuid::now_v7().to_string())
    .bind(student_id)
    .bind(exercise_name)
    .bind(sets_json)
    .bind(logged_at)
    .execute(pool)
    .await
    .expect("seed progress");
}

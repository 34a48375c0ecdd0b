//! # trainerdesk 웹 서버 진입점
//!
//! 퍼스널 트레이너가 학생을 등록하고, 운동 시트(CSV/XLS/XLSX)를 올려
//! 운동 계획을 배정하는 REST API 서버입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 업로드 디렉토리 생성, 운동 미디어 라이브러리 로딩
//! 5. API 라우터 설정
//! 6. HTTP 서버 시작

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use std::{path::Path, sync::Arc};

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use config::Config;
use routes::{auth, health, notifications, progress, stats, students, uploads, workouts, AppState};
use services::media::StaticMediaLibrary;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 넘어갑니다.
    dotenvy::dotenv().ok();

    // RUST_LOG가 없으면 trainerdesk, tower_http, axum 을 debug 레벨로
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trainerdesk=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting trainerdesk server on {}:{}", config.host, config.port);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let uploads_path = Path::new(&config.uploads_path);
    if !uploads_path.exists() {
        tokio::fs::create_dir_all(uploads_path).await?;
        tracing::info!("Created uploads directory: {}", config.uploads_path);
    }

    let media = StaticMediaLibrary::load(config.exercise_media_path.as_deref()).await?;

    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        uploads_path: config.uploads_path.clone(),
        media: Arc::new(media),
    };

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let api_routes = Router::new()
        .merge(auth_routes)
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // 학생 관리 (트레이너)
        .route("/students", get(students::list_students).post(students::create_student))
        .route(
            "/students/{id}",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        // 운동 계획. 고정 경로(upload, history)가 {id}보다 우선합니다.
        .route("/workouts", get(workouts::list_workouts).post(workouts::create_workout))
        .route("/workouts/upload", post(workouts::upload_workout))
        .route("/workouts/history", get(workouts::workout_history))
        .route(
            "/workouts/{id}",
            get(workouts::get_workout).delete(workouts::delete_workout),
        )
        .route("/workouts/{id}/exercise-image", put(workouts::update_exercise_image))
        .route("/uploads/exercise-image", post(uploads::upload_exercise_image))
        // 운동 기록
        .route("/progress", get(progress::list_progress).post(progress::log_progress))
        .route("/progress/evolution", get(progress::progress_evolution))
        // 알림
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", put(notifications::mark_all_notifications_read))
        .route("/notifications/{id}/read", put(notifications::mark_notification_read))
        // 통계
        .route("/stats/personal", get(stats::personal_stats))
        .route("/stats/student", get(stats::student_stats))
        // 시트/이미지 업로드는 기본 2MB 제한보다 클 수 있음
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state);

    // 개발 편의상 모든 출처 허용
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(&config.uploads_path))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

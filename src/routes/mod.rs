//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 회원가입, 로그인, 토큰 갱신, 로그아웃, 내 정보
//! - `students`: 트레이너의 학생 관리
//! - `workouts`: 운동 계획 조회/생성, 시트 업로드, 이미지 교체
//! - `uploads`: 운동 이미지 파일 업로드
//! - `progress`: 운동 기록과 변화 추이
//! - `notifications`: 알림 조회/읽음 처리
//! - `stats`: 대시보드 통계
//! - `health`: 서버 상태 확인

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::media::ExerciseMedia;

pub mod auth;
pub mod health;
pub mod notifications;
pub mod progress;
pub mod stats;
pub mod students;
pub mod uploads;
pub mod workouts;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 필드는 모두 clone이 저렴합니다 (풀과 미디어 라이브러리는 내부적으로 Arc).
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 운동 이미지 저장 디렉토리
    pub uploads_path: String,
    /// 운동 이름 → 이미지/영상 URL
    pub media: Arc<dyn ExerciseMedia>,
}

//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수(`.env` 포함)에서 서버 설정값을 읽어옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: JWT 토큰 서명 비밀키 (필수)
//! - `UPLOADS_PATH`: 운동 이미지 업로드 디렉토리
//! - `HOST` / `PORT`: 서버 바인딩 주소
//! - `MAX_UPLOAD_BYTES`: 업로드 요청 본문 최대 크기
//! - `EXERCISE_MEDIA_PATH`: 운동 이미지/영상 라이브러리 확장 JSON 파일 (선택)

use std::env;

/// 기본 업로드 한도: 10 MiB
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// 애플리케이션 전체 설정
///
/// 서버 시작 시 한 번 읽은 뒤 `AppState`로 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 연결 문자열 (예: "sqlite:data/trainerdesk.db?mode=rwc")
    pub database_url: String,
    pub jwt_secret: String,
    /// 업로드된 이미지가 저장되는 디렉토리
    pub uploads_path: String,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// 기본 운동 미디어 테이블에 덧붙일 JSON 파일 경로
    pub exercise_media_path: Option<String>,
}

impl Config {
    /// 환경변수에서 설정을 읽습니다.
    ///
    /// `DATABASE_URL`과 `JWT_SECRET`이 없으면 에러를 반환합니다.
    /// 나머지는 기본값이 있습니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            uploads_path: env::var("UPLOADS_PATH").unwrap_or_else(|_| "data/uploads".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8001),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            // 빈 문자열은 "설정 안 함"으로 취급
            exercise_media_path: env::var("EXERCISE_MEDIA_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
        })
    }
}

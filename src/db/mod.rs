//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 서비스(services/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `users`: 계정 조회/생성, refresh 토큰 저장
//! - `students`: 트레이너가 관리하는 학생 CRUD
//! - `workouts`: 운동 계획 문서, 버전 관리 삽입
//! - `progress`: 학생 운동 기록
//! - `notifications`: 알림
//! - `stats`: 대시보드 집계 쿼리

pub mod notifications;
pub mod progress;
pub mod stats;
pub mod students;
pub mod users;
pub mod workouts;

#[cfg(test)]
pub mod test_support;

// 하위 모듈의 공개 함수를 재공개하여 `crate::db::insert_versioned`처럼 바로 접근합니다.
// users 는 함수 이름이 일반적이라 `db::users::find_by_email`처럼 경로로 씁니다.
pub use notifications::*;
pub use progress::*;
pub use stats::*;
pub use students::*;
pub use workouts::*;

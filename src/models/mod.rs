//! # 데이터 모델 모듈
//!
//! 요청/응답 본문과 DB 행(row)에 대응하는 구조체들을 정의합니다.
//! - `user`: 사용자(트레이너/학생), 인증 요청/응답
//! - `student`: 학생 등록/수정 요청
//! - `workout`: 운동 계획 문서, 운동일, 운동 항목, 가져오기 결과
//! - `progress`: 운동 기록과 변화 추이
//! - `notification`: 알림
//! - `stats`: 대시보드 통계 응답
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Workout`처럼 짧게 접근합니다.

pub mod notification;
pub mod progress;
pub mod stats;
pub mod student;
pub mod user;
pub mod workout;

pub use notification::*;
pub use progress::*;
pub use stats::*;
pub use student::*;
pub use user::*;
pub use workout::*;

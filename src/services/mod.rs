//! # 서비스 계층
//!
//! HTTP나 DB에 묶이지 않는 도메인 로직입니다.
//! - `spreadsheet`: CSV/XLS/XLSX를 셀 표로 읽기
//! - `cells`: 셀 정리, 세트 수/휴식 시간 해석
//! - `columns`: 헤더 별칭 → 정규 필드
//! - `media`: 운동 이미지/영상 라이브러리
//! - `importer`: 시트 → 운동 계획 가져오기
//! - `progress`: 변화 추이, 연속 운동일
//! - `uploads`: 운동 이미지 파일 저장

pub mod cells;
pub mod columns;
pub mod importer;
pub mod media;
pub mod progress;
pub mod spreadsheet;
pub mod uploads;

//! 요청 전처리: 인증 추출기와 토큰/비밀번호 유틸리티

pub mod auth;

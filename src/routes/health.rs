//! # 헬스체크 핸들러
//!
//! - `GET /api/health` → `{ "status": "ok" }`
//! - `GET /api/` → API 이름과 버전

use axum::Json;
use serde_json::{json, Value};

/// `GET /health` — 로드밸런서/컨테이너 헬스체크용. 실패하지 않습니다.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}

/// `GET /` — API 안내
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Personal Trainer API v1.0",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

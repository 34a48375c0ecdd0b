use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// 완료한 세트 하나. 누락된 값은 0으로 읽습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLog {
    #[serde(default)]
    pub set: i64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub reps: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProgressEntry {
    pub id: String,
    pub student_id: String,
    pub workout_id: String,
    pub exercise_name: String,
    pub sets_completed: Json<Vec<SetLog>>,
    pub notes: Option<String>,
    pub logged_at: String,
}

#[derive(Debug, Deserialize)]
pub struct LogProgressRequest {
    pub workout_id: String,
    pub exercise_name: String,
    pub sets_completed: Vec<SetLog>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    pub exercise_name: Option<String>,
    pub student_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvolutionQuery {
    pub exercise_name: String,
    pub student_id: Option<String>,
}

/// 변화 추이 차트의 점 하나 (기록 하나당)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionPoint {
    /// `YYYY-MM-DD`
    pub date: String,
    /// 가장 무거운 세트의 무게
    pub weight: f64,
    /// 모든 세트의 반복 횟수 합
    pub reps: i64,
    pub exercise: String,
}

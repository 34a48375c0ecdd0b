use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use crate::services::cells::{DEFAULT_REST_SECONDS, DEFAULT_SETS};

fn default_sets() -> i64 {
    DEFAULT_SETS
}

fn default_reps() -> String {
    "10-12".to_string()
}

fn default_rest_time() -> i64 {
    DEFAULT_REST_SECONDS
}

/// 운동일 하나에 속한 운동 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(default)]
    pub muscle_group: String,
    #[serde(default = "default_sets")]
    pub sets: i64,
    #[serde(default = "default_reps")]
    pub reps: String,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// 세트 사이 휴식 시간 (초)
    #[serde(default = "default_rest_time")]
    pub rest_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub day_name: String,
    pub exercises: Vec<Exercise>,
}

/// 운동 계획 문서
///
/// (student_id, personal_id, routine_id) 슬롯마다 보관되지 않은(archived = false)
/// 문서는 최대 하나이며, 새 버전이 들어오면 이전 문서는 보관 처리됩니다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub student_id: Option<String>,
    pub personal_id: String,
    pub routine_id: Option<String>,
    pub days: Json<Vec<WorkoutDay>>,
    pub version: i64,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Workout {
    pub fn exercise_count(&self) -> usize {
        self.days.iter().map(|d| d.exercises.len()).sum()
    }
}

/// 새 운동 계획 삽입에 필요한 값
#[derive(Debug)]
pub struct NewWorkout<'a> {
    pub name: &'a str,
    pub student_id: Option<&'a str>,
    pub personal_id: &'a str,
    pub routine_id: Option<&'a str>,
    pub days: &'a [WorkoutDay],
}

/// `POST /workouts` 수동 생성 요청
#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub name: String,
    pub student_id: String,
    pub routine_id: Option<String>,
    pub days: Vec<WorkoutDay>,
}

/// `POST /workouts/upload` 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct UploadWorkoutParams {
    pub student_id: Option<String>,
    pub routine_id: Option<String>,
}

/// 목록/이력 조회 필터
#[derive(Debug, Default, Deserialize)]
pub struct WorkoutListParams {
    pub student_id: Option<String>,
    pub routine_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseImageUpdate {
    pub day_index: usize,
    pub exercise_index: usize,
    pub image_url: String,
}

/// 시트 가져오기 결과 요약
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub id: String,
    pub name: String,
    pub version: i64,
    pub days_count: usize,
    pub exercises_count: usize,
    pub days: Vec<WorkoutDay>,
}

impl From<Workout> for ImportSummary {
    fn from(workout: Workout) -> Self {
        let exercises_count = workout.exercise_count();
        let Json(days) = workout.days;
        Self {
            id: workout.id,
            name: workout.name,
            version: workout.version,
            days_count: days.len(),
            exercises_count,
            days,
        }
    }
}

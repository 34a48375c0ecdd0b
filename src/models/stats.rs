use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PersonalStats {
    pub students_count: i64,
    pub workouts_count: i64,
    /// 최근 7일 동안 담당 학생들이 남긴 운동 기록 수
    pub recent_progress: i64,
}

#[derive(Debug, Serialize)]
pub struct StudentStats {
    pub total_exercises: usize,
    pub progress_logged: i64,
    pub workout_streak: u32,
    pub has_workout: bool,
}

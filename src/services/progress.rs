//! 운동 기록 집계: 변화 추이 차트 데이터와 연속 운동일 계산

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use crate::models::{EvolutionPoint, ProgressEntry};

/// 연속 운동일을 최대 며칠까지 셀지
pub const STREAK_WINDOW_DAYS: u32 = 30;

/// 기록 하나당 점 하나. 세트가 비어 있는 기록은 건너뜁니다.
///
/// 입력 순서를 그대로 유지하므로 오래된 순으로 조회한 기록을 넘겨야 합니다.
pub fn evolution_points(entries: &[ProgressEntry]) -> Vec<EvolutionPoint> {
    entries
        .iter()
        .filter(|entry| !entry.sets_completed.is_empty())
        .map(|entry| EvolutionPoint {
            date: entry.logged_at.chars().take(10).collect(),
            weight: entry
                .sets_completed
                .iter()
                .map(|s| s.weight)
                .fold(0.0, f64::max),
            reps: entry.sets_completed.iter().map(|s| s.reps).sum(),
            exercise: entry.exercise_name.clone(),
        })
        .collect()
}

/// 오늘부터 거꾸로 기록이 있는 날이 며칠 연속인지 셉니다.
///
/// 오늘 기록이 없어도 어제부터 이어지면 연속으로 봅니다. 최대 30일.
/// `dates`는 `YYYY-MM-DD` 문자열입니다.
pub fn workout_streak<S: AsRef<str>>(dates: &[S], today: NaiveDate) -> u32 {
    let logged: HashSet<&str> = dates.iter().map(AsRef::as_ref).collect();

    let mut streak = 0;
    for offset in 0..STREAK_WINDOW_DAYS {
        let day = (today - Duration::days(i64::from(offset))).format("%Y-%m-%d").to_string();
        if logged.contains(day.as_str()) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
    }
    streak
}

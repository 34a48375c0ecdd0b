//! # 셀 값 정리와 파싱
//!
//! 시트 셀을 표시용 문자열로 정리하고, 세트 수와 휴식 시간을 숫자로 해석합니다.
//! 모든 함수는 순수 함수이며 실패하지 않습니다 (해석할 수 없으면 기본값).

use std::sync::LazyLock;

use regex::Regex;

use super::spreadsheet::CellValue;

/// 휴식 시간 기본값 (초)
pub const DEFAULT_REST_SECONDS: i64 = 90;
/// 세트 수 기본값
pub const DEFAULT_SETS: i64 = 3;

static NUMBER_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").ok());

// "2m", "1.5 m" 처럼 숫자 바로 뒤에 단독으로 붙은 m
static BARE_MINUTE_SUFFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d\s*m\b").ok());

/// 셀 값을 공백이 정리된 문자열로 바꿉니다.
///
/// 빈 셀, NaN, 문자열 "nan"(대소문자 무시)은 모두 빈 문자열입니다.
pub fn clean_cell(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) if n.is_nan() => String::new(),
        other => {
            let text = other.to_string().trim().to_string();
            if text.eq_ignore_ascii_case("nan") {
                String::new()
            } else {
                text
            }
        }
    }
}

/// 자유 형식 휴식 시간("90s", "2 min", "1-2", ...)을 초 단위로 변환합니다.
///
/// 단위 판단 순서:
/// 1. `min` 또는 숫자 뒤 단독 `m`이 있으면 분
/// 2. `s`가 없고 값이 10 이하이면 분 (10초 이하로 쉬는 경우는 없다고 봄)
/// 3. 그 외에는 초
///
/// 숫자가 두 개 이상이면 앞의 두 개의 평균을 씁니다 (범위 표기 "1-2").
pub fn parse_rest_interval(value: &CellValue) -> i64 {
    let cleaned = clean_cell(value);
    if cleaned.is_empty() {
        return DEFAULT_REST_SECONDS;
    }

    let text = cleaned
        .to_lowercase()
        .replace(['\u{2013}', '\u{2014}', '\u{2212}', '\u{2011}'], "-")
        .replace(',', ".");

    let Some(number_token) = NUMBER_TOKEN.as_ref() else {
        return DEFAULT_REST_SECONDS;
    };
    let numbers: Vec<f64> = number_token
        .find_iter(&text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    let base = match numbers.as_slice() {
        [] => return DEFAULT_REST_SECONDS,
        [single] => *single,
        [first, second, ..] => (first + second) / 2.0,
    };

    let has_minute_unit = text.contains("min")
        || BARE_MINUTE_SUFFIX
            .as_ref()
            .is_some_and(|re| re.is_match(&text));
    let is_minutes = has_minute_unit || (!text.contains('s') && base <= 10.0);

    let seconds = if is_minutes {
        (base * 60.0).round() as i64
    } else {
        base.round() as i64
    };

    if seconds <= 0 {
        DEFAULT_REST_SECONDS
    } else {
        seconds
    }
}

/// 세트 수를 양의 정수로 해석합니다. 실패하거나 0 이하이면 3입니다.
pub fn parse_sets(value: &CellValue) -> i64 {
    let cleaned = clean_cell(value).replace(',', ".");
    if cleaned.is_empty() {
        return DEFAULT_SETS;
    }

    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() && n.trunc() > 0.0 => n.trunc() as i64,
        _ => DEFAULT_SETS,
    }
}

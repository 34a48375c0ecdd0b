//! # 운동 시트 가져오기(import)
//!
//! 트레이너가 올린 CSV/XLS/XLSX 시트를 운동 계획 문서로 변환합니다.
//!
//! 처리 순서:
//! 1. 확장자 확인, 학생 소유권 확인
//! 2. 시트 읽기 (`spreadsheet`)
//! 3. 헤더 정리 후 정규 필드 연결 (`columns`)
//! 4. 행마다 운동 항목 생성, 운동일(day)별로 묶기 (`cells`, `media`)
//! 5. 버전을 올려 저장하고 이전 문서는 보관 (`db::workouts::insert_versioned`)
//! 6. 학생에게 알림
//!
//! 어느 단계에서든 에러가 나면 아무것도 저장되지 않습니다.

use sqlx::SqlitePool;
use thiserror::Error;

use super::{
    cells::{clean_cell, parse_rest_interval, parse_sets},
    columns::{CanonicalField, ColumnMap},
    media::{to_embed_url, ExerciseMedia},
    spreadsheet::{read_table, CellValue, SheetFormat, SheetTable},
};
use crate::{
    db,
    error::AppError,
    models::{kind, Exercise, ImportSummary, NewWorkout, WorkoutDay},
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Only .csv, .xls or .xlsx files are accepted")]
    UnsupportedFileType,

    #[error("Student not found")]
    StudentNotFound,

    #[error(
        "Required columns not found: {}. Columns found: {}",
        missing.join(", "),
        found.join(", ")
    )]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("The file has no usable workout rows")]
    EmptyImport,

    /// 시트 디코딩 실패 (인코딩, 손상된 파일 등). 원본 메시지는 로그용입니다.
    #[error("Failed to process file: {0}")]
    ParseFailure(String),
}

/// 업로드 한 건
#[derive(Debug)]
pub struct WorkoutUpload<'a> {
    pub bytes: &'a [u8],
    pub filename: &'a str,
    pub student_id: Option<&'a str>,
    pub routine_id: Option<&'a str>,
    pub personal_id: &'a str,
}

/// 파일명에서 확장자를 뺀 부분을 운동 계획 이름으로 씁니다.
pub fn workout_name_from_filename(filename: &str) -> String {
    let trimmed = filename.trim();
    match trimmed.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => trimmed.to_string(),
    }
}

/// `"Método: X"`, `"Intervalo: X"`를 설명과 합칩니다. 비어 있는 조각은 뺍니다.
fn compose_description(description: &str, method: &str, interval: &str) -> Option<String> {
    let mut parts = Vec::new();
    if !description.is_empty() {
        parts.push(description.to_string());
    }
    if !method.is_empty() {
        parts.push(format!("Método: {}", method));
    }
    if !interval.is_empty() {
        parts.push(format!("Intervalo: {}", interval));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

static MISSING: CellValue = CellValue::Empty;

/// 시트를 운동일 목록으로 변환합니다.
///
/// 운동일 또는 운동 이름이 비어 있는 행은 에러 없이 건너뜁니다 (빈 줄, 템플릿 줄).
/// 운동일은 처음 등장한 순서를 유지합니다.
pub fn build_workout_days(
    table: &SheetTable,
    media: &dyn ExerciseMedia,
) -> Result<Vec<WorkoutDay>, ImportError> {
    let headers: Vec<String> = table.headers.iter().map(clean_cell).collect();
    let columns = ColumnMap::resolve(&headers)?;
    tracing::debug!(
        day = columns.header(CanonicalField::Day),
        exercise = columns.header(CanonicalField::Exercise),
        reps = columns.header(CanonicalField::Reps),
        "Resolved sheet columns"
    );

    let mut days: Vec<WorkoutDay> = Vec::new();

    for row in 0..table.rows.len() {
        let cell = |field: CanonicalField| {
            match columns.index(field) {
                Some(column) => table.cell(row, column),
                None => &MISSING,
            }
        };
        let text = |field: CanonicalField| clean_cell(cell(field));

        let day_name = text(CanonicalField::Day);
        let name = text(CanonicalField::Exercise);
        if day_name.is_empty() || name.is_empty() {
            continue;
        }

        let reps = non_empty(text(CanonicalField::Reps)).unwrap_or_else(|| "10-12".to_string());
        let video_url = non_empty(text(CanonicalField::Video))
            .map(|url| to_embed_url(&url))
            .or_else(|| media.video_for(&name));

        let exercise = Exercise {
            muscle_group: text(CanonicalField::MuscleGroup),
            sets: parse_sets(cell(CanonicalField::Sets)),
            reps,
            weight: non_empty(text(CanonicalField::Weight)),
            notes: non_empty(text(CanonicalField::Notes)),
            image_url: media.image_for(&name),
            video_url,
            description: compose_description(
                &text(CanonicalField::Description),
                &text(CanonicalField::Method),
                &text(CanonicalField::RestInterval),
            ),
            rest_time: parse_rest_interval(cell(CanonicalField::RestInterval)),
            name,
        };

        match days.iter_mut().find(|d| d.day_name == day_name) {
            Some(day) => day.exercises.push(exercise),
            None => days.push(WorkoutDay {
                day_name,
                exercises: vec![exercise],
            }),
        }
    }

    days.retain(|d| !d.exercises.is_empty());
    if days.is_empty() {
        return Err(ImportError::EmptyImport);
    }

    Ok(days)
}

/// 업로드된 시트를 가져와 새 버전의 운동 계획으로 저장합니다.
pub async fn import_workout(
    pool: &SqlitePool,
    media: &dyn ExerciseMedia,
    upload: WorkoutUpload<'_>,
) -> Result<ImportSummary, AppError> {
    let format = SheetFormat::from_filename(upload.filename)?;

    if let Some(student_id) = upload.student_id {
        if !db::student_belongs_to(pool, student_id, upload.personal_id).await? {
            return Err(ImportError::StudentNotFound.into());
        }
    }

    let table = read_table(upload.bytes, format)?;
    let days = build_workout_days(&table, media)?;
    let name = workout_name_from_filename(upload.filename);

    let workout = db::insert_versioned(
        pool,
        &NewWorkout {
            name: &name,
            student_id: upload.student_id,
            personal_id: upload.personal_id,
            routine_id: upload.routine_id,
            days: &days,
        },
    )
    .await?;

    tracing::info!(
        workout_id = %workout.id,
        version = workout.version,
        days = days.len(),
        rows = table.rows.len(),
        "Imported workout sheet"
    );

    if let Some(student_id) = upload.student_id {
        let message = format!("Seu personal atualizou seu treino: {}", workout.name);
        if let Err(e) =
            db::create_notification(pool, student_id, "Novo Treino!", &message, kind::WORKOUT).await
        {
            tracing::warn!(student_id, "Failed to notify student about new workout: {}", e);
        }
    }

    Ok(workout.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::test_support::{seed_personal, seed_student, setup_test_db},
        services::media::{MediaTable, StaticMediaLibrary},
    };

    fn table(headers: &[&str], rows: &[&[&str]]) -> SheetTable {
        let cell = |s: &&str| {
            if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.to_string())
            }
        };
        SheetTable {
            headers: headers.iter().map(cell).collect(),
            rows: rows.iter().map(|r| r.iter().map(cell).collect()).collect(),
        }
    }

    fn no_media() -> StaticMediaLibrary {
        StaticMediaLibrary::new(MediaTable::default(), MediaTable::default())
    }

    const BENCH_CSV: &[u8] = b"Dia,Grupo Muscular,Exercicio,Series,Repeticoes,Carga,Observacoes,Rest\n\
Monday,Chest,Bench Press,4,8-12,60kg,,90\n";

    #[test]
    fn bench_press_row_becomes_one_day_with_one_exercise() {
        let table = read_table(BENCH_CSV, SheetFormat::Csv).unwrap();
        let days = build_workout_days(&table, &StaticMediaLibrary::builtin()).unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day_name, "Monday");
        assert_eq!(
            days[0].exercises,
            vec![Exercise {
                name: "Bench Press".to_string(),
                muscle_group: "Chest".to_string(),
                sets: 4,
                reps: "8-12".to_string(),
                weight: Some("60kg".to_string()),
                notes: None,
                image_url: None,
                video_url: None,
                description: Some("Intervalo: 90".to_string()),
                rest_time: 90,
            }]
        );
    }

    /// 숫자 셀과 중간의 빈 줄이 있는 .xlsx 워크북을 메모리에서 만듭니다.
    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        let headers = ["Dia", "Exercício", "Séries", "Repetições", "Intervalo"];
        for (col, header) in headers.into_iter().enumerate() {
            sheet.write_string(0, col as u16, header).unwrap();
        }

        sheet.write_string(1, 0, "Segunda").unwrap();
        sheet.write_string(1, 1, "Supino reto").unwrap();
        sheet.write_number(1, 2, 4.0).unwrap();
        sheet.write_number(1, 3, 12.0).unwrap();
        sheet.write_number(1, 4, 1.5).unwrap();

        // 2행은 비워 둔 구분 줄
        sheet.write_string(3, 0, "Segunda").unwrap();
        sheet.write_string(3, 1, "Remada").unwrap();
        sheet.write_number(3, 2, 3.0).unwrap();
        sheet.write_string(3, 3, "8-10").unwrap();
        sheet.write_string(3, 4, "60s").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn xlsx_numeric_cells_become_exercise_fields() {
        let bytes = workbook_bytes();
        let table = read_table(&bytes, SheetFormat::Xlsx).unwrap();
        assert_eq!(table.cell(0, 2), &CellValue::Number(4.0));

        let days = build_workout_days(&table, &no_media()).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day_name, "Segunda");

        let exercises = &days[0].exercises;
        assert_eq!(exercises.len(), 2);
        assert_eq!(exercises[0].name, "Supino reto");
        assert_eq!((exercises[0].sets, exercises[0].reps.as_str()), (4, "12"));
        assert_eq!(exercises[0].rest_time, 90);
        assert_eq!(exercises[0].description.as_deref(), Some("Intervalo: 1.5"));
        assert_eq!(exercises[1].name, "Remada");
        assert_eq!((exercises[1].sets, exercises[1].reps.as_str()), (3, "8-10"));
        assert_eq!(exercises[1].rest_time, 60);
    }

    #[tokio::test]
    async fn xlsx_upload_is_imported() {
        let pool = setup_test_db().await;
        let personal = seed_personal(&pool, "coach@example.com").await;
        let student = seed_student(&pool, &personal, "aluno@example.com").await;
        let bytes = workbook_bytes();

        let summary = import_workout(
            &pool,
            &no_media(),
            WorkoutUpload {
                bytes: &bytes,
                filename: "Treino A.XLSX",
                student_id: Some(&student),
                routine_id: None,
                personal_id: &personal,
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.name, "Treino A");
        assert_eq!((summary.version, summary.days_count, summary.exercises_count), (1, 1, 2));
    }

    #[test]
    fn rows_without_exercise_or_day_are_skipped() {
        let t = table(
            &["Dia", "Exercício", "Reps", "Séries"],
            &[
                &["A", "", "10", "4"],
                &["", "Remada", "10", "4"],
                &["A", "Puxada", "12", ""],
                &["nan", "Supino", "12", ""],
            ],
        );
        let days = build_workout_days(&t, &no_media()).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].exercises.len(), 1);
        assert_eq!(days[0].exercises[0].name, "Puxada");
        assert_eq!(days[0].exercises[0].sets, 3);
    }

    #[test]
    fn days_keep_first_seen_order() {
        let t = table(
            &["Day", "Exercise", "Reps"],
            &[
                &["B", "Agachamento", "10"],
                &["A", "Supino", "10"],
                &["B", "Leg press", "12"],
            ],
        );
        let days = build_workout_days(&t, &no_media()).unwrap();
        let names: Vec<_> = days.iter().map(|d| d.day_name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
        assert_eq!(days[0].exercises.len(), 2);
        assert_eq!(days[0].exercises[1].name, "Leg press");
    }

    #[test]
    fn defaults_apply_when_optional_cells_are_blank() {
        let t = table(&["Day", "Exercise", "Reps"], &[&["A", "Prancha", ""]]);
        let exercise = &build_workout_days(&t, &no_media()).unwrap()[0].exercises[0];
        assert_eq!(exercise.reps, "10-12");
        assert_eq!(exercise.sets, 3);
        assert_eq!(exercise.rest_time, 90);
        assert_eq!(exercise.muscle_group, "");
        assert_eq!(exercise.weight, None);
        assert_eq!(exercise.description, None);
    }

    #[test]
    fn description_joins_method_and_interval() {
        let t = table(
            &["Dia", "Exercício", "Repetições", "Descrição", "Método", "Intervalo"],
            &[&["A", "Supino", "10", "Pegada aberta", "Drop-set", "2 min"]],
        );
        let exercise = &build_workout_days(&t, &no_media()).unwrap()[0].exercises[0];
        assert_eq!(
            exercise.description.as_deref(),
            Some("Pegada aberta | Método: Drop-set | Intervalo: 2 min")
        );
        assert_eq!(exercise.rest_time, 120);
    }

    #[test]
    fn explicit_video_beats_library_and_is_embedded() {
        let media = StaticMediaLibrary::new(
            MediaTable::new([("supino", "https://img/supino.jpg")]),
            MediaTable::new([("supino", "https://youtu.be/library")]),
        );
        let t = table(
            &["Dia", "Exercício", "Reps", "Vídeo"],
            &[
                &["A", "Supino reto", "10", "https://www.youtube.com/watch?v=sheet"],
                &["A", "Supino inclinado", "10", ""],
            ],
        );
        let days = build_workout_days(&t, &media).unwrap();
        let exercises = &days[0].exercises;
        assert_eq!(
            exercises[0].video_url.as_deref(),
            Some("https://www.youtube.com/embed/sheet")
        );
        assert_eq!(
            exercises[1].video_url.as_deref(),
            Some("https://www.youtube.com/embed/library")
        );
        assert_eq!(exercises[1].image_url.as_deref(), Some("https://img/supino.jpg"));
    }

    #[test]
    fn sheet_with_only_blank_rows_is_an_empty_import() {
        let t = table(&["Dia", "Exercício", "Reps"], &[&["", "", ""], &["A", "", "10"]]);
        assert!(matches!(
            build_workout_days(&t, &no_media()),
            Err(ImportError::EmptyImport)
        ));
    }

    #[test]
    fn missing_required_columns_are_named() {
        let t = table(&["Grupo", "Carga"], &[&["Peito", "20kg"]]);
        match build_workout_days(&t, &no_media()) {
            Err(ImportError::MissingColumns { missing, .. }) => {
                assert_eq!(missing, vec!["day", "exercise", "reps"])
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn workout_name_strips_only_the_last_extension() {
        assert_eq!(workout_name_from_filename("Treino A.xlsx"), "Treino A");
        assert_eq!(workout_name_from_filename("plano.v2.csv"), "plano.v2");
        assert_eq!(workout_name_from_filename("semextensao"), "semextensao");
    }

    #[tokio::test]
    async fn reimport_archives_previous_version() {
        let pool = setup_test_db().await;
        let personal = seed_personal(&pool, "coach@example.com").await;
        let student = seed_student(&pool, &personal, "aluno@example.com").await;
        let media = no_media();

        let upload = |filename| WorkoutUpload {
            bytes: BENCH_CSV,
            filename,
            student_id: Some(&student),
            routine_id: None,
            personal_id: &personal,
        };

        let first = import_workout(&pool, &media, upload("Treino A.csv")).await.unwrap();
        let second = import_workout(&pool, &media, upload("Treino B.csv")).await.unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(second.version, first.version + 1);
        assert_eq!(second.name, "Treino B");
        assert_eq!(second.exercises_count, 1);

        let previous = db::find_workout(&pool, &first.id).await.unwrap().unwrap();
        assert!(previous.archived);

        let current = db::list_current_workouts(
            &pool,
            &db::WorkoutScope::Personal(&personal),
            Some(&student),
            None,
        )
        .await
        .unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, second.id);

        let notifications = db::list_notifications(&pool, &student).await.unwrap();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].kind, kind::WORKOUT);
    }

    #[tokio::test]
    async fn routine_slots_have_independent_versions() {
        let pool = setup_test_db().await;
        let personal = seed_personal(&pool, "coach@example.com").await;
        let student = seed_student(&pool, &personal, "aluno@example.com").await;
        let media = no_media();

        let mut versions = Vec::new();
        for routine in ["hipertrofia", "forca"] {
            let summary = import_workout(
                &pool,
                &media,
                WorkoutUpload {
                    bytes: BENCH_CSV,
                    filename: "plano.csv",
                    student_id: Some(&student),
                    routine_id: Some(routine),
                    personal_id: &personal,
                },
            )
            .await
            .unwrap();
            versions.push(summary.version);
        }

        assert_eq!(versions, [1, 1]);
        let current = db::list_current_workouts(
            &pool,
            &db::WorkoutScope::Student(&student),
            None,
            None,
        )
        .await
        .unwrap();
        assert_eq!(current.len(), 2);
    }

    #[tokio::test]
    async fn foreign_student_is_rejected_before_parsing() {
        let pool = setup_test_db().await;
        let owner = seed_personal(&pool, "owner@example.com").await;
        let intruder = seed_personal(&pool, "other@example.com").await;
        let student = seed_student(&pool, &owner, "aluno@example.com").await;

        let result = import_workout(
            &pool,
            &no_media(),
            WorkoutUpload {
                bytes: b"not even a sheet",
                filename: "plano.xlsx",
                student_id: Some(&student),
                routine_id: None,
                personal_id: &intruder,
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::Import(ImportError::StudentNotFound))
        ));
    }

    #[tokio::test]
    async fn failed_import_writes_nothing() {
        let pool = setup_test_db().await;
        let personal = seed_personal(&pool, "coach@example.com").await;

        let result = import_workout(
            &pool,
            &no_media(),
            WorkoutUpload {
                bytes: b"Grupo,Carga\nPeito,20\n",
                filename: "plano.csv",
                student_id: None,
                routine_id: None,
                personal_id: &personal,
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::Import(ImportError::MissingColumns { .. }))
        ));
        let current =
            db::list_current_workouts(&pool, &db::WorkoutScope::Personal(&personal), None, None)
                .await
                .unwrap();
        assert!(current.is_empty());
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected() {
        let pool = setup_test_db().await;
        let personal = seed_personal(&pool, "coach@example.com").await;

        let result = import_workout(
            &pool,
            &no_media(),
            WorkoutUpload {
                bytes: BENCH_CSV,
                filename: "plano.pdf",
                student_id: None,
                routine_id: None,
                personal_id: &personal,
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::Import(ImportError::UnsupportedFileType))
        ));
    }
}

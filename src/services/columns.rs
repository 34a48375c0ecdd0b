//! # 시트 헤더 해석
//!
//! 실제 시트의 헤더 이름은 언어와 표기가 제각각입니다 ("Exercício", "EXERCICIO ",
//! "exercise" ...). 이 모듈은 각 헤더를 정규화한 뒤 별칭(alias) 표와 비교해
//! 정규 필드(`CanonicalField`)에 연결합니다.
//!
//! 정규화: trim → 소문자 → NFKD 분해 후 결합 문자 제거 → 영숫자가 아닌 문자열을
//! 공백 하나로 → trim

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::importer::ImportError;

/// 시트에서 읽어들이는 논리적 컬럼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Day,
    Exercise,
    Reps,
    MuscleGroup,
    Sets,
    Weight,
    RestInterval,
    Notes,
    Method,
    Video,
    Description,
}

const FIELD_COUNT: usize = 11;

impl CanonicalField {
    pub const ALL: [CanonicalField; FIELD_COUNT] = [
        CanonicalField::Day,
        CanonicalField::Exercise,
        CanonicalField::Reps,
        CanonicalField::MuscleGroup,
        CanonicalField::Sets,
        CanonicalField::Weight,
        CanonicalField::RestInterval,
        CanonicalField::Notes,
        CanonicalField::Method,
        CanonicalField::Video,
        CanonicalField::Description,
    ];

    /// 없으면 가져오기가 실패하는 필드
    pub const REQUIRED: [CanonicalField; 3] =
        [CanonicalField::Day, CanonicalField::Exercise, CanonicalField::Reps];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Day => "day",
            CanonicalField::Exercise => "exercise",
            CanonicalField::Reps => "reps",
            CanonicalField::MuscleGroup => "muscle_group",
            CanonicalField::Sets => "sets",
            CanonicalField::Weight => "weight",
            CanonicalField::RestInterval => "rest_interval",
            CanonicalField::Notes => "notes",
            CanonicalField::Method => "method",
            CanonicalField::Video => "video",
            CanonicalField::Description => "description",
        }
    }

    /// 허용되는 헤더 표기 (우선순위 순)
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Day => &[
                "Dia",
                "Day",
                "Dia da Semana",
                "Dia de Treino",
                "Treino",
                "Divisão",
                "Workout Day",
                "Training Day",
                "Día",
            ],
            CanonicalField::Exercise => &[
                "Exercício",
                "Exercise",
                "Exercícios",
                "Nome do Exercício",
                "Exercise Name",
                "Ejercicio",
                "Movimento",
                "Nome",
                "Name",
            ],
            CanonicalField::Reps => &[
                "Repetições",
                "Reps",
                "Repetitions",
                "Repetição",
                "Rep",
                "Repeticiones",
                "Nº Reps",
            ],
            CanonicalField::MuscleGroup => &[
                "Grupo Muscular",
                "Muscle Group",
                "Grupo",
                "Músculo",
                "Muscle",
                "Grupo Muscular Alvo",
            ],
            CanonicalField::Sets => &["Séries", "Sets", "Série", "Set", "Series", "Nº Séries"],
            CanonicalField::Weight => &["Carga", "Weight", "Peso", "Load", "Carga (kg)", "Kg"],
            CanonicalField::RestInterval => &[
                "Intervalo",
                "Descanso",
                "Rest",
                "Rest Interval",
                "Intervalo de Descanso",
                "Rest Time",
                "Pausa",
            ],
            CanonicalField::Notes => &[
                "Observações",
                "Observação",
                "Obs",
                "Notes",
                "Notas",
                "Note",
            ],
            CanonicalField::Method => &["Método", "Method", "Técnica", "Metodo de Treino"],
            CanonicalField::Video => &["Vídeo", "Video", "Link", "Video URL", "Link do Vídeo", "YouTube"],
            CanonicalField::Description => &["Descrição", "Description", "Instruções", "Execução"],
        }
    }
}

/// 헤더 비교용 정규화
pub fn normalize_header(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut normalized = String::with_capacity(folded.len());
    let mut pending_space = false;
    for c in folded.chars() {
        if c.is_alphanumeric() {
            if pending_space && !normalized.is_empty() {
                normalized.push(' ');
            }
            pending_space = false;
            normalized.push(c);
        } else {
            pending_space = true;
        }
    }
    normalized
}

/// 정규 필드 → 시트 컬럼 위치
#[derive(Debug, Clone)]
pub struct ColumnMap {
    columns: [Option<usize>; FIELD_COUNT],
    headers: Vec<String>,
}

impl ColumnMap {
    /// 헤더 목록을 정규 필드에 연결합니다.
    ///
    /// 필수 필드(`day`, `exercise`, `reps`) 중 하나라도 찾지 못하면
    /// 빠진 필드와 실제 헤더 목록을 담은 `MissingColumns`를 반환합니다.
    pub fn resolve(headers: &[String]) -> Result<Self, ImportError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        let mut columns = [None; FIELD_COUNT];
        for (slot, field) in columns.iter_mut().zip(CanonicalField::ALL) {
            *slot = field.aliases().iter().find_map(|alias| {
                let alias = normalize_header(alias);
                normalized.iter().position(|h| !h.is_empty() && *h == alias)
            });
        }

        let map = Self {
            columns,
            headers: headers.to_vec(),
        };

        let missing: Vec<String> = CanonicalField::REQUIRED
            .iter()
            .filter(|field| map.index(**field).is_none())
            .map(|field| field.as_str().to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns {
                missing,
                found: map.headers,
            });
        }

        Ok(map)
    }

    pub fn index(&self, field: CanonicalField) -> Option<usize> {
        let position = CanonicalField::ALL.iter().position(|f| *f == field)?;
        self.columns[position]
    }

    /// 해당 필드에 연결된 원본 헤더 (대소문자 그대로)
    pub fn header(&self, field: CanonicalField) -> Option<&str> {
        self.index(field)
            .and_then(|i| self.headers.get(i))
            .map(String::as_str)
    }
}

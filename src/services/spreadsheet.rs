//! # 스프레드시트 읽기
//!
//! 업로드된 바이트를 `SheetTable`(헤더 + 행 목록)로 변환합니다.
//! 첫 번째 행은 헤더, 나머지는 데이터 행입니다.
//!
//! - `.xls` / `.xlsx`: calamine으로 첫 번째 시트를 읽습니다.
//! - `.csv`: UTF-8(BOM 허용)로 읽고, 실패하면 Windows-1252로 읽은 뒤
//!   csv 크레이트로 파싱합니다.

use std::{borrow::Cow, fmt, io::Cursor};

use calamine::{open_workbook_from_rs, Data, Reader, Xls, Xlsx};
use encoding_rs::{UTF_8, WINDOWS_1252};

use super::importer::ImportError;

/// 시트 셀 하나의 값
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 빈 셀, 누락된 셀, 에러 셀
    Empty,
    Text(String),
    Number(f64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            // 정수 값은 "4.0"이 아니라 "4"로 표시
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// 파싱된 표. `rows`의 각 행은 `headers`와 같은 순서의 셀 목록입니다.
/// 행이 헤더보다 짧을 수 있으며, 없는 칸은 `CellValue::Empty`로 취급합니다.
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    pub headers: Vec<CellValue>,
    pub rows: Vec<Vec<CellValue>>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl SheetTable {
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// 허용되는 업로드 파일 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Xls,
    Xlsx,
}

impl SheetFormat {
    /// 파일명의 확장자(대소문자 무시)로 형식을 결정합니다.
    pub fn from_filename(filename: &str) -> Result<Self, ImportError> {
        let lower = filename.trim().to_lowercase();
        if lower.ends_with(".csv") {
            Ok(SheetFormat::Csv)
        } else if lower.ends_with(".xlsx") {
            Ok(SheetFormat::Xlsx)
        } else if lower.ends_with(".xls") {
            Ok(SheetFormat::Xls)
        } else {
            Err(ImportError::UnsupportedFileType)
        }
    }
}

/// 업로드 바이트를 형식에 맞게 읽습니다.
pub fn read_table(bytes: &[u8], format: SheetFormat) -> Result<SheetTable, ImportError> {
    match format {
        SheetFormat::Csv => read_csv(bytes),
        SheetFormat::Xlsx => read_workbook::<Xlsx<_>>(bytes),
        SheetFormat::Xls => read_workbook::<Xls<_>>(bytes),
    }
}

fn read_workbook<R>(bytes: &[u8]) -> Result<SheetTable, ImportError>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: fmt::Display,
{
    // 클로저에서 R::Error 타입을 알 수 있도록 R을 명시합니다.
    let mut workbook = open_workbook_from_rs::<R, _>(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::ParseFailure(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::ParseFailure("workbook has no sheets".to_string()))?
        .map_err(|e| ImportError::ParseFailure(e.to_string()))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(CellValue::from).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();

    Ok(SheetTable { headers, rows })
}

fn decode_csv_text(bytes: &[u8]) -> Result<Cow<'_, str>, ImportError> {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(body) {
        return Ok(text);
    }

    // WHATWG Windows-1252는 256개 바이트를 모두 문자로 매핑하므로 실패하지 않습니다.
    // ISO-8859-1/15로 저장된 파일도 여기서 읽힙니다.
    match WINDOWS_1252.decode_without_bom_handling_and_without_replacement(body) {
        Some(text) => {
            tracing::debug!(encoding = WINDOWS_1252.name(), "CSV decoded with fallback encoding");
            Ok(text)
        }
        None => Err(ImportError::ParseFailure(
            "could not decode CSV text as UTF-8 or Windows-1252".to_string(),
        )),
    }
}

/// 헤더 줄에 `;`가 `,`보다 많으면 세미콜론 구분자로 판단합니다
/// (소수점 쉼표를 쓰는 지역의 엑셀 내보내기 형식).
fn sniff_delimiter(text: &str) -> u8 {
    let header_line = text.lines().next().unwrap_or("");
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn read_csv(bytes: &[u8]) -> Result<SheetTable, ImportError> {
    let text = decode_csv_text(bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&text))
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::ParseFailure(e.to_string()))?
        .iter()
        .map(csv_cell)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::ParseFailure(e.to_string()))?;
        rows.push(record.iter().map(csv_cell).collect());
    }

    Ok(SheetTable { headers, rows })
}

fn csv_cell(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(field.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_chosen_by_case_insensitive_extension() {
        assert_eq!(SheetFormat::from_filename("plan.CSV").unwrap(), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_filename("Treino A.xlsx").unwrap(), SheetFormat::Xlsx);
        assert_eq!(SheetFormat::from_filename("old.XLS").unwrap(), SheetFormat::Xls);
        assert!(matches!(
            SheetFormat::from_filename("plan.pdf"),
            Err(ImportError::UnsupportedFileType)
        ));
        assert!(matches!(
            SheetFormat::from_filename("xlsx"),
            Err(ImportError::UnsupportedFileType)
        ));
    }

    #[test]
    fn csv_with_utf8_bom_is_decoded() {
        let bytes = "\u{feff}Dia,Exercício,Repetições\nSegunda,Supino,10\n".as_bytes();
        let table = read_table(bytes, SheetFormat::Csv).unwrap();
        assert_eq!(table.headers[0], CellValue::Text("Dia".to_string()));
        assert_eq!(table.headers[1], CellValue::Text("Exercício".to_string()));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 1), &CellValue::Text("Supino".to_string()));
    }

    #[test]
    fn latin1_csv_falls_back_to_windows_1252() {
        // Latin-1 "Exercício": í = 0xED
        let mut bytes = b"Dia,Exerc".to_vec();
        bytes.push(0xED);
        bytes.extend_from_slice(b"cio,Reps\nA,Remada,12\n");

        let table = read_table(&bytes, SheetFormat::Csv).unwrap();
        assert_eq!(table.headers[1], CellValue::Text("Exercício".to_string()));
    }

    #[test]
    fn windows_1252_fallback_never_rejects_bytes() {
        // 0x80 = € (Windows-1252), 0x81 = 정의되지 않은 자리, 0xA4 = ¤
        let mut bytes = b"Dia,Exercicio,Reps\nA,Remada ".to_vec();
        bytes.extend_from_slice(&[0x80, 0x81, 0xA4]);
        bytes.extend_from_slice(b",12\n");

        let table = read_table(&bytes, SheetFormat::Csv).unwrap();
        assert_eq!(
            table.cell(0, 1),
            &CellValue::Text("Remada \u{20ac}\u{81}\u{a4}".to_string())
        );
    }

    #[test]
    fn semicolon_delimited_csv_is_detected() {
        let bytes = b"Dia;Exercicio;Reps;Carga\nA;Agachamento;8-10;80,5kg\n";
        let table = read_table(bytes, SheetFormat::Csv).unwrap();
        assert_eq!(table.headers.len(), 4);
        assert_eq!(table.cell(0, 3), &CellValue::Text("80,5kg".to_string()));
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let bytes = b"Dia,Exercicio,Reps,Notas\nA,Remada\n";
        let table = read_table(bytes, SheetFormat::Csv).unwrap();
        assert_eq!(table.cell(0, 3), &CellValue::Empty);
        assert_eq!(table.cell(5, 0), &CellValue::Empty);
    }

    #[test]
    fn corrupt_workbook_is_a_parse_failure() {
        let result = read_table(b"definitely not a zip archive", SheetFormat::Xlsx);
        assert!(matches!(result, Err(ImportError::ParseFailure(_))));
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(CellValue::Number(4.0).to_string(), "4");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}

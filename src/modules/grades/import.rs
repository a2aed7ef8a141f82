//! Grade rows read from an uploaded CSV or spreadsheet.
//!
//! The first row holds the headers. Column names are matched after trimming
//! and lowercasing, against these synonyms:
//!
//! | field        | accepted headers                 |
//! |--------------|----------------------------------|
//! | `student_id` | `student_id`, `studentid`, `id`  |
//! | `course_id`  | `course_id`, `courseid`, `course`|
//! | `grade`      | `grade`, `nota`, `score`         |
//! | `subject`    | `subject`, `materia`             |
//!
//! A row whose ids or grade cannot be read is skipped and counted. Blank rows
//! are ignored altogether.

use std::collections::HashMap;
use std::fmt::Display;
use std::io::Cursor;

use aula_core::AppError;
use aula_models::grades::GradeCreate;
use calamine::{Data, Reader, Xls, Xlsx, open_workbook_from_rs};
use thiserror::Error;
use validator::Validate;

const STUDENT_HEADERS: &[&str] = &["student_id", "studentid", "id"];
const COURSE_HEADERS: &[&str] = &["course_id", "courseid", "course"];
const GRADE_HEADERS: &[&str] = &["grade", "nota", "score"];
const SUBJECT_HEADERS: &[&str] = &["subject", "materia"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Formato de archivo no soportado. Use CSV o XLSX.")]
    UnsupportedFormat,

    #[error("Error procesando el archivo: {0}")]
    Unreadable(String),
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        AppError::bad_request(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Format implied by the file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ImportError> {
        let name = filename.trim().to_lowercase();
        if name.ends_with(".csv") {
            Ok(FileFormat::Csv)
        } else if name.ends_with(".xlsx") {
            Ok(FileFormat::Xlsx)
        } else if name.ends_with(".xls") {
            Ok(FileFormat::Xls)
        } else {
            Err(ImportError::UnsupportedFormat)
        }
    }
}

/// Outcome of reading one file.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedGrades {
    pub rows: Vec<GradeCreate>,
    pub skipped: usize,
}

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

pub fn parse(format: FileFormat, bytes: &[u8]) -> Result<ParsedGrades, ImportError> {
    let table = match format {
        FileFormat::Csv => read_csv(bytes)?,
        FileFormat::Xlsx => read_workbook::<Xlsx<_>>(bytes)?,
        FileFormat::Xls => read_workbook::<Xls<_>>(bytes)?,
    };
    Ok(normalize(table))
}

fn header_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn read_csv(bytes: &[u8]) -> Result<RawTable, ImportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ImportError::Unreadable(e.to_string()))?
        .iter()
        .map(header_key)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Unreadable(e.to_string()))?;
        rows.push(record.iter().map(|v| v.trim().to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn read_workbook<R>(bytes: &[u8]) -> Result<RawTable, ImportError>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: Display,
{
    let mut workbook: R = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e: R::Error| ImportError::Unreadable(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Unreadable("el libro no contiene hojas".to_string()))?
        .map_err(|e| ImportError::Unreadable(e.to_string()))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    let headers = rows
        .next()
        .map(|header| header.iter().map(|h| header_key(h)).collect())
        .unwrap_or_default();

    Ok(RawTable {
        headers,
        rows: rows.collect(),
    })
}

/// First non-empty value among the synonym columns.
fn pick<'a>(record: &HashMap<&str, &'a str>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| record.get(name).copied())
        .find(|value| !value.is_empty())
}

/// Integer id, also accepting integral decimals such as `"12.0"`.
fn parse_id(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn parse_grade(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn to_grade(headers: &[String], row: &[String]) -> Option<GradeCreate> {
    let record: HashMap<&str, &str> = headers
        .iter()
        .zip(row.iter().map(String::as_str).chain(std::iter::repeat("")))
        .filter(|(header, _)| !header.is_empty())
        .map(|(header, value)| (header.as_str(), value))
        .collect();

    let grade = GradeCreate {
        student_id: pick(&record, STUDENT_HEADERS).and_then(parse_id)?,
        course_id: pick(&record, COURSE_HEADERS).and_then(parse_id)?,
        grade: pick(&record, GRADE_HEADERS).and_then(parse_grade)?,
        subject: pick(&record, SUBJECT_HEADERS).map(str::to_string),
    };
    grade.validate().ok()?;
    Some(grade)
}

fn normalize(table: RawTable) -> ParsedGrades {
    let mut parsed = ParsedGrades::default();
    for row in table
        .rows
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
    {
        match to_grade(&table.headers, row) {
            Some(grade) => parsed.rows.push(grade),
            None => parsed.skipped += 1,
        }
    }
    parsed
}

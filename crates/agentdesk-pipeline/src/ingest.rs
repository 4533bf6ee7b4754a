//! Spreadsheet ingestion.
//!
//! Turns an uploaded CSV, XLS or XLSX file into [`LeadRecord`]s. Only the
//! first sheet is read. Validation is all-or-nothing: if any data row lacks
//! `FirstName`, `Phone` or `Notes`, the whole file is rejected.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xls, Xlsx};
use tracing::{debug, info, warn};

use agentdesk_core::LeadRecord;

use crate::error::{IngestError, RequiredField, RowIssue};

pub const CSV_MIME: &str = "text/csv";
pub const XLS_MIME: &str = "application/vnd.ms-excel";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// File formats the ingestor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xls,
    Xlsx,
}

impl FileKind {
    /// Resolve a declared MIME type against the allow-list.
    ///
    /// Parameters such as `; charset=utf-8` are ignored. Content is never
    /// inspected.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            CSV_MIME => Some(Self::Csv),
            XLS_MIME => Some(Self::Xls),
            XLSX_MIME => Some(Self::Xlsx),
            _ => None,
        }
    }

    /// Guess the format from a file extension, without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xls" => Some(Self::Xls),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    /// The canonical MIME type for this format.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME,
            Self::Xls => XLS_MIME,
            Self::Xlsx => XLSX_MIME,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xls => "XLS",
            Self::Xlsx => "XLSX",
        }
    }
}

/// The first sheet of a file as plain strings.
struct Table {
    headers: Vec<String>,
    /// Data rows with their 1-based spreadsheet row number.
    rows: Vec<(usize, Vec<String>)>,
}

/// Parse an uploaded file into validated lead records.
pub fn parse(bytes: &[u8], declared_mime: &str) -> Result<Vec<LeadRecord>, IngestError> {
    let kind = FileKind::from_mime(declared_mime)
        .ok_or_else(|| IngestError::UnsupportedFileType(declared_mime.to_string()))?;

    debug!(kind = kind.label(), bytes = bytes.len(), "Parsing upload");

    let table = match kind {
        FileKind::Csv => read_csv(bytes)?,
        FileKind::Xls => {
            let workbook: Xls<_> = open_workbook_from_rs(Cursor::new(bytes))
                .map_err(|e| malformed(kind, e))?;
            read_first_sheet(workbook, kind)?
        }
        FileKind::Xlsx => {
            let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
                .map_err(|e| malformed(kind, e))?;
            read_first_sheet(workbook, kind)?
        }
    };

    let records = validate(table)?;
    info!(kind = kind.label(), records = records.len(), "Upload validated");
    Ok(records)
}

fn malformed(kind: FileKind, err: impl std::fmt::Display) -> IngestError {
    IngestError::Malformed {
        format: kind.label(),
        reason: err.to_string(),
    }
}

fn read_csv(bytes: &[u8]) -> Result<Table, IngestError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| malformed(FileKind::Csv, e))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);
        rows.push((line, record.iter().map(str::to_string).collect()));
    }

    Ok(into_table(rows.into_iter()))
}

fn read_first_sheet<RS, R>(mut workbook: R, kind: FileKind) -> Result<Table, IngestError>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_count = workbook.sheet_names().len();
    if sheet_count > 1 {
        warn!(sheets = sheet_count, "Workbook has several sheets, reading only the first");
    }

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| malformed(kind, e))?,
        None => return Ok(into_table(std::iter::empty())),
    };

    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let rows = range.rows().enumerate().map(|(i, cells)| {
        let values = cells.iter().map(cell_text).collect::<Vec<_>>();
        (first_row + i + 1, values)
    });

    Ok(into_table(rows))
}

/// Split raw rows into a header row and data rows, dropping blank rows.
fn into_table(rows: impl Iterator<Item = (usize, Vec<String>)>) -> Table {
    let mut rows = rows.filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()));

    let headers = rows
        .next()
        .map(|(_, cells)| cells.into_iter().map(|c| c.trim().to_string()).collect())
        .unwrap_or_default();

    Table {
        headers,
        rows: rows.collect(),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Phone numbers typed into Excel come back as floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn validate(table: Table) -> Result<Vec<LeadRecord>, IngestError> {
    let column = |field: RequiredField| table.headers.iter().position(|h| h == field.header());
    let columns = RequiredField::ALL.map(|field| (field, column(field)));

    let mut records = Vec::with_capacity(table.rows.len());
    let mut issues = Vec::new();

    for (row_number, cells) in &table.rows {
        let value = |index: Option<usize>| {
            index
                .and_then(|i| cells.get(i))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<RequiredField> = columns
            .iter()
            .filter(|(_, index)| value(*index).is_none())
            .map(|(field, _)| *field)
            .collect();

        if !missing.is_empty() {
            issues.push(RowIssue {
                row: *row_number,
                missing,
            });
            continue;
        }

        let [first_name, phone, notes] = columns.map(|(_, index)| value(index).unwrap_or_default());
        records.push(LeadRecord::new(first_name, phone, notes));
    }

    if !issues.is_empty() {
        warn!(
            invalid_rows = issues.len(),
            total_rows = table.rows.len(),
            "Rejecting upload with invalid rows"
        );
        return Err(IngestError::Validation { issues });
    }

    Ok(records)
}

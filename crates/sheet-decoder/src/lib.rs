//! Spreadsheet decoding boundary: raw file bytes in, ordered rows of
//! untyped cells out. Row 0 is the header row; typing the cells is the
//! record builder's job, not ours.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use fund_core::DecodeError;

/// One untyped spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

/// Decoded sheet: header strings plus data rows in source order.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Decode spreadsheet bytes, dispatching on the file extension. The same
/// entry point serves auto-loaded and manually selected files.
pub fn decode(file_name: &str, bytes: &[u8]) -> Result<RawSheet, DecodeError> {
    let extension = file_name
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xls" => decode_workbook(bytes),
        "csv" => decode_csv(bytes),
        _ => Err(DecodeError::UnsupportedFileType(file_name.to_string())),
    }
}

/// Decode an Excel workbook from its first worksheet.
fn decode_workbook(bytes: &[u8]) -> Result<RawSheet, DecodeError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::EmptySheet)?
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let mut iter = range.rows();
    let header_row = iter.next().ok_or(DecodeError::EmptySheet)?;
    let headers: Vec<String> = header_row.iter().map(header_text).collect();

    let rows: Vec<Vec<Cell>> = iter
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    tracing::debug!(columns = headers.len(), rows = rows.len(), "decoded workbook");
    Ok(RawSheet { headers, rows })
}

/// Decode CSV bytes. Every cell stays text; numeric-looking strings are
/// parsed downstream so both backends feed the builder the same way.
fn decode_csv(bytes: &[u8]) -> Result<RawSheet, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let header_record = match records.next() {
        Some(r) => r.map_err(|e| DecodeError::Malformed(e.to_string()))?,
        None => return Err(DecodeError::EmptySheet),
    };
    let headers: Vec<String> = header_record.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|e| DecodeError::Malformed(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    let field = field.trim();
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    tracing::debug!(columns = headers.len(), rows = rows.len(), "decoded csv");
    Ok(RawSheet { headers, rows })
}

fn header_text(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.to_string())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::Date(naive.date()),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) => match s.get(..10).and_then(|d| d.parse::<NaiveDate>().ok()) {
            Some(date) => Cell::Date(date),
            None => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => {
            tracing::debug!("cell error in sheet: {:?}", e);
            Cell::Empty
        }
    }
}

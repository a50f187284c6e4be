use calamine::{Data, Reader, Xlsx};
use serde_json::{Number, Value};
use std::io::Cursor;
use vault_types::import::ImportRow;

use crate::parser::ParseError;

/// Reads the first worksheet of a workbook, using its first row as field
/// names.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<ImportRow>, ParseError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(ParseError::Xlsx)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::NoSheets)?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(ParseError::Xlsx)?;
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(vec![]);
    };
    let headers: Vec<Option<String>> = header.iter().map(header_text).collect();
    Ok(rows
        .map(|cells| {
            let mut row = ImportRow::default();
            for (header, cell) in headers.iter().zip(cells) {
                if let (Some(header), Some(value)) = (header, cell_value(cell)) {
                    row.insert(header.clone(), value);
                }
            }
            row
        })
        .filter(|row| !row.is_empty())
        .collect())
}

fn header_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        other => Some(other.to_string()).filter(|h| !h.trim().is_empty()),
    }
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(d) => Number::from_f64(d.as_f64()).map(Value::Number),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        #[allow(unreachable_patterns)]
        other => Some(Value::String(other.to_string())),
    }
}

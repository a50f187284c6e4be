use derive_more::{Display, Error};
use serde_json::Value;
use std::str::FromStr;
use vault_types::import::ImportRow;

/// Encoding of an uploaded product file.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum FileKind {
    #[display("json")]
    Json,
    #[display("csv")]
    Csv,
    #[display("xlsx")]
    Xlsx,
}

impl FileKind {
    /// Derives the kind from the extension of an uploaded file name.
    pub fn from_file_name(name: &str) -> Result<Self, ParseError> {
        match name.rsplit_once('.') {
            Some((_, ext)) => ext.parse(),
            None => Err(ParseError::UnsupportedFormat(name.to_string())),
        }
    }
}

impl FromStr for FileKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(ParseError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ParseError {
    #[display("File is not valid UTF-8: {_0}")]
    InvalidUtf8(std::str::Utf8Error),
    #[display("Malformed JSON: {_0}")]
    Json(serde_json::Error),
    #[display("JSON document is not an array of products")]
    NotAnArray,
    #[display("JSON element {index} is not an object")]
    NotAnObject { index: usize },
    #[display("Malformed CSV: {_0}")]
    Csv(::csv::Error),
    #[display("Malformed spreadsheet: {_0}")]
    Xlsx(calamine::XlsxError),
    #[display("Workbook has no sheets")]
    NoSheets,
    #[error(ignore)]
    #[display("Unsupported file format: {_0}")]
    UnsupportedFormat(String),
}

/// Turns an uploaded file into loosely typed rows.
///
/// Fails as a whole: a malformed file yields no rows at all.
pub fn parse_rows(bytes: &[u8], kind: FileKind) -> Result<Vec<ImportRow>, ParseError> {
    let rows = match kind {
        FileKind::Json => parse_json(bytes)?,
        FileKind::Csv => crate::csv::read_rows(bytes)?,
        FileKind::Xlsx => crate::xlsx::read_rows(bytes)?,
    };
    log::debug!("Parsed {} rows from {kind} file", rows.len());
    Ok(rows)
}

fn parse_json(bytes: &[u8]) -> Result<Vec<ImportRow>, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(ParseError::InvalidUtf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let value: Value = serde_json::from_str(text).map_err(ParseError::Json)?;
    let Value::Array(items) = value else {
        return Err(ParseError::NotAnArray);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(ImportRow(map)),
            _ => Err(ParseError::NotAnObject { index }),
        })
        .collect()
}

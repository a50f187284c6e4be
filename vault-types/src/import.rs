use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One loosely typed record extracted from an uploaded file.
///
/// Keys are the column headers (or object keys for JSON input). Values keep
/// whatever type the source encoding produced: CSV yields only strings,
/// spreadsheets and JSON may yield numbers, booleans and arrays.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct ImportRow(pub Map<String, Value>);

impl ImportRow {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn insert<S: Into<String>>(&mut self, field: S, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ImportRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[derive(Serialize, Deserialize, Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[display("info")]
    Info,
    #[display("warning")]
    Warning,
    #[display("error")]
    Error,
}

/// Outcome report for a single row, pushed to the caller as soon as it is
/// known.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImportLogEntry {
    pub row: ImportRow,
    pub success: bool,
    pub message: String,
    pub level: LogLevel,
}

impl ImportLogEntry {
    pub fn succeeded<S: Into<String>>(row: ImportRow, message: S) -> Self {
        Self {
            row,
            success: true,
            message: message.into(),
            level: LogLevel::Info,
        }
    }

    pub fn failed<S: Into<String>>(row: ImportRow, message: S) -> Self {
        Self {
            row,
            success: false,
            message: message.into(),
            level: LogLevel::Error,
        }
    }

    /// Annotation for a row that still continues processing.
    pub fn warning<S: Into<String>>(row: ImportRow, message: S) -> Self {
        Self {
            row,
            success: true,
            message: message.into(),
            level: LogLevel::Warning,
        }
    }
}

/// Aggregate of the log entries of one import run, built by the caller.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl ImportSummary {
    pub fn record(&mut self, entry: &ImportLogEntry) {
        match (entry.success, entry.level) {
            (false, _) => self.failed += 1,
            (true, LogLevel::Warning) => self.warnings += 1,
            (true, _) => self.succeeded += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn rows(&self) -> usize {
        self.succeeded + self.failed
    }
}

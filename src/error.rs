use rust_xlsxwriter::XlsxError;
use serde::ser::SerializeStruct;
use serde::Serialize;

/// Outcome classes the calling shell distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Extraction,
  EmptyResult,
  Other,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("input file not found: {0}")]
  InputNotFound(String),

  #[error("no YYYYMMDD date in file name: {0}")]
  MissingDate(String),

  #[error("invalid date `{value}` in file name: {file}")]
  InvalidDate { file: String, value: String },

  #[error("sheet `{sheet}` not found in {file}")]
  MissingSheet { file: String, sheet: String },

  #[error("column `{column}` not found in {file}")]
  MissingColumn { file: String, column: String },

  #[error("{file} row {row}: `{column}` is not numeric ({value})")]
  InvalidNumber {
    file: String,
    row: usize,
    column: String,
    value: String,
  },

  #[error("{file} row {row}: `{column}` is not a whole number ({value})")]
  InvalidInteger {
    file: String,
    row: usize,
    column: String,
    value: String,
  },

  #[error("no records for program {0}")]
  NoMatchingRecords(i64),

  #[error("invalid settings: {0}")]
  Config(String),

  #[error("read workbook: {0}")]
  Read(#[from] calamine::Error),

  #[error("export: {0}")]
  Export(#[from] XlsxError),

  #[error("settings file: {0}")]
  Json(#[from] serde_json::Error),

  #[error("write summary: {0}")]
  Summary(serde_json::Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl AppError {
  pub fn code(&self) -> &'static str {
    match self {
      AppError::InputNotFound(_) => "INPUT_NOT_FOUND",
      AppError::MissingDate(_) | AppError::InvalidDate { .. } => "INVALID_FILENAME",
      AppError::MissingSheet { .. } | AppError::MissingColumn { .. } => "INVALID_LAYOUT",
      AppError::InvalidNumber { .. } | AppError::InvalidInteger { .. } => "INVALID_VALUE",
      AppError::NoMatchingRecords(_) => "NO_RECORDS",
      AppError::Config(_) | AppError::Json(_) => "CONFIG",
      AppError::Read(_) => "READ_ERROR",
      AppError::Export(_) => "EXPORT",
      AppError::Summary(_) => "OUTPUT",
      AppError::Io(_) => "IO_ERROR",
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      AppError::NoMatchingRecords(_) => ErrorKind::EmptyResult,
      AppError::InputNotFound(_)
      | AppError::MissingDate(_)
      | AppError::InvalidDate { .. }
      | AppError::MissingSheet { .. }
      | AppError::MissingColumn { .. }
      | AppError::InvalidNumber { .. }
      | AppError::InvalidInteger { .. }
      | AppError::Read(_) => ErrorKind::Extraction,
      _ => ErrorKind::Other,
    }
  }
}

impl Serialize for AppError {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("AppError", 2)?;
    state.serialize_field("code", self.code())?;
    state.serialize_field("message", &self.to_string())?;
    state.end()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_result_is_reported_apart_from_extraction_failures() {
    assert_eq!(AppError::NoMatchingRecords(12240500161).kind(), ErrorKind::EmptyResult);
    assert_eq!(AppError::MissingDate("detail.xlsx".into()).kind(), ErrorKind::Extraction);
    assert_eq!(AppError::Config("bad".into()).kind(), ErrorKind::Other);
  }

  #[test]
  fn summary_output_failure_is_not_a_settings_error() {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = AppError::Summary(source);
    assert_eq!(err.code(), "OUTPUT");
    assert_eq!(err.kind(), ErrorKind::Other);
    assert!(err.to_string().starts_with("write summary: "));
  }

  #[test]
  fn serializes_code_and_message() {
    let err = AppError::MissingColumn {
      file: "20230115.xlsx".into(),
      column: "รวม".into(),
    };
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "INVALID_LAYOUT");
    assert_eq!(json["message"], "column `รวม` not found in 20230115.xlsx");
  }
}

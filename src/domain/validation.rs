use std::path::Path;
use std::sync::OnceLock;

use calamine::Data;
use chrono::NaiveDate;
use regex::Regex;

use crate::error::AppError;

fn date_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"[0-9๐-๙]{8}").expect("static regex"))
}

pub fn file_label(path: &Path) -> String {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .map(str::to_string)
    .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Thai digits ๐..๙ to ASCII; everything else unchanged.
fn ascii_digits(text: &str) -> String {
  text
    .chars()
    .map(|ch| match ch {
      '๐'..='๙' => char::from(b'0' + (ch as u32 - '๐' as u32) as u8),
      other => other,
    })
    .collect()
}

/// Transaction date from the first 8-digit run (ASCII or Thai digits) in the file name.
pub fn date_from_filename(path: &Path) -> Result<NaiveDate, AppError> {
  let label = file_label(path);
  let digits = date_pattern()
    .find(&label)
    .ok_or_else(|| AppError::MissingDate(label.clone()))?
    .as_str();
  NaiveDate::parse_from_str(&ascii_digits(digits), "%Y%m%d").map_err(|_| AppError::InvalidDate {
    file: label.clone(),
    value: digits.to_string(),
  })
}

/// Monetary coercion: blanks count as zero, anything else must be numeric.
pub fn amount_from_cell(cell: &Data) -> Option<f64> {
  match cell {
    Data::Empty => Some(0.0),
    Data::Float(value) => Some(*value),
    Data::Int(value) => Some(*value as f64),
    Data::String(text) => {
      let trimmed = text.trim();
      if trimmed.is_empty() {
        Some(0.0)
      } else {
        trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
      }
    }
    _ => None,
  }
}

pub fn integer_from_cell(cell: &Data) -> Option<i64> {
  match cell {
    Data::Int(value) => Some(*value),
    Data::Float(value) if value.fract() == 0.0 && value.is_finite() => Some(*value as i64),
    Data::String(text) => text.trim().parse::<i64>().ok(),
    _ => None,
  }
}

pub fn text_from_cell(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(text) => text.clone(),
    Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", *value as i64),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_date_embedded_in_file_name() {
    let date = date_from_filename(Path::new("/tmp/exports/Detail_20230115_DSI.xlsx")).unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
  }

  #[test]
  fn reads_date_written_in_thai_digits() {
    let date = date_from_filename(Path::new("รายงาน_๒๐๒๓๐๑๑๕.xlsx")).unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
  }

  #[test]
  fn other_script_digits_do_not_count_as_a_date() {
    // Arabic-Indic digits
    let err = date_from_filename(Path::new("report_٢٠٢٣٠١١٥.xlsx")).unwrap_err();
    assert!(matches!(err, AppError::MissingDate(_)));
  }

  #[test]
  fn rejects_file_name_without_date() {
    let err = date_from_filename(Path::new("detail_jan.xlsx")).unwrap_err();
    assert!(matches!(err, AppError::MissingDate(_)));
  }

  #[test]
  fn rejects_impossible_calendar_date() {
    let err = date_from_filename(Path::new("20231345.xlsx")).unwrap_err();
    assert!(matches!(err, AppError::InvalidDate { .. }));
  }

  #[test]
  fn coerces_amounts() {
    assert_eq!(amount_from_cell(&Data::Empty), Some(0.0));
    assert_eq!(amount_from_cell(&Data::Int(1500)), Some(1500.0));
    assert_eq!(amount_from_cell(&Data::String(" 250.5 ".into())), Some(250.5));
    assert_eq!(amount_from_cell(&Data::String("n/a".into())), None);
    assert_eq!(amount_from_cell(&Data::Bool(true)), None);
  }

  #[test]
  fn numeric_registration_numbers_render_without_decimals() {
    assert_eq!(text_from_cell(&Data::Float(6409610001.0)), "6409610001");
    assert_eq!(integer_from_cell(&Data::Float(12240500161.0)), Some(12240500161));
    assert_eq!(integer_from_cell(&Data::Float(1.5)), None);
  }
}

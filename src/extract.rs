use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::domain::validation::{amount_from_cell, date_from_filename, file_label, integer_from_cell, text_from_cell};
use crate::error::AppError;
use crate::models::{AcademicTerm, Amounts, CohortKey, DailyExtract, TransactionRow};

pub const DETAIL_SHEET: &str = "Detail";
/// Header sits on the second row; the first carries the export title.
pub const HEADER_ROW: usize = 1;

pub const COL_CAMPUS: &str = "วิทยาเขต";
pub const COL_FACULTY: &str = "คณะ";
pub const COL_REGISTRATION: &str = "เลขทะเบียน";
pub const COL_RECEIPT: &str = "เลขที่ใบเสร็จ";
pub const COL_NAME: &str = "ชื่อ นามสกุล";
pub const COL_YEAR: &str = "ปีการศึกษา";
pub const COL_TERM: &str = "ภาค";
pub const COL_PROGRAM: &str = "รหัสหลักสูตร";
pub const COL_TUITION: &str = "รายได้คณะ";
pub const COL_FUND: &str = "กองทุนคณะ.1";
pub const COL_SPECIAL: &str = "รายได้คณะ.2";
pub const COL_TOTAL: &str = "รวม";

const MONEY_COLUMNS: [&str; 4] = [COL_TUITION, COL_FUND, COL_SPECIAL, COL_TOTAL];

struct Columns {
  campus: usize,
  faculty: usize,
  registration: usize,
  receipt: usize,
  name: usize,
  year: usize,
  term: usize,
  program: usize,
  money: [usize; 4],
}

impl Columns {
  fn locate(header: &[String], file: &str) -> Result<Self, AppError> {
    let index: HashMap<&str, usize> = header
      .iter()
      .enumerate()
      .map(|(idx, name)| (name.as_str(), idx))
      .collect();
    let find = |column: &str| {
      index.get(column).copied().ok_or_else(|| AppError::MissingColumn {
        file: file.to_string(),
        column: column.to_string(),
      })
    };
    Ok(Self {
      campus: find(COL_CAMPUS)?,
      faculty: find(COL_FACULTY)?,
      registration: find(COL_REGISTRATION)?,
      receipt: find(COL_RECEIPT)?,
      name: find(COL_NAME)?,
      year: find(COL_YEAR)?,
      term: find(COL_TERM)?,
      program: find(COL_PROGRAM)?,
      money: [
        find(COL_TUITION)?,
        find(COL_FUND)?,
        find(COL_SPECIAL)?,
        find(COL_TOTAL)?,
      ],
    })
  }
}

/// The n-th repeat of header `X` becomes `X.n` so repeated fee columns stay addressable.
pub fn dedupe_headers(raw: &[String]) -> Vec<String> {
  let mut seen: HashMap<String, usize> = HashMap::new();
  raw
    .iter()
    .map(|name| {
      let name = name.trim().to_string();
      let count = seen.entry(name.clone()).or_insert(0);
      let unique = if *count == 0 { name.clone() } else { format!("{name}.{count}") };
      *count += 1;
      unique
    })
    .collect()
}

/// First two characters of the trimmed registration number.
pub fn sub_code(registration_no: &str) -> String {
  registration_no.trim().chars().take(2).collect()
}

fn cell(row: &[Data], idx: usize) -> &Data {
  row.get(idx).unwrap_or(&Data::Empty)
}

fn is_blank(row: &[Data]) -> bool {
  row.iter().all(|value| match value {
    Data::Empty => true,
    Data::String(text) => text.trim().is_empty(),
    _ => false,
  })
}

fn required_integer(row: &[Data], idx: usize, column: &str, file: &str, row_no: usize) -> Result<i32, AppError> {
  let value = cell(row, idx);
  integer_from_cell(value)
    .and_then(|number| i32::try_from(number).ok())
    .ok_or_else(|| AppError::InvalidInteger {
      file: file.to_string(),
      row: row_no,
      column: column.to_string(),
      value: value.to_string(),
    })
}

/// Parses sheet rows (absolute positions, row 0 first) and keeps rows of `program_code`.
///
/// Monetary cells are coerced on every data row, retained or not; a single
/// non-numeric amount fails the file. Returns the number of data rows read
/// alongside the retained rows.
pub fn parse_detail_rows(rows: &[Vec<Data>], program_code: i64, file: &str) -> Result<(usize, Vec<TransactionRow>), AppError> {
  let header = rows.get(HEADER_ROW).ok_or_else(|| AppError::MissingColumn {
    file: file.to_string(),
    column: COL_PROGRAM.to_string(),
  })?;
  let header = dedupe_headers(&header.iter().map(text_from_cell).collect::<Vec<_>>());
  let cols = Columns::locate(&header, file)?;

  let mut read = 0;
  let mut retained = Vec::new();
  for (offset, row) in rows.iter().enumerate().skip(HEADER_ROW + 1) {
    if is_blank(row) {
      continue;
    }
    read += 1;
    // 1-based, as a spreadsheet user would count
    let row_no = offset + 1;

    let mut money = [0.0_f64; 4];
    for (slot, (idx, column)) in money.iter_mut().zip(cols.money.iter().zip(MONEY_COLUMNS)) {
      let value = cell(row, *idx);
      *slot = amount_from_cell(value).ok_or_else(|| AppError::InvalidNumber {
        file: file.to_string(),
        row: row_no,
        column: column.to_string(),
        value: value.to_string(),
      })?;
    }

    if integer_from_cell(cell(row, cols.program)) != Some(program_code) {
      continue;
    }

    let registration_no = text_from_cell(cell(row, cols.registration));
    let term = AcademicTerm {
      year: required_integer(row, cols.year, COL_YEAR, file, row_no)?,
      term: required_integer(row, cols.term, COL_TERM, file, row_no)?,
    };
    retained.push(TransactionRow {
      campus: text_from_cell(cell(row, cols.campus)),
      faculty: text_from_cell(cell(row, cols.faculty)),
      receipt_no: text_from_cell(cell(row, cols.receipt)),
      name: text_from_cell(cell(row, cols.name)),
      program_code,
      key: CohortKey {
        term,
        sub_code: sub_code(&registration_no),
      },
      registration_no,
      amounts: Amounts::new(money[0], money[1], money[2], money[3]),
    });
  }
  Ok((read, retained))
}

/// Reads one daily export and filters it to `program_code`.
pub fn extract_file(path: &Path, program_code: i64) -> Result<DailyExtract, AppError> {
  let file = file_label(path);
  let date = date_from_filename(path)?;

  let mut workbook = open_workbook_auto(path)?;
  if !workbook.sheet_names().iter().any(|name| name == DETAIL_SHEET) {
    return Err(AppError::MissingSheet {
      file,
      sheet: DETAIL_SHEET.to_string(),
    });
  }
  let range = workbook.worksheet_range(DETAIL_SHEET)?;

  // calamine ranges start at the first used cell; pad back to absolute positions.
  let (start_row, start_col) = range
    .start()
    .map(|(row, col)| (row as usize, col as usize))
    .unwrap_or((0, 0));
  let mut rows: Vec<Vec<Data>> = vec![Vec::new(); start_row];
  for row in range.rows() {
    let mut padded = vec![Data::Empty; start_col];
    padded.extend(row.iter().cloned());
    rows.push(padded);
  }

  let (rows_read, retained) = parse_detail_rows(&rows, program_code, &file)?;
  tracing::info!(file = %file, %date, rows_read, retained = retained.len(), "extracted daily export");
  Ok(DailyExtract {
    source: path.to_path_buf(),
    date,
    rows_read,
    rows: retained,
  })
}

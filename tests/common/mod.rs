#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::Workbook;
use uuid::Uuid;

use tuition_reconciliation::settings::{ProgramInfo, ProgramRegistry, ReportStyle};
use tuition_reconciliation::GenerateRequest;

pub const DSI: i64 = 12240500161;
pub const OTHER_PROGRAM: i64 = 12240500999;

pub struct Row {
  pub registration: &'static str,
  pub program: i64,
  pub year: i32,
  pub term: i32,
  pub tuition: f64,
  pub fund: f64,
  pub special: f64,
  pub total: f64,
}

pub fn row(registration: &'static str, tuition: f64, fund: f64, special: f64, total: f64) -> Row {
  Row {
    registration,
    program: DSI,
    year: 2566,
    term: 1,
    tuition,
    fund,
    special,
    total,
  }
}

pub fn temp_dir(prefix: &str) -> PathBuf {
  let dir = std::env::temp_dir().join(format!("{prefix}_{}_{}", std::process::id(), Uuid::new_v4()));
  fs::create_dir_all(&dir).expect("create temp dir");
  dir
}

const HEADER: [&str; 14] = [
  "วิทยาเขต",
  "คณะ",
  "เลขทะเบียน",
  "เลขที่ใบเสร็จ",
  "ชื่อ นามสกุล",
  "ปีการศึกษา",
  "ภาค",
  "รหัสหลักสูตร",
  "รายได้คณะ",
  "กองทุนคณะ",
  "กองทุนคณะ",
  "รายได้คณะ",
  "รายได้คณะ",
  "รวม",
];

/// Writes a daily export the way the finance system lays it out.
pub fn write_export(dir: &Path, file_name: &str, rows: &[Row]) -> PathBuf {
  let path = dir.join(file_name);
  let mut workbook = Workbook::new();
  let sheet = workbook.add_worksheet();
  sheet.set_name("Detail").unwrap();
  sheet.write_string(0, 0, "รายงานรายละเอียดการรับชำระ").unwrap();
  for (col, name) in HEADER.iter().enumerate() {
    sheet.write_string(1, col as u16, *name).unwrap();
  }
  for (idx, r) in rows.iter().enumerate() {
    let line = 2 + idx as u32;
    sheet.write_string(line, 0, "รังสิต").unwrap();
    sheet.write_string(line, 1, "วิทยาศาสตร์และเทคโนโลยี").unwrap();
    sheet.write_string(line, 2, r.registration).unwrap();
    sheet.write_string(line, 3, format!("RC{idx:05}")).unwrap();
    sheet.write_string(line, 4, format!("นักศึกษา {idx}")).unwrap();
    sheet.write_number(line, 5, r.year).unwrap();
    sheet.write_number(line, 6, r.term).unwrap();
    sheet.write_number(line, 7, r.program as f64).unwrap();
    sheet.write_number(line, 8, r.tuition).unwrap();
    sheet.write_number(line, 9, 0.0).unwrap();
    sheet.write_number(line, 10, r.fund).unwrap();
    sheet.write_number(line, 11, 0.0).unwrap();
    sheet.write_number(line, 12, r.special).unwrap();
    sheet.write_number(line, 13, r.total).unwrap();
  }
  workbook.save(&path).unwrap();
  path
}

pub fn dsi() -> ProgramInfo {
  ProgramRegistry::default().dsi
}

pub fn request(files: Vec<PathBuf>, output_path: PathBuf) -> GenerateRequest {
  GenerateRequest {
    files,
    output_path,
    program: dsi(),
    style: ReportStyle::default(),
  }
}

pub struct Output {
  path: PathBuf,
}

impl Output {
  pub fn open(path: &Path) -> Self {
    Self { path: path.to_path_buf() }
  }

  pub fn sheet_names(&self) -> Vec<String> {
    open_workbook_auto(&self.path).unwrap().sheet_names().to_owned()
  }

  pub fn sheet(&self, name: &str) -> Range<Data> {
    open_workbook_auto(&self.path).unwrap().worksheet_range(name).unwrap()
  }

  pub fn formula(&self, name: &str, row: u32, col: u32) -> String {
    open_workbook_auto(&self.path)
      .unwrap()
      .worksheet_formula(name)
      .unwrap()
      .get_value((row, col))
      .cloned()
      .unwrap_or_default()
  }
}

pub fn text(range: &Range<Data>, row: u32, col: u32) -> String {
  match range.get_value((row, col)) {
    Some(Data::String(value)) => value.clone(),
    Some(other) => other.to_string(),
    None => String::new(),
  }
}

pub fn number(range: &Range<Data>, row: u32, col: u32) -> f64 {
  match range.get_value((row, col)) {
    Some(Data::Float(value)) => *value,
    Some(Data::Int(value)) => *value as f64,
    other => panic!("expected number at ({row}, {col}), got {other:?}"),
  }
}

pub fn assert_close(a: f64, b: f64) {
  assert!((a - b).abs() < 1e-6, "{a} != {b}");
}

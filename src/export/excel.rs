use std::collections::HashSet;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Formula, Workbook, Worksheet};

use crate::domain::thai;
use crate::error::AppError;
use crate::models::{AcademicTerm, Amounts, DayStats, OverviewRow, ReportMonth};
use crate::reports::{self, DayGroup};
use crate::settings::ReportStyle;

/// Accounting format: thousands separators, dash for zero.
pub const ACCOUNTING: &str = r#"_-* #,##0.00_-;-* #,##0.00_-;_-* "-"??_-;_-@_-"#;

const DAILY_WIDTHS: [f64; 12] = [8.0, 12.0, 10.0, 10.0, 18.0, 7.0, 5.0, 10.0, 10.0, 10.0, 10.0, 10.0];
const OVERVIEW_WIDTHS: [f64; 7] = [15.0; 7];
const MONTHLY_WIDTHS: [f64; 6] = [50.0, 15.0, 15.0, 15.0, 15.0, 15.0];
const FEE_HEADER_HEIGHT: f64 = 90.0;
const COLUMN_HEADER_HEIGHT: f64 = 60.0;

const DAILY_COLUMNS: [&str; 12] = [
  "วิทยาเขต",
  "คณะ",
  "เลขทะเบียน",
  "เลขที่ใบเสร็จ",
  "ชื่อ นามสกุล",
  "ปีการศึกษา",
  "ภาค",
  "รายได้คณะ",
  "กองทุนคณะ",
  "รายได้คณะ",
  "รวม\nรายได้คณะ",
  "รวม\nค่าลงทะเบียน",
];

struct FeeColumn {
  code: &'static str,
  fill: u32,
  white_text: bool,
  boxed: bool,
}

/// Two-row coloured headers over the five money columns.
const FEE_COLUMNS: [FeeColumn; 5] = [
  FeeColumn {
    code: "18\r\nค่าหน่วยกิต",
    fill: 0xFFFF00,
    white_text: false,
    boxed: true,
  },
  FeeColumn {
    code: "01\nค่าธรรมเนียมเพื่อการศึกษาและพัฒนามหาวิทยาลัย",
    fill: 0xE2EFDA,
    white_text: false,
    boxed: true,
  },
  FeeColumn {
    code: "31 / 98\nค่าธรรมเนียมพิเศษ (อื่นๆ)",
    fill: 0xFFF2CC,
    white_text: false,
    boxed: true,
  },
  FeeColumn {
    code: "",
    fill: 0x92D050,
    white_text: false,
    boxed: false,
  },
  FeeColumn {
    code: "",
    fill: 0x8EA9DB,
    white_text: true,
    boxed: false,
  },
];

/// Cell formats for one workbook, all carrying the configured font.
pub struct SheetFormats {
  style: ReportStyle,
}

impl SheetFormats {
  pub fn new(style: &ReportStyle) -> Self {
    Self { style: style.clone() }
  }

  fn base(&self) -> Format {
    Format::new()
      .set_font_name(self.style.font_name.as_str())
      .set_font_size(self.style.font_size)
  }

  fn boxed(&self) -> Format {
    self.base().set_border(FormatBorder::Thin)
  }

  fn wrapped_cell(&self) -> Format {
    self.boxed().set_text_wrap()
  }

  fn money(&self) -> Format {
    self.boxed().set_num_format(ACCOUNTING).set_align(FormatAlign::Right)
  }

  fn bold_boxed(&self) -> Format {
    self.boxed().set_bold()
  }

  fn bold_money(&self) -> Format {
    self.money().set_bold()
  }

  fn centered_heading(&self) -> Format {
    self
      .bold_boxed()
      .set_align(FormatAlign::Center)
      .set_align(FormatAlign::VerticalCenter)
      .set_text_wrap()
  }

  /// Open-ended header cell: side borders plus top (first row) or bottom.
  fn header_edge(&self, top: bool) -> Format {
    let format = self
      .base()
      .set_border_left(FormatBorder::Thin)
      .set_border_right(FormatBorder::Thin);
    if top {
      format.set_border_top(FormatBorder::Thin)
    } else {
      format
        .set_border_bottom(FormatBorder::Thin)
        .set_bold()
        .set_align(FormatAlign::Center)
    }
  }

  fn fee_header(&self, column: &FeeColumn, top: bool) -> Format {
    let mut format = self
      .header_edge(top)
      .set_background_color(Color::RGB(column.fill))
      .set_align(FormatAlign::Center)
      .set_align(FormatAlign::VerticalCenter)
      .set_text_wrap();
    if column.boxed {
      format = format.set_border(FormatBorder::Thin).set_bold();
    }
    if column.white_text {
      format = format.set_font_color(Color::White).set_bold();
    }
    format
  }

  /// Subtotal rows close with a double rule.
  fn subtotal_label(&self) -> Format {
    self
      .bold_boxed()
      .set_border_bottom(FormatBorder::Double)
      .set_align(FormatAlign::Center)
  }

  fn subtotal_money(&self) -> Format {
    self.bold_money().set_border_bottom(FormatBorder::Double)
  }
}

/// Tracks sheet names in one workbook; repeats get a numeric suffix.
#[derive(Debug, Default)]
pub struct SheetNames {
  taken: HashSet<String>,
}

impl SheetNames {
  pub fn claim(&mut self, base: &str) -> String {
    let mut candidate = base.to_string();
    let mut counter = 1;
    while self.taken.contains(&candidate.to_lowercase()) {
      candidate = format!("{base}{counter}");
      counter += 1;
    }
    self.taken.insert(candidate.to_lowercase());
    candidate
  }
}

fn set_widths(sheet: &mut Worksheet, widths: &[f64]) -> Result<(), AppError> {
  for (col, width) in widths.iter().enumerate() {
    sheet.set_column_width(col as u16, *width)?;
  }
  Ok(())
}

fn write_amounts(sheet: &mut Worksheet, row: u32, first_col: u16, values: &[f64], format: &Format) -> Result<(), AppError> {
  for (offset, value) in values.iter().enumerate() {
    sheet.write_number_with_format(row, first_col + offset as u16, *value, format)?;
  }
  Ok(())
}

/// Title, program line, and the coloured two-row fee header starting at `fee_col`.
fn write_report_header(
  sheet: &mut Worksheet,
  formats: &SheetFormats,
  title: &str,
  program_name: &str,
  last_col: u16,
  fee_col: u16,
) -> Result<(), AppError> {
  sheet.merge_range(0, 0, 0, last_col, title, &formats.base())?;
  sheet.merge_range(1, 0, 1, last_col, program_name, &formats.base())?;
  sheet.set_row_height(2, FEE_HEADER_HEIGHT)?;
  sheet.set_row_height(3, COLUMN_HEADER_HEIGHT)?;

  for (offset, column) in FEE_COLUMNS.iter().enumerate() {
    let col = fee_col + offset as u16;
    let top = formats.fee_header(column, true);
    if column.code.is_empty() {
      sheet.write_blank(2, col, &top)?;
    } else {
      sheet.write_string_with_format(2, col, column.code, &top)?;
    }
  }
  Ok(())
}

/// One day's sheet for one (year, term) group. Returns the sheet name.
pub fn write_daily_sheet(
  workbook: &mut Workbook,
  names: &mut SheetNames,
  formats: &SheetFormats,
  group: &DayGroup,
  program_name: &str,
) -> Result<String, AppError> {
  let name = names.claim(&group.date.format("%d%m%Y").to_string());
  let sheet = workbook.add_worksheet();
  sheet.set_name(&name)?;
  set_widths(sheet, &DAILY_WIDTHS)?;

  let title = format!(
    "รายรับค่าจดทะเบียน {}/{} ณ วันที่ {}",
    group.term.term,
    group.term.year,
    thai::long_date(group.date)
  );
  write_report_header(sheet, formats, &title, program_name, 11, 7)?;

  let top = formats.header_edge(true);
  for col in 0..7 {
    sheet.write_blank(2, col, &top)?;
  }
  let bottom = formats.header_edge(false);
  for (col, label) in DAILY_COLUMNS.iter().enumerate() {
    let format = if col >= 7 {
      formats.fee_header(&FEE_COLUMNS[col - 7], false)
    } else {
      bottom.clone()
    };
    sheet.write_string_with_format(3, col as u16, *label, &format)?;
  }

  let cell = formats.boxed();
  let money = formats.money();
  let label = formats.subtotal_label();
  let subtotal = formats.subtotal_money();

  let mut row: u32 = 4;
  for band in &group.bands {
    for record in &band.rows {
      sheet.write_string_with_format(row, 0, &record.campus, &cell)?;
      sheet.write_string_with_format(row, 1, &record.faculty, &cell)?;
      sheet.write_string_with_format(row, 2, &record.registration_no, &cell)?;
      sheet.write_string_with_format(row, 3, &record.receipt_no, &cell)?;
      sheet.write_string_with_format(row, 4, &record.name, &cell)?;
      sheet.write_number_with_format(row, 5, f64::from(group.term.year), &cell)?;
      sheet.write_number_with_format(row, 6, f64::from(group.term.term), &cell)?;
      write_amounts(sheet, row, 7, &record.amounts.columns(), &money)?;
      row += 1;
    }
    sheet.merge_range(
      row,
      0,
      row,
      6,
      &reports::subtotal_label(&band.sub_code, band.rows.len()),
      &label,
    )?;
    write_amounts(sheet, row, 7, &band.totals.columns(), &subtotal)?;
    row += 1;
  }

  sheet.merge_range(row, 0, row, 6, &reports::day_total_label(group), &label)?;
  write_amounts(sheet, row, 7, &group.totals.columns(), &subtotal)?;

  tracing::debug!(sheet = %name, rows = group.count(), "wrote daily sheet");
  Ok(name)
}

/// Cross-day totals per sub-code for one (year, term).
pub fn write_overview_sheet(
  workbook: &mut Workbook,
  names: &mut SheetNames,
  formats: &SheetFormats,
  term: AcademicTerm,
  rows: &[OverviewRow],
) -> Result<String, AppError> {
  let name = names.claim(&format!("overview_{}_{}", term.year, term.term));
  let sheet = workbook.add_worksheet();
  sheet.set_name(&name)?;
  set_widths(sheet, &OVERVIEW_WIDTHS)?;

  let heading = formats.centered_heading();
  for (col, text) in ["รหัส", "จำนวน น.ศ. (คน)", "ค่าลงทะเบียน (บาท)"].iter().enumerate() {
    sheet.merge_range(0, col as u16, 1, col as u16, text, &heading)?;
  }
  sheet.merge_range(0, 3, 0, 6, "รายได้คณะ", &heading)?;
  let fee_labels = [
    "ค่าหน่วยกิต",
    "ค่าธรรมเนียมเพื่อการศึกษาฯ",
    "ค่าธรรมเนียมพิเศษ",
    "รวมเงินโอนเข้าคณะ",
  ];
  let sub_heading = formats.bold_boxed();
  for (offset, text) in fee_labels.iter().enumerate() {
    sheet.write_string_with_format(1, 3 + offset as u16, *text, &sub_heading)?;
  }

  let cell = formats.boxed();
  let money = formats.money();
  let mut row: u32 = 2;
  for entry in rows {
    sheet.write_string_with_format(row, 0, &entry.sub_code, &cell)?;
    sheet.write_number_with_format(row, 1, entry.count as f64, &cell)?;
    write_amounts(sheet, row, 2, &overview_columns(&entry.totals), &money)?;
    row += 1;
  }

  let (count, totals) = reports::overview_total(rows);
  sheet.write_string_with_format(row, 0, "รวมทั้งสิ้น", &formats.bold_boxed())?;
  sheet.write_number_with_format(row, 1, count as f64, &formats.bold_boxed())?;
  write_amounts(sheet, row, 2, &overview_columns(&totals), &formats.bold_money())?;

  tracing::debug!(sheet = %name, sub_codes = rows.len(), "wrote overview sheet");
  Ok(name)
}

/// Overview column order: total, then the three fees, then department income.
fn overview_columns(amounts: &Amounts) -> [f64; 5] {
  [
    amounts.total,
    amounts.tuition,
    amounts.faculty_fund,
    amounts.special_fee,
    amounts.department_income,
  ]
}

/// One row per input day and a live `SUM` row, for one (year, term).
pub fn write_monthly_sheet(
  workbook: &mut Workbook,
  names: &mut SheetNames,
  formats: &SheetFormats,
  term: AcademicTerm,
  days: &[&DayStats],
  month: &ReportMonth,
  program_name: &str,
) -> Result<String, AppError> {
  let month_name = thai::month_name(month.month);
  let name = names.claim(&format!("{}_{}_{}", month_name, term.year, term.term));
  let sheet = workbook.add_worksheet();
  sheet.set_name(&name)?;
  set_widths(sheet, &MONTHLY_WIDTHS)?;

  let title = format!(
    "รายรับค่าจดทะเบียน {}/{} ประจำเดือน {} {}",
    term.term,
    term.year,
    month_name,
    thai::buddhist_year(month.year)
  );
  write_report_header(sheet, formats, &title, program_name, 5, 1)?;
  sheet.merge_range(2, 0, 3, 0, "รวมจำนวนนักศึกษาของแต่ละวัน", &formats.centered_heading())?;
  for (offset, column) in FEE_COLUMNS.iter().enumerate() {
    sheet.write_string_with_format(3, 1 + offset as u16, DAILY_COLUMNS[7 + offset], &formats.fee_header(column, false))?;
  }

  let text = formats.wrapped_cell();
  let money = formats.money();
  let first_data_row: u32 = 4;
  let mut row = first_data_row;
  for day in days {
    sheet.write_string_with_format(row, 0, &reports::day_description(day), &text)?;
    write_amounts(sheet, row, 1, &day.totals.columns(), &money)?;
    row += 1;
  }

  let totals: Amounts = days.iter().map(|day| &day.totals).sum();
  let bold_text = formats.bold_boxed().set_text_wrap();
  let bold_money = formats.bold_money();
  sheet.write_string_with_format(row, 0, "รวม", &bold_text)?;
  // 1-based sheet rows: data spans first_data_row + 1 ..= row
  for (offset, value) in totals.columns().iter().enumerate() {
    let letter = (b'B' + offset as u8) as char;
    let formula = Formula::new(format!("=SUM({letter}{}:{letter}{})", first_data_row + 1, row)).set_result(value.to_string());
    sheet.write_formula_with_format(row, 1 + offset as u16, formula, &bold_money)?;
  }

  tracing::debug!(sheet = %name, days = days.len(), "wrote monthly sheet");
  Ok(name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn repeated_sheet_names_get_numeric_suffix() {
    let mut names = SheetNames::default();
    assert_eq!(names.claim("15012023"), "15012023");
    assert_eq!(names.claim("15012023"), "150120231");
    assert_eq!(names.claim("15012023"), "150120232");
    assert_eq!(names.claim("overview_2566_1"), "overview_2566_1");
  }

  #[test]
  fn overview_columns_lead_with_total() {
    let amounts = Amounts::new(1.0, 2.0, 3.0, 10.0);
    assert_eq!(overview_columns(&amounts), [10.0, 1.0, 2.0, 3.0, 6.0]);
  }
}

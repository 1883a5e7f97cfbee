use std::ops::{Add, AddAssign};
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

/// Academic year and term; identifies one report sheet.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcademicTerm {
  pub year: i32,
  pub term: i32,
}

/// (year, term, sub-code): one cohort within a day.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CohortKey {
  pub term: AcademicTerm,
  pub sub_code: String,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq)]
pub struct Amounts {
  /// Credit fee (code 18).
  pub tuition: f64,
  /// Education and university development fee (code 01).
  pub faculty_fund: f64,
  /// Special fee (codes 31 / 98).
  pub special_fee: f64,
  pub department_income: f64,
  pub total: f64,
}

impl Amounts {
  pub fn new(tuition: f64, faculty_fund: f64, special_fee: f64, total: f64) -> Self {
    Self {
      tuition,
      faculty_fund,
      special_fee,
      department_income: tuition + faculty_fund + special_fee,
      total,
    }
  }

  /// Values in daily sheet column order (H..L).
  pub fn columns(&self) -> [f64; 5] {
    [
      self.tuition,
      self.faculty_fund,
      self.special_fee,
      self.department_income,
      self.total,
    ]
  }
}

impl Add for Amounts {
  type Output = Amounts;

  fn add(self, rhs: Amounts) -> Amounts {
    Amounts {
      tuition: self.tuition + rhs.tuition,
      faculty_fund: self.faculty_fund + rhs.faculty_fund,
      special_fee: self.special_fee + rhs.special_fee,
      department_income: self.department_income + rhs.department_income,
      total: self.total + rhs.total,
    }
  }
}

impl AddAssign for Amounts {
  fn add_assign(&mut self, rhs: Amounts) {
    *self = *self + rhs;
  }
}

impl<'a> std::iter::Sum<&'a Amounts> for Amounts {
  fn sum<I: Iterator<Item = &'a Amounts>>(iter: I) -> Amounts {
    iter.fold(Amounts::default(), |acc, item| acc + *item)
  }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TransactionRow {
  pub campus: String,
  pub faculty: String,
  pub registration_no: String,
  pub receipt_no: String,
  pub name: String,
  pub program_code: i64,
  pub key: CohortKey,
  pub amounts: Amounts,
}

/// One input file after filtering to the target program.
#[derive(Debug, Clone)]
pub struct DailyExtract {
  pub source: PathBuf,
  pub date: NaiveDate,
  /// Rows read from the sheet before filtering.
  pub rows_read: usize,
  pub rows: Vec<TransactionRow>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CohortCount {
  pub sub_code: String,
  pub count: usize,
}

/// Per-day, per-(year, term) totals fed into the monthly report.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DayStats {
  pub term: AcademicTerm,
  pub date: NaiveDate,
  pub cohorts: Vec<CohortCount>,
  pub count: usize,
  pub totals: Amounts,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OverviewRow {
  pub sub_code: String,
  pub count: usize,
  pub totals: Amounts,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ReportMonth {
  pub year: i32,
  pub month: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportWarning {
  /// Input spans several months; the monthly sheets carry `labelled` only.
  MixedMonths {
    months: Vec<ReportMonth>,
    labelled: ReportMonth,
  },
  NoMatchingRows {
    file: String,
  },
}

impl std::fmt::Display for ReportWarning {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReportWarning::MixedMonths { months, labelled } => {
        let listed = months
          .iter()
          .map(|m| format!("{:02}/{}", m.month, m.year))
          .collect::<Vec<_>>()
          .join(", ");
        write!(
          f,
          "files contain data from different months ({listed}); monthly report labelled {:02}/{}",
          labelled.month, labelled.year
        )
      }
      ReportWarning::NoMatchingRows { file } => write!(f, "{file} has no rows for the selected program"),
    }
  }
}

#[derive(Debug, Serialize, Clone)]
pub struct GenerationSummary {
  pub output_path: PathBuf,
  pub program_code: i64,
  pub days: usize,
  pub rows_read: usize,
  pub retained_rows: usize,
  pub daily_sheets: Vec<String>,
  pub overview_sheets: Vec<String>,
  pub monthly_sheets: Vec<String>,
  pub report_month: Option<ReportMonth>,
  pub warnings: Vec<ReportWarning>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn department_income_is_sum_of_three_fees() {
    let amounts = Amounts::new(12000.0, 1500.25, 300.5, 20000.0);
    assert!((amounts.department_income - 13800.75).abs() < 1e-9);
    assert_eq!(amounts.columns()[4], 20000.0);
  }

  #[test]
  fn amounts_sum_field_by_field() {
    let rows = [Amounts::new(1.0, 2.0, 3.0, 10.0), Amounts::new(4.0, 5.0, 6.0, 20.0)];
    let total: Amounts = rows.iter().sum();
    assert_eq!(total.columns(), [5.0, 7.0, 9.0, 21.0, 30.0]);
  }
}

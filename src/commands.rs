use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use crate::domain::validation::file_label;
use crate::error::AppError;
use crate::export::excel::{self, SheetFormats, SheetNames};
use crate::extract;
use crate::models::{DailyExtract, DayStats, GenerationSummary, ReportWarning};
use crate::reports;
use crate::settings::{ProgramInfo, ReportStyle};

#[derive(Debug, Clone)]
pub struct GenerateRequest {
  pub files: Vec<PathBuf>,
  pub output_path: PathBuf,
  pub program: ProgramInfo,
  pub style: ReportStyle,
}

/// Drops repeated paths, keeping first occurrences in order.
pub fn unique_inputs(files: &[PathBuf]) -> Vec<PathBuf> {
  let mut seen = HashSet::new();
  files
    .iter()
    .filter(|path| seen.insert((*path).clone()))
    .cloned()
    .collect()
}

fn ensure_inputs_exist(files: &[PathBuf]) -> Result<(), AppError> {
  match files.iter().find(|path| !path.is_file()) {
    Some(missing) => Err(AppError::InputNotFound(missing.to_string_lossy().to_string())),
    None => Ok(()),
  }
}

fn collect_warnings(extracts: &[DailyExtract]) -> Vec<ReportWarning> {
  let mut warnings: Vec<ReportWarning> = extracts
    .iter()
    .filter(|extract| extract.rows.is_empty())
    .map(|extract| ReportWarning::NoMatchingRows {
      file: file_label(&extract.source),
    })
    .collect();

  let dates: Vec<_> = extracts.iter().map(|extract| extract.date).collect();
  let months = reports::distinct_months(&dates);
  if months.len() > 1 {
    if let Some(labelled) = reports::report_month(&dates) {
      warnings.push(ReportWarning::MixedMonths { months, labelled });
    }
  }
  warnings
}

/// Builds the full report workbook and saves it to `request.output_path`.
///
/// Every input is extracted and every sheet assembled before anything is
/// written, so a failure leaves no output file behind. An input set with no
/// rows for the program fails with [`AppError::NoMatchingRecords`].
pub fn generate_report(request: &GenerateRequest) -> Result<GenerationSummary, AppError> {
  let files = unique_inputs(&request.files);
  ensure_inputs_exist(&files)?;

  let extracts = files
    .iter()
    .map(|path| extract::extract_file(path, request.program.code))
    .collect::<Result<Vec<_>, _>>()?;

  let rows_read: usize = extracts.iter().map(|extract| extract.rows_read).sum();
  let retained_rows: usize = extracts.iter().map(|extract| extract.rows.len()).sum();
  if retained_rows == 0 {
    tracing::warn!(program = request.program.code, files = files.len(), rows_read, "no rows for program");
    return Err(AppError::NoMatchingRecords(request.program.code));
  }

  let warnings = collect_warnings(&extracts);
  for warning in &warnings {
    tracing::warn!("{warning}");
  }

  let dates: Vec<_> = extracts.iter().map(|extract| extract.date).collect();
  let report_month = reports::report_month(&dates);

  let formats = SheetFormats::new(&request.style);
  let mut names = SheetNames::default();
  let mut workbook = Workbook::new();

  let mut daily_sheets = Vec::new();
  let mut stats: Vec<DayStats> = Vec::new();
  for extract in &extracts {
    for group in reports::day_groups(extract) {
      daily_sheets.push(excel::write_daily_sheet(
        &mut workbook,
        &mut names,
        &formats,
        &group,
        &request.program.display_name,
      )?);
      stats.push(group.stats());
    }
  }

  let mut overview_sheets = Vec::new();
  for (term, rows) in reports::overview(&extracts) {
    overview_sheets.push(excel::write_overview_sheet(&mut workbook, &mut names, &formats, term, &rows)?);
  }

  let mut monthly_sheets = Vec::new();
  if let Some(month) = &report_month {
    for (term, days) in reports::monthly_groups(&stats) {
      monthly_sheets.push(excel::write_monthly_sheet(
        &mut workbook,
        &mut names,
        &formats,
        term,
        &days,
        month,
        &request.program.display_name,
      )?);
    }
  }

  save_workbook(&mut workbook, &request.output_path)?;
  tracing::info!(
    output = %request.output_path.display(),
    daily = daily_sheets.len(),
    overview = overview_sheets.len(),
    monthly = monthly_sheets.len(),
    "report saved"
  );

  Ok(GenerationSummary {
    output_path: request.output_path.clone(),
    program_code: request.program.code,
    days: extracts.len(),
    rows_read,
    retained_rows,
    daily_sheets,
    overview_sheets,
    monthly_sheets,
    report_month,
    warnings,
  })
}

fn save_workbook(workbook: &mut Workbook, path: &Path) -> Result<(), AppError> {
  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)?;
  }
  workbook.save(path)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unique_inputs_keep_first_occurrence_order() {
    let files = vec![
      PathBuf::from("b_20230120.xlsx"),
      PathBuf::from("a_20230115.xlsx"),
      PathBuf::from("b_20230120.xlsx"),
    ];
    assert_eq!(
      unique_inputs(&files),
      vec![PathBuf::from("b_20230120.xlsx"), PathBuf::from("a_20230115.xlsx")]
    );
  }

  #[test]
  fn missing_input_is_rejected_before_parsing() {
    let files = vec![PathBuf::from("/definitely/not/here/20230115.xlsx")];
    let err = ensure_inputs_exist(&files).unwrap_err();
    assert!(matches!(err, AppError::InputNotFound(_)));
  }
}

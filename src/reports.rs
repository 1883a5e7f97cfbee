use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use crate::domain::thai;
use crate::models::{
  AcademicTerm, Amounts, CohortCount, DailyExtract, DayStats, OverviewRow, ReportMonth, TransactionRow,
};

/// Rows of one sub-code within a day sheet.
#[derive(Debug, Clone)]
pub struct SubCodeBand<'a> {
  pub sub_code: String,
  pub rows: Vec<&'a TransactionRow>,
  pub totals: Amounts,
}

/// One (year, term) group of one day: one daily sheet.
#[derive(Debug, Clone)]
pub struct DayGroup<'a> {
  pub term: AcademicTerm,
  pub date: NaiveDate,
  pub bands: Vec<SubCodeBand<'a>>,
  pub totals: Amounts,
}

impl DayGroup<'_> {
  pub fn count(&self) -> usize {
    self.bands.iter().map(|band| band.rows.len()).sum()
  }

  pub fn sub_codes(&self) -> Vec<String> {
    self.bands.iter().map(|band| band.sub_code.clone()).collect()
  }

  pub fn stats(&self) -> DayStats {
    DayStats {
      term: self.term,
      date: self.date,
      cohorts: self
        .bands
        .iter()
        .map(|band| CohortCount {
          sub_code: band.sub_code.clone(),
          count: band.rows.len(),
        })
        .collect(),
      count: self.count(),
      totals: self.totals,
    }
  }
}

/// Groups a day's rows by (year, term), then sub-code, both sorted; row order kept.
pub fn day_groups(extract: &DailyExtract) -> Vec<DayGroup<'_>> {
  let mut grouped: BTreeMap<AcademicTerm, BTreeMap<&str, Vec<&TransactionRow>>> = BTreeMap::new();
  for row in &extract.rows {
    grouped
      .entry(row.key.term)
      .or_default()
      .entry(row.key.sub_code.as_str())
      .or_default()
      .push(row);
  }

  grouped
    .into_iter()
    .map(|(term, by_code)| {
      let bands: Vec<SubCodeBand> = by_code
        .into_iter()
        .map(|(sub_code, rows)| {
          let totals = rows.iter().map(|row| &row.amounts).sum();
          SubCodeBand {
            sub_code: sub_code.to_string(),
            rows,
            totals,
          }
        })
        .collect();
      let totals = bands.iter().flat_map(|band| band.rows.iter()).map(|row| &row.amounts).sum();
      DayGroup {
        term,
        date: extract.date,
        bands,
        totals,
      }
    })
    .collect()
}

/// Cross-day totals per (year, term) and sub-code.
pub fn overview(extracts: &[DailyExtract]) -> BTreeMap<AcademicTerm, Vec<OverviewRow>> {
  let mut grouped: BTreeMap<AcademicTerm, BTreeMap<&str, OverviewRow>> = BTreeMap::new();
  for row in extracts.iter().flat_map(|extract| extract.rows.iter()) {
    let entry = grouped
      .entry(row.key.term)
      .or_default()
      .entry(row.key.sub_code.as_str())
      .or_insert_with(|| OverviewRow {
        sub_code: row.key.sub_code.clone(),
        count: 0,
        totals: Amounts::default(),
      });
    entry.count += 1;
    entry.totals += row.amounts;
  }
  grouped
    .into_iter()
    .map(|(term, rows)| (term, rows.into_values().collect()))
    .collect()
}

pub fn overview_total(rows: &[OverviewRow]) -> (usize, Amounts) {
  let count = rows.iter().map(|row| row.count).sum();
  let totals = rows.iter().map(|row| &row.totals).sum();
  (count, totals)
}

/// Day stats grouped by (year, term) in order of first appearance.
pub fn monthly_groups(stats: &[DayStats]) -> Vec<(AcademicTerm, Vec<&DayStats>)> {
  let mut groups: Vec<(AcademicTerm, Vec<&DayStats>)> = Vec::new();
  for stat in stats {
    match groups.iter_mut().find(|(term, _)| *term == stat.term) {
      Some((_, days)) => days.push(stat),
      None => groups.push((stat.term, vec![stat])),
    }
  }
  groups
}

/// Month/year used to title the monthly sheets: that of the first input date.
pub fn report_month(dates: &[NaiveDate]) -> Option<ReportMonth> {
  dates.first().map(|date| ReportMonth {
    year: date.year(),
    month: date.month(),
  })
}

/// Distinct months across the input, sorted.
pub fn distinct_months(dates: &[NaiveDate]) -> Vec<ReportMonth> {
  dates
    .iter()
    .map(|date| (date.year(), date.month()))
    .collect::<BTreeSet<_>>()
    .into_iter()
    .map(|(year, month)| ReportMonth { year, month })
    .collect()
}

pub fn subtotal_label(sub_code: &str, count: usize) -> String {
  format!("รหัส {sub_code} จำนวน {count} คน")
}

pub fn day_total_label(group: &DayGroup) -> String {
  format!("รวม {} จำนวน {} คน", thai::join_and(&group.sub_codes()), group.count())
}

/// Monthly report row text for one day.
pub fn day_description(stat: &DayStats) -> String {
  let parts: Vec<String> = stat
    .cohorts
    .iter()
    .map(|cohort| format!("ยอดรวมรหัส {} จำนวนนศ. {} คน", cohort.sub_code, cohort.count))
    .collect();
  let head = if parts.len() == 1 {
    parts[0].clone()
  } else {
    format!("{}\n(รวมนศ.ทั้งหมด จำนวน {} คน)", thai::join_and(&parts), stat.count)
  };
  format!("{head}              วันที่ {}", thai::short_date(stat.date))
}

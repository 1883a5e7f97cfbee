use chrono::{Datelike, NaiveDate};

/// Buddhist Era = Gregorian + 543.
pub const BE_OFFSET: i32 = 543;

const MONTH_NAMES: [&str; 12] = [
  "มกราคม",
  "กุมภาพันธ์",
  "มีนาคม",
  "เมษายน",
  "พฤษภาคม",
  "มิถุนายน",
  "กรกฎาคม",
  "สิงหาคม",
  "กันยายน",
  "ตุลาคม",
  "พฤศจิกายน",
  "ธันวาคม",
];

pub fn month_name(month: u32) -> &'static str {
  match month {
    1..=12 => MONTH_NAMES[(month - 1) as usize],
    _ => "",
  }
}

pub fn buddhist_year(year: i32) -> i32 {
  year + BE_OFFSET
}

/// `15 มกราคม 2566`
pub fn long_date(date: NaiveDate) -> String {
  format!("{} {} {}", date.day(), month_name(date.month()), buddhist_year(date.year()))
}

/// `05/1/2566`: day zero-padded, month not.
pub fn short_date(date: NaiveDate) -> String {
  format!("{:02}/{}/{}", date.day(), date.month(), buddhist_year(date.year()))
}

/// `A`, `A และ B`, `A, B และ C`
pub fn join_and(items: &[String]) -> String {
  match items {
    [] => String::new(),
    [only] => only.clone(),
    [init @ .., last] => format!("{} และ {}", init.join(", "), last),
  }
}

//! Tuition transaction reconciliation reports.
//!
//! Reads daily `Detail` exports, keeps one program's rows, and writes a
//! workbook with per-day sheets, cross-day overview sheets, and a monthly
//! report per academic year and term.

pub mod commands;
pub mod domain;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod reports;
pub mod settings;

pub use commands::{generate_report, GenerateRequest};
pub use error::{AppError, ErrorKind};
pub use models::{GenerationSummary, ReportWarning};

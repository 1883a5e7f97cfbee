use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const APP_DIR: &str = "TuitionReconciliation";
const SETTINGS_FILE: &str = "settings.json";

/// Known programs. The registry has exactly one entry per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProgramKey {
  #[value(name = "DSI", alias = "dsi")]
  Dsi,
}

impl ProgramKey {
  pub const ALL: [ProgramKey; 1] = [ProgramKey::Dsi];

  pub fn label(&self) -> &'static str {
    match self {
      ProgramKey::Dsi => "DSI",
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProgramInfo {
  pub code: i64,
  pub campus: String,
  pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProgramRegistry {
  #[serde(rename = "DSI", default = "default_dsi")]
  pub dsi: ProgramInfo,
}

fn default_dsi() -> ProgramInfo {
  ProgramInfo {
    code: 12240500161,
    campus: "รังสิต".to_string(),
    display_name: "หลักสูตรวิทยาศาสตรบัณฑิต สาขาวิชาวิทยาศาสตร์และนวัตกรรมข้อมูล".to_string(),
  }
}

impl Default for ProgramRegistry {
  fn default() -> Self {
    Self { dsi: default_dsi() }
  }
}

impl ProgramRegistry {
  pub fn get(&self, key: ProgramKey) -> &ProgramInfo {
    match key {
      ProgramKey::Dsi => &self.dsi,
    }
  }

  pub fn validate(&self) -> Result<(), AppError> {
    for key in ProgramKey::ALL {
      let info = self.get(key);
      if info.code <= 0 {
        return Err(AppError::Config(format!("program {} has non-positive code {}", key.label(), info.code)));
      }
      if info.campus.trim().is_empty() {
        return Err(AppError::Config(format!("program {} has no campus", key.label())));
      }
      if info.display_name.trim().is_empty() {
        return Err(AppError::Config(format!("program {} has no display name", key.label())));
      }
    }
    Ok(())
  }
}

/// Font applied to every cell format of one generated workbook.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ReportStyle {
  pub font_name: String,
  pub font_size: f64,
}

impl Default for ReportStyle {
  fn default() -> Self {
    Self {
      font_name: "TH SarabunPSK".to_string(),
      font_size: 16.0,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
  pub programs: ProgramRegistry,
  pub style: ReportStyle,
}

impl Settings {
  pub fn validate(&self) -> Result<(), AppError> {
    self.programs.validate()?;
    if self.style.font_name.trim().is_empty() {
      return Err(AppError::Config("font name is empty".to_string()));
    }
    if !(1.0..=409.0).contains(&self.style.font_size) {
      return Err(AppError::Config(format!("font size {} out of range", self.style.font_size)));
    }
    Ok(())
  }
}

pub fn default_settings_path() -> Option<PathBuf> {
  dirs_next::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

pub fn parse_settings(text: &str) -> Result<Settings, AppError> {
  let settings: Settings = serde_json::from_str(text)?;
  settings.validate()?;
  Ok(settings)
}

/// An explicit path must exist; the default location is optional.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, AppError> {
  let path = match explicit {
    Some(path) => path.to_path_buf(),
    None => match default_settings_path().filter(|path| path.is_file()) {
      Some(path) => path,
      None => {
        tracing::debug!("no settings file, using built-in defaults");
        return Ok(Settings::default());
      }
    },
  };
  tracing::debug!(path = %path.display(), "loading settings");
  let text = fs::read_to_string(&path)?;
  parse_settings(&text)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    let settings = Settings::default();
    settings.validate().unwrap();
    assert_eq!(settings.programs.get(ProgramKey::Dsi).code, 12240500161);
    assert_eq!(settings.style.font_name, "TH SarabunPSK");
  }

  #[test]
  fn overrides_known_program() {
    let settings = parse_settings(
      r#"{ "programs": { "DSI": { "code": 99, "campus": "ท่าพระจันทร์", "display_name": "ทดสอบ" } } }"#,
    )
    .unwrap();
    assert_eq!(settings.programs.dsi.code, 99);
    assert_eq!(settings.style, ReportStyle::default());
  }

  #[test]
  fn rejects_unknown_program_key() {
    let err = parse_settings(r#"{ "programs": { "MBA": { "code": 1, "campus": "x", "display_name": "y" } } }"#)
      .unwrap_err();
    assert!(matches!(err, AppError::Json(_)));
  }

  #[test]
  fn rejects_invalid_program_code() {
    let err = parse_settings(r#"{ "programs": { "DSI": { "code": 0, "campus": "x", "display_name": "y" } } }"#)
      .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
  }
}

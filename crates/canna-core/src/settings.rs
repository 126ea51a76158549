//! Process-wide compliance settings and the partial patch used to update them.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{Error, Result, jurisdiction::Jurisdiction};

// ─── Cadence ─────────────────────────────────────────────────────────────────

/// How often something recurs: regulator reporting or scheduled export.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Cadence {
  Daily,
  Weekly,
  Monthly,
}

// ─── ExportFormat ────────────────────────────────────────────────────────────

/// An output format of the export codec.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
  Csv,
  Json,
  Xml,
  Pdf,
  Excel,
  Html,
}

impl ExportFormat {
  /// Parse a caller-supplied format token (case-insensitive).
  pub fn parse_token(token: &str) -> Result<Self> {
    token
      .trim()
      .parse()
      .map_err(|_| Error::UnsupportedFormat(token.to_owned()))
  }

  /// Import format for a file extension; only round-trippable formats
  /// qualify.
  pub fn from_extension(ext: &str) -> Option<Self> {
    Self::iter()
      .filter(|f| f.is_importable())
      .find(|f| f.extension().eq_ignore_ascii_case(ext))
  }

  pub fn extension(self) -> &'static str {
    match self {
      Self::Csv => "csv",
      Self::Json => "json",
      Self::Xml => "xml",
      Self::Pdf => "pdf",
      Self::Excel => "xls",
      Self::Html => "html",
    }
  }

  pub fn mime_type(self) -> &'static str {
    match self {
      Self::Csv => "text/csv",
      Self::Json => "application/json",
      Self::Xml => "application/xml",
      Self::Pdf => "application/pdf",
      Self::Excel => "application/vnd.ms-excel",
      Self::Html => "text/html",
    }
  }

  /// Whether files in this format can be imported back.
  pub fn is_importable(self) -> bool {
    matches!(self, Self::Csv | Self::Json | Self::Xml)
  }
}

// ─── ComplianceSettings ──────────────────────────────────────────────────────

/// Business identity, export preferences and feature toggles.
///
/// Persisted as a whole document; a stored document missing newer fields
/// picks up their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceSettings {
  #[serde(alias = "province")]
  pub jurisdiction:             Jurisdiction,
  pub business_name:            String,
  pub license_number:           String,
  pub location:                 String,
  /// Years logs must be kept. Informational; nothing is deleted.
  pub retention_period:         u32,
  pub auto_export:              bool,
  pub export_format:            ExportFormat,
  pub export_schedule:          Cadence,
  /// Look-ahead window, in days, for deadline notifications.
  pub notify_days:              u32,
  pub enable_audit_trail:       bool,
  pub track_employee_activity:  bool,
  pub track_waste_management:   bool,
  pub track_deliveries:         bool,
  pub enable_recall_management: bool,
}

impl Default for ComplianceSettings {
  fn default() -> Self {
    Self {
      jurisdiction:             Jurisdiction::default(),
      business_name:            "CannaFlow Dispensary".to_owned(),
      license_number:           "SAMPLE-LICENSE-123".to_owned(),
      location:                 "123 Main Street, Vancouver, BC".to_owned(),
      retention_period:         7,
      auto_export:              false,
      export_format:            ExportFormat::Csv,
      export_schedule:          Cadence::Weekly,
      notify_days:              7,
      enable_audit_trail:       true,
      track_employee_activity:  true,
      track_waste_management:   true,
      track_deliveries:         false,
      enable_recall_management: true,
    }
  }
}

impl ComplianceSettings {
  /// Merge `patch` over `self`; fields absent from the patch keep their
  /// current value.
  pub fn apply(mut self, patch: SettingsPatch) -> Self {
    macro_rules! merge {
      ($($field:ident),* $(,)?) => {
        $(if let Some(v) = patch.$field { self.$field = v; })*
      };
    }
    merge!(
      jurisdiction,
      business_name,
      license_number,
      location,
      retention_period,
      auto_export,
      export_format,
      export_schedule,
      notify_days,
      enable_audit_trail,
      track_employee_activity,
      track_waste_management,
      track_deliveries,
      enable_recall_management,
    );
    self
  }
}

/// A partial update to [`ComplianceSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
  #[serde(alias = "province")]
  pub jurisdiction:             Option<Jurisdiction>,
  pub business_name:            Option<String>,
  pub license_number:           Option<String>,
  pub location:                 Option<String>,
  pub retention_period:         Option<u32>,
  pub auto_export:              Option<bool>,
  pub export_format:            Option<ExportFormat>,
  pub export_schedule:          Option<Cadence>,
  pub notify_days:              Option<u32>,
  pub enable_audit_trail:       Option<bool>,
  pub track_employee_activity:  Option<bool>,
  pub track_waste_management:   Option<bool>,
  pub track_deliveries:         Option<bool>,
  pub enable_recall_management: Option<bool>,
}

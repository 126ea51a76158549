//! Multi-format export/import codec for compliance logs.
//!
//! Converts between log entries and self-contained documents. Pure and
//! synchronous: bytes in, bytes out. File handling belongs to the caller.
//!
//! CSV, JSON and XML round-trip; HTML, PDF and Excel are human-readable
//! reports that keep only a fixed set of columns per log type.
//!
//! # Quick start
//!
//! ```no_run
//! use canna_codec::{export, import};
//! use canna_core::settings::{ComplianceSettings, ExportFormat};
//!
//! let settings = ComplianceSettings::default();
//! let bytes = export(ExportFormat::Json, &[], &settings, chrono::Utc::now()).unwrap();
//! let entries = import(ExportFormat::Json, &bytes).unwrap();
//! assert!(entries.is_empty());
//! ```

mod columns;
mod csv;
mod excel;
mod html;
mod json;
mod pdf;
mod record;
mod report;
mod xml;

pub mod error;

use canna_core::{
  log::LogEntry,
  settings::{ComplianceSettings, ExportFormat},
};
use chrono::{DateTime, Utc};
pub use error::{Error, Result};

use crate::report::Report;

/// Encode `entries` as one document in `format`. `settings` and
/// `generated_at` feed the header of the report formats.
pub fn export(
  format: ExportFormat,
  entries: &[LogEntry],
  settings: &ComplianceSettings,
  generated_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
  match format {
    ExportFormat::Csv => csv::export(entries),
    ExportFormat::Json => json::export(entries),
    ExportFormat::Xml => xml::export(entries),
    ExportFormat::Html => Ok(html::export(&Report::build(entries, settings, generated_at))),
    ExportFormat::Pdf => Ok(pdf::export(&Report::build(entries, settings, generated_at))),
    ExportFormat::Excel => excel::export(&Report::build(entries, settings, generated_at)),
  }
}

/// Decode a document previously written by [`export`]. Only CSV, JSON and
/// XML can be read back.
pub fn import(format: ExportFormat, bytes: &[u8]) -> Result<Vec<LogEntry>> {
  match format {
    ExportFormat::Csv => csv::import(bytes),
    ExportFormat::Json => json::import(bytes),
    ExportFormat::Xml => xml::import(bytes),
    other => Err(Error::NotImportable(other)),
  }
}

#[cfg(test)]
mod roundtrip_tests {
  use std::collections::HashSet;

  use canna_core::{
    log::LogType,
    value::{DataValue, LogData},
  };
  use chrono::{Duration, TimeZone};
  use serde_json::json;

  use super::*;

  fn sample() -> Vec<LogEntry> {
    let settings = ComplianceSettings::default();
    let at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
    let mut sale = LogData::new();
    sale.insert("productCategory".into(), "Flower".into());
    sale.insert("quantity".into(), 3.5.into());
    sale.insert("total".into(), 42_i64.into());
    sale.insert("basket".into(), json!([{ "sku": "007", "qty": 1 }]).into());
    sale.insert("note".into(), DataValue::Null);
    sale.insert("productSKU".into(), "00123".into());

    vec![
      LogEntry::record(LogType::Sale, sale, &settings, at),
      LogEntry::record(LogType::Audit, LogData::new(), &settings, at + Duration::seconds(1)),
    ]
  }

  #[test]
  fn json_is_lossless() {
    let entries = sample();
    let settings = ComplianceSettings::default();
    let bytes = export(ExportFormat::Json, &entries, &settings, Utc::now()).unwrap();
    let back = import(ExportFormat::Json, &bytes).unwrap();

    // Set equality on the identifying fields and payload.
    let key = |e: &LogEntry| (e.id.clone(), e.log_type, e.timestamp, serde_json::to_string(&e.data).unwrap());
    let original: HashSet<_> = entries.iter().map(key).collect();
    let restored: HashSet<_> = back.iter().map(key).collect();
    assert_eq!(original, restored);
    // Even numeric-looking strings survive.
    assert_eq!(back[0].data["productSKU"], DataValue::from("00123"));
  }

  #[test]
  fn flat_formats_lose_string_fidelity() {
    let entries = sample();
    let settings = ComplianceSettings::default();
    for format in [ExportFormat::Csv, ExportFormat::Xml] {
      let bytes = export(format, &entries, &settings, Utc::now()).unwrap();
      let back = import(format, &bytes).unwrap();
      assert_eq!(back.len(), 2, "{format}");
      assert_eq!(back[0].data["basket"], entries[0].data["basket"], "{format}");
      // A SKU with leading zeros comes back as a number.
      assert_eq!(back[0].data["productSKU"], DataValue::from(123_i64), "{format}");
      assert!(!back[0].data.contains_key("note"), "{format}");
    }
  }

  #[test]
  fn report_formats_are_not_importable() {
    for format in [ExportFormat::Html, ExportFormat::Pdf, ExportFormat::Excel] {
      assert!(matches!(import(format, b""), Err(Error::NotImportable(f)) if f == format));
    }
  }

  #[test]
  fn every_format_exports_the_sample() {
    let settings = ComplianceSettings::default();
    for format in [
      ExportFormat::Csv,
      ExportFormat::Json,
      ExportFormat::Xml,
      ExportFormat::Html,
      ExportFormat::Pdf,
      ExportFormat::Excel,
    ] {
      let bytes = export(format, &sample(), &settings, Utc::now()).unwrap();
      assert!(!bytes.is_empty(), "{format}");
    }
  }
}

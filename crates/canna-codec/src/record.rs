//! Rebuilding log entries from the flat text of CSV and XML documents.

use canna_core::{
  log::{LogEntry, LogType, timestamp},
  value::{DataValue, LogData},
};

use crate::{Error, Result};

/// The seven core columns/elements, in export order.
pub const CORE_FIELDS: [&str; 7] = [
  "id",
  "type",
  "timestamp",
  "jurisdiction",
  "businessName",
  "licenseNumber",
  "location",
];

/// Core fields as read from a flat document, before validation.
#[derive(Debug, Default)]
pub struct RawRecord {
  pub id:             Option<String>,
  pub log_type:       Option<String>,
  pub timestamp:      Option<String>,
  pub jurisdiction:   Option<String>,
  pub business_name:  Option<String>,
  pub license_number: Option<String>,
  pub location:       Option<String>,
  pub data:           LogData,
}

impl RawRecord {
  /// Assign a core field by its document name. Returns `false` for names
  /// that are not core fields. `province` is the legacy name for
  /// `jurisdiction`.
  pub fn set_core(&mut self, name: &str, value: String) -> bool {
    let slot = match name {
      "id" => &mut self.id,
      "type" => &mut self.log_type,
      "timestamp" => &mut self.timestamp,
      "jurisdiction" | "province" => &mut self.jurisdiction,
      "businessName" => &mut self.business_name,
      "licenseNumber" => &mut self.license_number,
      "location" => &mut self.location,
      _ => return false,
    };
    *slot = Some(value);
    true
  }

  /// Validate the core fields. `record` is the 1-based position used in
  /// error messages.
  pub fn into_entry(self, record: usize) -> Result<LogEntry> {
    let required = |value: Option<String>, field: &'static str| {
      value
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingField { record, field })
    };

    let id = required(self.id, "id")?;
    let log_type = LogType::parse_token(&required(self.log_type, "type")?)
      .map_err(|source| Error::Record { record, source })?;
    let raw_ts = required(self.timestamp, "timestamp")?;
    let timestamp = timestamp::parse(&raw_ts)
      .map_err(|_| Error::InvalidTimestamp { record, value: raw_ts })?;

    Ok(LogEntry {
      id,
      log_type,
      timestamp,
      jurisdiction: self.jurisdiction.unwrap_or_default(),
      business_name: self.business_name.unwrap_or_default(),
      license_number: self.license_number.unwrap_or_default(),
      location: self.location.unwrap_or_default(),
      data: self.data,
    })
  }
}

// ─── Value inference ─────────────────────────────────────────────────────────

/// Recover a typed value from flat text: JSON for `{`/`[` prefixes that parse,
/// then numbers matching `-?digits(.digits)?`, then `true`/`false`, else the
/// text itself.
pub fn infer_value(text: &str) -> DataValue {
  if text.starts_with('{') || text.starts_with('[') {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
      return value.into();
    }
  }

  if looks_numeric(text) {
    let parsed = if text.contains('.') {
      text.parse::<f64>().ok().map(DataValue::from)
    } else {
      text
        .parse::<i64>()
        .map(DataValue::from)
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(DataValue::from))
    };
    if let Some(value) = parsed {
      return value;
    }
  }

  match text {
    "true" => DataValue::Bool(true),
    "false" => DataValue::Bool(false),
    _ => DataValue::String(text.to_owned()),
  }
}

fn looks_numeric(text: &str) -> bool {
  let digits = text.strip_prefix('-').unwrap_or(text);
  let (whole, frac) = match digits.split_once('.') {
    Some((whole, frac)) => (whole, Some(frac)),
    None => (digits, None),
  };
  let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
  all_digits(whole) && frac.is_none_or(all_digits)
}

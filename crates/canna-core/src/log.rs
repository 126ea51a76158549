//! Log entries: the unit of record in the compliance ledger.
//!
//! An entry is immutable once appended. Corrections are made by appending a
//! new entry; nothing in this crate offers a way to edit one in place.

use chrono::{DateTime, SubsecRound, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result, settings::ComplianceSettings, value::LogData};

// ─── LogType ─────────────────────────────────────────────────────────────────

/// The kind of business event an entry records.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogType {
  Sale,
  Inventory,
  CashFloat,
  DailySummary,
  Audit,
  Employee,
  Waste,
  Delivery,
  Recall,
}

impl LogType {
  /// Parse a type token such as `"cash_float"`.
  pub fn parse_token(token: &str) -> Result<Self> {
    token
      .parse()
      .map_err(|_| Error::UnknownLogType(token.to_owned()))
  }

  /// Title-cased label used in report headings, e.g. `"Cash Float"`.
  pub fn readable(self) -> String {
    let token: &'static str = self.into();
    token
      .split('_')
      .map(|word| {
        let mut chars = word.chars();
        match chars.next() {
          Some(first) => first.to_uppercase().chain(chars).collect(),
          None => String::new(),
        }
      })
      .collect::<Vec<String>>()
      .join(" ")
  }
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Entry timestamps are UTC with millisecond precision and serialise as
/// `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub mod timestamp {
  use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
  }

  /// Parse any RFC 3339 timestamp, normalising to UTC milliseconds.
  pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s.trim())
      .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(3))
  }

  pub fn serialize<S: Serializer>(
    dt: &DateTime<Utc>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(dt))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(D::Error::custom)
  }
}

// ─── LogEntry ────────────────────────────────────────────────────────────────

/// One immutable compliance event.
///
/// The business identity fields are a snapshot of the settings that were
/// active when the entry was created; they are never looked up again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
  pub id:             String,
  #[serde(rename = "type")]
  pub log_type:       LogType,
  #[serde(with = "timestamp")]
  pub timestamp:      DateTime<Utc>,
  /// Jurisdiction code at creation time. Files written by older builds call
  /// this field `province`.
  #[serde(default, alias = "province")]
  pub jurisdiction:   String,
  #[serde(default)]
  pub business_name:  String,
  #[serde(default)]
  pub license_number: String,
  #[serde(default)]
  pub location:       String,
  #[serde(default)]
  pub data:           LogData,
}

impl LogEntry {
  /// Build a fresh entry stamped with a new id, `now`, and the identity
  /// fields of `settings`. Validation is the caller's concern.
  pub fn record(
    log_type: LogType,
    data: LogData,
    settings: &ComplianceSettings,
    now: DateTime<Utc>,
  ) -> Self {
    let timestamp = now.trunc_subsecs(3);
    Self {
      id: generate_log_id(timestamp),
      log_type,
      timestamp,
      jurisdiction: settings.jurisdiction.to_string(),
      business_name: settings.business_name.clone(),
      license_number: settings.license_number.clone(),
      location: settings.location.clone(),
      data,
    }
  }
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `log_<unix-millis>_<8 random base-36 chars>`.
pub fn generate_log_id(now: DateTime<Utc>) -> String {
  let mut n = OsRng.next_u64();
  let suffix: String = (0..8)
    .map(|_| {
      let c = BASE36[(n % 36) as usize] as char;
      n /= 36;
      c
    })
    .collect();
  format!("log_{}_{suffix}", now.timestamp_millis())
}

// ─── LogFilter ───────────────────────────────────────────────────────────────

/// Selection criteria for a log query. Every criterion is optional; an empty
/// filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
  /// Exact type match.
  #[serde(default, rename = "type")]
  pub log_type:   Option<LogType>,
  /// Inclusive lower bound on `timestamp`.
  #[serde(default)]
  pub start_date: Option<DateTime<Utc>>,
  /// Inclusive upper bound on `timestamp`.
  #[serde(default)]
  pub end_date:   Option<DateTime<Utc>>,
}

impl LogFilter {
  pub fn of_type(log_type: LogType) -> Self {
    Self { log_type: Some(log_type), ..Self::default() }
  }

  pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    Self {
      start_date: Some(start),
      end_date: Some(end),
      ..Self::default()
    }
  }

  pub fn since(start: DateTime<Utc>) -> Self {
    Self { start_date: Some(start), ..Self::default() }
  }

  pub fn matches(&self, entry: &LogEntry) -> bool {
    self.log_type.is_none_or(|t| t == entry.log_type)
      && self.start_date.is_none_or(|start| entry.timestamp >= start)
      && self.end_date.is_none_or(|end| entry.timestamp <= end)
  }
}

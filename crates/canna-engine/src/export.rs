//! Export file naming, digests and the auto-export schedule.

use std::path::PathBuf;

use canna_core::{
  log::{LogType, timestamp},
  settings::{Cadence, ExportFormat},
};
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Handle to a file written by an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
  pub path:        PathBuf,
  pub format:      ExportFormat,
  pub mime_type:   &'static str,
  pub entry_count: usize,
  /// Hex SHA-256 of the bytes written.
  pub sha256:      String,
}

/// `<business-name>-logs[-<type>]-<timestamp>.<ext>`, with whitespace runs in
/// the business name replaced by `-` and the timestamp's `:` and `.` by `-`.
pub fn file_name(
  business_name: &str,
  log_type: Option<LogType>,
  format: ExportFormat,
  now: DateTime<Utc>,
) -> String {
  let mut business = String::with_capacity(business_name.len());
  let mut in_space = false;
  for c in business_name.chars() {
    if c.is_whitespace() {
      if !in_space {
        business.push('-');
      }
      in_space = true;
    } else {
      // Path separators would escape the export directory.
      business.push(if matches!(c, '/' | '\\') { '-' } else { c });
      in_space = false;
    }
  }

  let stamp = timestamp::format(&now).replace([':', '.'], "-");
  let type_part = log_type.map(|t| format!("-{t}")).unwrap_or_default();
  format!("{business}-logs{type_part}-{stamp}.{}", format.extension())
}

pub fn digest(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

/// Whether a scheduled export runs on `today`: every day, Sundays, or the
/// first of the month.
pub fn export_due(schedule: Cadence, today: NaiveDate) -> bool {
  match schedule {
    Cadence::Daily => true,
    Cadence::Weekly => today.weekday() == Weekday::Sun,
    Cadence::Monthly => today.day() == 1,
  }
}

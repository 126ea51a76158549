//! The layout shared by the human-readable formats (HTML, PDF, Excel): a
//! header block, one section per log type, and a retention footer.

use canna_core::{
  log::{LogEntry, LogType},
  settings::ComplianceSettings,
};
use chrono::{DateTime, Utc};

use crate::columns::{Cell, columns_for};

pub const TITLE: &str = "CannaFlow Compliance Logs";

pub const NOTICE: &str = "This is an official compliance report generated by \
                          CannaFlow POS. It contains sensitive information and \
                          should be handled according to your jurisdiction's \
                          cannabis regulations.";

const DATE_TIME: &str = "Date/Time";

/// Render a timestamp for a report cell.
pub fn display_time(at: &DateTime<Utc>) -> String {
  at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub struct Section {
  pub log_type: LogType,
  /// e.g. `"Cash Float Logs (3)"`.
  pub title:    String,
  pub headers:  Vec<&'static str>,
  pub rows:     Vec<Vec<Cell>>,
}

pub struct Report {
  /// `(label, value)` pairs shown under the title.
  pub header:   Vec<(&'static str, String)>,
  pub sections: Vec<Section>,
  pub footer:   String,
}

impl Report {
  pub fn build(
    entries: &[LogEntry],
    settings: &ComplianceSettings,
    generated_at: DateTime<Utc>,
  ) -> Self {
    let header = vec![
      ("Business", settings.business_name.clone()),
      ("License Number", settings.license_number.clone()),
      ("Location", settings.location.clone()),
      ("Jurisdiction", settings.jurisdiction.name().to_owned()),
      ("Generated", display_time(&generated_at)),
    ];

    Self {
      header,
      sections: group_by_type(entries).into_iter().map(section).collect(),
      footer: format!("Retention period: {} years", settings.retention_period),
    }
  }
}

/// Entries grouped by type, groups in first-seen order.
fn group_by_type(entries: &[LogEntry]) -> Vec<(LogType, Vec<&LogEntry>)> {
  let mut groups: Vec<(LogType, Vec<&LogEntry>)> = Vec::new();
  for entry in entries {
    match groups.iter_mut().find(|(t, _)| *t == entry.log_type) {
      Some((_, group)) => group.push(entry),
      None => groups.push((entry.log_type, vec![entry])),
    }
  }
  groups
}

fn section((log_type, entries): (LogType, Vec<&LogEntry>)) -> Section {
  let columns = columns_for(log_type);
  let headers = std::iter::once(DATE_TIME)
    .chain(columns.iter().map(|c| c.label))
    .collect();
  let rows = entries
    .iter()
    .map(|entry| {
      std::iter::once(Cell::Text(display_time(&entry.timestamp)))
        .chain(columns.iter().map(|c| c.cell(entry)))
        .collect()
    })
    .collect();

  Section {
    log_type,
    title: format!("{} Logs ({})", log_type.readable(), entries.len()),
    headers,
    rows,
  }
}

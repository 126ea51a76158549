//! CSV: seven core columns followed by one `data.<key>` column per distinct
//! data key, in first-seen order.

use canna_core::log::{LogEntry, timestamp};
use tracing::warn;

use crate::{
  Error,
  Result,
  record::{CORE_FIELDS, RawRecord, infer_value},
};

const DATA_PREFIX: &str = "data.";

/// Distinct data keys across `entries`, in the order they are first seen.
fn data_keys(entries: &[LogEntry]) -> Vec<&str> {
  let mut keys: Vec<&str> = Vec::new();
  for entry in entries {
    for key in entry.data.keys() {
      if !keys.contains(&key.as_str()) {
        keys.push(key);
      }
    }
  }
  keys
}

pub fn export(entries: &[LogEntry]) -> Result<Vec<u8>> {
  let keys = data_keys(entries);
  let mut writer = csv::Writer::from_writer(Vec::new());

  let header = CORE_FIELDS
    .iter()
    .map(|f| (*f).to_owned())
    .chain(keys.iter().map(|k| format!("{DATA_PREFIX}{k}")));
  writer.write_record(header)?;

  for entry in entries {
    let core = [
      entry.id.clone(),
      entry.log_type.to_string(),
      timestamp::format(&entry.timestamp),
      entry.jurisdiction.clone(),
      entry.business_name.clone(),
      entry.license_number.clone(),
      entry.location.clone(),
    ];
    let data = keys
      .iter()
      .map(|k| entry.data.get(*k).map(|v| v.to_text()).unwrap_or_default());
    writer.write_record(core.into_iter().chain(data))?;
  }

  writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

pub fn import(bytes: &[u8]) -> Result<Vec<LogEntry>> {
  let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
  let headers = reader.headers()?.clone();

  for required in ["id", "type", "timestamp"] {
    if !headers.iter().any(|h| h == required) {
      return Err(Error::MissingColumn(required));
    }
  }

  let mut entries = Vec::new();
  for (index, row) in reader.records().enumerate() {
    let row = row?;
    // Header is line 1.
    let line = index + 2;
    if row.len() != headers.len() {
      warn!(line, expected = headers.len(), found = row.len(), "skipping CSV row: column count mismatch");
      continue;
    }

    let mut raw = RawRecord::default();
    for (header, cell) in headers.iter().zip(row.iter()) {
      if let Some(key) = header.strip_prefix(DATA_PREFIX) {
        if !cell.is_empty() {
          raw.data.insert(key.to_owned(), infer_value(cell));
        }
      } else {
        raw.set_core(header, cell.to_owned());
      }
    }
    entries.push(raw.into_entry(index + 1)?);
  }
  Ok(entries)
}

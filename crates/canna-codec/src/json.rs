//! JSON: the lossless format. A pretty-printed array of entries.

use canna_core::log::LogEntry;

use crate::Result;

pub fn export(entries: &[LogEntry]) -> Result<Vec<u8>> {
  Ok(serde_json::to_vec_pretty(entries)?)
}

pub fn import(bytes: &[u8]) -> Result<Vec<LogEntry>> {
  Ok(serde_json::from_slice(bytes)?)
}

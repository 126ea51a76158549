//! Conversions between domain values and the JSON text stored in the
//! `documents` table, plus the raw row helpers shared by every query.

use canna_core::{log::LogEntry, settings::ComplianceSettings};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, Transaction};

use crate::{
  Error,
  Result,
  schema::{LOGS_KEY, SETTINGS_KEY},
};

// ─── Documents ───────────────────────────────────────────────────────────────

pub fn encode_log(entries: &[LogEntry]) -> Result<String> {
  Ok(serde_json::to_string(entries)?)
}

/// A missing document reads as an empty log.
pub fn decode_log(body: Option<&str>) -> Result<Vec<LogEntry>> {
  match body {
    None => Ok(Vec::new()),
    Some(body) => serde_json::from_str(body)
      .map_err(|source| Error::Corrupt { key: LOGS_KEY, source }),
  }
}

pub fn encode_settings(settings: &ComplianceSettings) -> Result<String> {
  Ok(serde_json::to_string(settings)?)
}

pub fn decode_settings(body: &str) -> Result<ComplianceSettings> {
  serde_json::from_str(body)
    .map_err(|source| Error::Corrupt { key: SETTINGS_KEY, source })
}

// ─── Rows ────────────────────────────────────────────────────────────────────

pub fn read_document(
  tx: &Transaction<'_>,
  key: &str,
) -> rusqlite::Result<Option<String>> {
  tx.query_row(
    "SELECT body FROM documents WHERE key = ?1",
    rusqlite::params![key],
    |row| row.get(0),
  )
  .optional()
}

pub fn write_document(
  tx: &Transaction<'_>,
  key: &str,
  body: &str,
) -> rusqlite::Result<()> {
  let now = Utc::now().to_rfc3339();
  tx.execute(
    "INSERT INTO documents (key, body, updated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT(key) DO UPDATE SET body = excluded.body,
                                    updated_at = excluded.updated_at",
    rusqlite::params![key, body, now],
  )?;
  Ok(())
}

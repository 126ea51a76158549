//! [`SqliteStore`] — the SQLite implementation of [`LogStore`].

use std::{collections::HashSet, path::Path};

use canna_core::{
  log::{LogEntry, LogFilter},
  settings::ComplianceSettings,
  store::LogStore,
};
use tracing::debug;

use crate::{
  Error,
  Result,
  encode::{
    decode_log,
    decode_settings,
    encode_log,
    encode_settings,
    read_document,
    write_document,
  },
  schema::{LOGS_KEY, SCHEMA, SETTINGS_KEY},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A compliance log store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every call
/// runs on the connection's single worker thread, so each read-modify-write
/// below is both transactional and serialised with respect to other calls.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read the log document.
  async fn load_log(&self) -> Result<Vec<LogEntry>> {
    let body: Option<String> = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        Ok(read_document(&tx, LOGS_KEY)?)
      })
      .await?;
    decode_log(body.as_deref())
  }

  /// Apply `change` to the log document inside one transaction. The document
  /// is rewritten only if `change` succeeds; otherwise the transaction is
  /// rolled back and the stored document is untouched.
  async fn modify_log<T, F>(&self, change: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut Vec<LogEntry>) -> Result<T> + Send + 'static,
  {
    let outcome: Result<T> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let body = read_document(&tx, LOGS_KEY)?;

        let applied = decode_log(body.as_deref()).and_then(|mut entries| {
          let value = change(&mut entries)?;
          Ok((encode_log(&entries)?, value))
        });

        Ok(match applied {
          Ok((body, value)) => {
            write_document(&tx, LOGS_KEY, &body)?;
            tx.commit()?;
            Ok(value)
          }
          Err(e) => Err(e),
        })
      })
      .await?;
    outcome
  }
}

// ─── LogStore impl ───────────────────────────────────────────────────────────

impl LogStore for SqliteStore {
  type Error = Error;

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn load_settings(&self) -> Result<Option<ComplianceSettings>> {
    let body: Option<String> = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        Ok(read_document(&tx, SETTINGS_KEY)?)
      })
      .await?;
    body.as_deref().map(decode_settings).transpose()
  }

  async fn save_settings(&self, settings: &ComplianceSettings) -> Result<()> {
    let body = encode_settings(settings)?;
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_document(&tx, SETTINGS_KEY, &body)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Log document ──────────────────────────────────────────────────────────

  async fn ensure_log(&self) -> Result<()> {
    let empty = encode_log(&[])?;
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if read_document(&tx, LOGS_KEY)?.is_none() {
          write_document(&tx, LOGS_KEY, &empty)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn append(&self, entry: &LogEntry) -> Result<()> {
    let entry = entry.clone();
    self
      .modify_log(move |entries| {
        if entries.iter().any(|e| e.id == entry.id) {
          return Err(Error::DuplicateId(entry.id));
        }
        entries.push(entry);
        Ok(())
      })
      .await
  }

  async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
    let mut entries = self.load_log().await?;
    entries.retain(|e| filter.matches(e));
    debug!(matched = entries.len(), ?filter, "queried compliance log");
    Ok(entries)
  }

  async fn merge(&self, incoming: Vec<LogEntry>) -> Result<Vec<LogEntry>> {
    self
      .modify_log(move |entries| {
        let mut seen: HashSet<String> =
          entries.iter().map(|e| e.id.clone()).collect();
        let added: Vec<LogEntry> = incoming
          .into_iter()
          .filter(|e| seen.insert(e.id.clone()))
          .collect();
        entries.extend(added.iter().cloned());
        Ok(added)
      })
      .await
  }

  /// Overwrites without reading, so a corrupt document can still be reset.
  async fn clear(&self) -> Result<()> {
    let empty = encode_log(&[])?;
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_document(&tx, LOGS_KEY, &empty)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self) -> Result<usize> {
    Ok(self.load_log().await?.len())
  }
}

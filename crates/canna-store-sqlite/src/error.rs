//! Error type for `canna-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("corrupt {key} document: {source}")]
  Corrupt {
    key:    &'static str,
    source: serde_json::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Appending an entry whose id is already stored.
  #[error("log entry {0} already exists")]
  DuplicateId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

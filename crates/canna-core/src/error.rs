//! Error types for `canna-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required fields for {jurisdiction}: {}", fields.join(", "))]
  MissingFields {
    jurisdiction: String,
    /// Missing field names, in the jurisdiction's `requiredFields` order.
    fields:       Vec<String>,
  },

  #[error("unknown log type: {0:?}")]
  UnknownLogType(String),

  #[error("unsupported format: {0:?}")]
  UnsupportedFormat(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error types for the canna-codec crate.

use canna_core::settings::ExportFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} files cannot be imported")]
  NotImportable(ExportFormat),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("XML error: {0}")]
  Xml(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("CSV header has no {0:?} column")]
  MissingColumn(&'static str),

  #[error("record {record}: missing {field}")]
  MissingField { record: usize, field: &'static str },

  #[error("record {record}: invalid timestamp {value:?}")]
  InvalidTimestamp { record: usize, value: String },

  #[error("record {record}: {source}")]
  Record {
    record: usize,
    source: canna_core::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn xml_err(e: impl std::fmt::Display) -> Error { Error::Xml(e.to_string()) }

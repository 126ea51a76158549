//! Error types for the compliance engine.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A sale is missing fields its jurisdiction requires. Nothing was
  /// written.
  #[error("missing required fields for {jurisdiction}: {}", fields.join(", "))]
  Validation {
    jurisdiction: String,
    fields:       Vec<String>,
  },

  #[error("export failed: {0}")]
  Export(#[from] ExportError),

  #[error("import failed: {0}")]
  Import(#[from] ImportError),

  #[error("unsupported format: {0:?}")]
  UnsupportedFormat(String),

  #[error("unknown log type: {0:?}")]
  UnknownLogType(String),

  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("no logs to export")]
  Empty,

  #[error("encoding failed: {0}")]
  Encode(#[source] canna_codec::Error),

  #[error("could not write export file: {0}")]
  Io(#[source] std::io::Error),

  #[error("writing the export file took longer than {0:?}")]
  TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum ImportError {
  #[error("cannot import files with extension {0:?}")]
  UnsupportedExtension(String),

  #[error("could not decode import file: {0}")]
  Decode(#[source] canna_codec::Error),

  #[error("could not read import file: {0}")]
  Io(#[source] std::io::Error),

  #[error("{} is outside the export directory", .0.display())]
  OutsideExportDir(PathBuf),

  #[error("reading the import file took longer than {0:?}")]
  TimedOut(Duration),
}

impl From<canna_core::Error> for Error {
  fn from(e: canna_core::Error) -> Self {
    match e {
      canna_core::Error::MissingFields { jurisdiction, fields } => {
        Error::Validation { jurisdiction, fields }
      }
      canna_core::Error::UnknownLogType(t) => Error::UnknownLogType(t),
      canna_core::Error::UnsupportedFormat(f) => Error::UnsupportedFormat(f),
      e @ canna_core::Error::Serialization(_) => Error::Persistence(Box::new(e)),
    }
  }
}

/// Box a backend error for [`Error::Persistence`].
pub(crate) fn persistence<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Persistence(Box::new(e))
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use canna_engine::{ExportError, ImportError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Engine(#[from] canna_engine::Error),
}

impl From<canna_core::Error> for ApiError {
  fn from(e: canna_core::Error) -> Self { ApiError::Engine(e.into()) }
}

impl ApiError {
  fn status(&self) -> StatusCode {
    use canna_engine::Error as E;
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Engine(e) => match e {
        E::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        E::UnsupportedFormat(_) | E::UnknownLogType(_) => StatusCode::BAD_REQUEST,
        E::Export(ExportError::Empty) => StatusCode::NOT_FOUND,
        E::Export(ExportError::TimedOut(_)) | E::Import(ImportError::TimedOut(_)) => {
          StatusCode::GATEWAY_TIMEOUT
        }
        E::Import(ImportError::UnsupportedExtension(_) | ImportError::Decode(_)) => {
          StatusCode::BAD_REQUEST
        }
        E::Import(ImportError::OutsideExportDir(_)) => StatusCode::FORBIDDEN,
        E::Import(ImportError::Io(io)) if io.kind() == std::io::ErrorKind::NotFound => {
          StatusCode::NOT_FOUND
        }
        E::Export(_) | E::Import(_) | E::Persistence(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      ApiError::Engine(canna_engine::Error::Validation { fields, .. }) => {
        json!({ "error": self.to_string(), "missingFields": fields })
      }
      _ => json!({ "error": self.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}

//! Handlers for `/exports` and `/imports`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/exports` | Body: `{"format":"csv"}` plus optional filter fields; 201 + file handle |
//! | `POST` | `/imports` | Body: `{"path":"..."}` of a CSV, JSON or XML export inside the export directory; relative paths resolve against it |

use std::path::PathBuf;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use canna_core::{log::LogEntry, settings::ExportFormat, store::LogStore};
use serde::{Deserialize, Serialize};

use crate::{Shared, error::ApiError, logs::FilterParams};

#[derive(Debug, Deserialize)]
pub struct ExportBody {
  pub format: String,
  #[serde(flatten)]
  pub filter: FilterParams,
}

/// `POST /exports`
pub async fn export<S: LogStore>(
  State(engine): State<Shared<S>>,
  Json(body): Json<ExportBody>,
) -> Result<impl IntoResponse, ApiError> {
  let format = ExportFormat::parse_token(&body.format)?;
  let filter = body.filter.into_filter()?;
  let file = engine.export_logs(format, &filter).await?;
  Ok((StatusCode::CREATED, Json(file)))
}

#[derive(Debug, Deserialize)]
pub struct ImportBody {
  pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
  pub added:   usize,
  pub entries: Vec<LogEntry>,
}

/// `POST /imports` — only entries with unseen ids are added.
pub async fn import<S: LogStore>(
  State(engine): State<Shared<S>>,
  Json(body): Json<ImportBody>,
) -> Result<Json<ImportSummary>, ApiError> {
  let path = engine.resolve_export_path(&body.path).await?;
  let entries = engine.import_logs(&path).await?;
  Ok(Json(ImportSummary { added: entries.len(), entries }))
}

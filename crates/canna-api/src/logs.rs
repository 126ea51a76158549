//! Handlers for `/logs`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/logs` | Optional `type`, `startDate`, `endDate` (inclusive) |
//! | `POST`   | `/logs` | Body: [`NewLogBody`]; returns 201 + stored entry |
//! | `DELETE` | `/logs` | Clears the whole log; 204 |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use canna_core::{
  log::{LogEntry, LogFilter, LogType},
  store::LogStore,
  value::LogData,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{Shared, error::ApiError};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Query-string or body form of a [`LogFilter`]. The type is taken as a raw
/// token so an unknown one gets a JSON error rather than a bare rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
  #[serde(rename = "type")]
  pub log_type:   Option<String>,
  pub start_date: Option<DateTime<Utc>>,
  pub end_date:   Option<DateTime<Utc>>,
}

impl FilterParams {
  pub fn into_filter(self) -> Result<LogFilter, ApiError> {
    let log_type = self
      .log_type
      .as_deref()
      .map(LogType::parse_token)
      .transpose()?;
    Ok(LogFilter {
      log_type,
      start_date: self.start_date,
      end_date: self.end_date,
    })
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /logs[?type=...][&startDate=...][&endDate=...]`
pub async fn list<S: LogStore>(
  State(engine): State<Shared<S>>,
  Query(params): Query<FilterParams>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
  let filter = params.into_filter()?;
  Ok(Json(engine.logs(&filter).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewLogBody {
  #[serde(rename = "type")]
  pub log_type: String,
  #[serde(default)]
  pub data:     LogData,
}

/// `POST /logs` — 422 with `missingFields` when a sale is incomplete.
pub async fn create<S: LogStore>(
  State(engine): State<Shared<S>>,
  Json(body): Json<NewLogBody>,
) -> Result<impl IntoResponse, ApiError> {
  let log_type = LogType::parse_token(&body.log_type)?;
  let entry = engine.add_log(log_type, body.data).await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Clear ───────────────────────────────────────────────────────────────────

/// `DELETE /logs`
pub async fn clear<S: LogStore>(
  State(engine): State<Shared<S>>,
) -> Result<StatusCode, ApiError> {
  engine.clear_logs().await?;
  Ok(StatusCode::NO_CONTENT)
}

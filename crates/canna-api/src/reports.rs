//! Dashboard handlers: statistics, compliance status, deadlines and daily
//! summaries.

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use canna_core::{
  jurisdiction::ComplianceDeadline,
  report::Stats,
  store::LogStore,
  validate::ComplianceStatusReport,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::{Shared, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
  pub start_date: Option<DateTime<Utc>>,
  pub end_date:   Option<DateTime<Utc>>,
}

/// `GET /stats[?startDate=...][&endDate=...]`
pub async fn stats<S: LogStore>(
  State(engine): State<Shared<S>>,
  Query(range): Query<RangeParams>,
) -> Result<Json<Stats>, ApiError> {
  Ok(Json(engine.stats(range.start_date, range.end_date).await?))
}

/// `GET /status`
pub async fn status<S: LogStore>(
  State(engine): State<Shared<S>>,
) -> Result<Json<ComplianceStatusReport>, ApiError> {
  Ok(Json(engine.check_status().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeadlineParams {
  /// Look-ahead in days. Defaults to the `notifyDays` setting.
  pub days: Option<u32>,
}

/// `GET /deadlines[?days=N]`
pub async fn deadlines<S: LogStore>(
  State(engine): State<Shared<S>>,
  Query(params): Query<DeadlineParams>,
) -> Json<Vec<ComplianceDeadline>> {
  let days = match params.days {
    Some(days) => days,
    None => engine.settings().await.notify_days,
  };
  Json(engine.upcoming_deadlines(days).await)
}

#[derive(Debug, Deserialize)]
pub struct SummaryBody {
  pub date: NaiveDate,
}

/// `POST /summaries` — body: `{"date":"2025-01-15"}`; returns 201 + the
/// recorded `daily_summary` entry.
pub async fn summary<S: LogStore>(
  State(engine): State<Shared<S>>,
  Json(body): Json<SummaryBody>,
) -> Result<impl IntoResponse, ApiError> {
  let entry = engine.daily_summary(body.date).await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

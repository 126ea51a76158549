//! Handlers for `/settings`.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/settings` | Active settings |
//! | `PATCH` | `/settings` | Body: any subset of the settings fields |

use axum::{Json, extract::State};
use canna_core::{
  settings::{ComplianceSettings, SettingsPatch},
  store::LogStore,
};

use crate::{Shared, error::ApiError};

/// `GET /settings`
pub async fn show<S: LogStore>(
  State(engine): State<Shared<S>>,
) -> Json<ComplianceSettings> {
  Json(engine.settings().await)
}

/// `PATCH /settings` — returns the merged, persisted settings.
pub async fn update<S: LogStore>(
  State(engine): State<Shared<S>>,
  Json(patch): Json<SettingsPatch>,
) -> Result<Json<ComplianceSettings>, ApiError> {
  Ok(Json(engine.update_settings(patch).await?))
}

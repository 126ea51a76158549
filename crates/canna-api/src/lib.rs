//! JSON REST API for the CannaFlow compliance engine.
//!
//! Exposes an axum [`Router`] backed by a shared
//! [`ComplianceEngine`](canna_engine::ComplianceEngine) over any
//! [`canna_core::store::LogStore`]. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", canna_api::api_router(engine.clone()))
//! ```

pub mod error;
pub mod logs;
pub mod pos;
pub mod reports;
pub mod settings;
pub mod transfer;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use canna_core::store::LogStore;
use canna_engine::ComplianceEngine;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Handler state: the engine every route operates on.
pub type Shared<S> = Arc<ComplianceEngine<S>>;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Shared<S>) -> Router<()>
where
  S: LogStore + 'static,
{
  Router::new()
    // Settings
    .route("/settings", get(settings::show::<S>).patch(settings::update::<S>))
    // Logs
    .route(
      "/logs",
      get(logs::list::<S>).post(logs::create::<S>).delete(logs::clear::<S>),
    )
    // Reports
    .route("/stats", get(reports::stats::<S>))
    .route("/status", get(reports::status::<S>))
    .route("/deadlines", get(reports::deadlines::<S>))
    .route("/summaries", post(reports::summary::<S>))
    // Files
    .route("/exports", post(transfer::export::<S>))
    .route("/imports", post(transfer::import::<S>))
    // Point of sale
    .route("/purchase-check", post(pos::purchase_check::<S>))
    .route("/tax", get(pos::tax::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(engine)
}

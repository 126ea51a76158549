//! The `LogStore` trait.
//!
//! Implemented by storage backends (e.g. `canna-store-sqlite`). The engine
//! depends on this abstraction, not on any concrete backend.
//!
//! A backend keeps two whole documents: the settings object and the ordered
//! array of log entries. Every mutating method is a single atomic
//! read-modify-write of the log document; a failed call leaves the previously
//! persisted document untouched.

use std::future::Future;

use crate::{
  log::{LogEntry, LogFilter},
  settings::ComplianceSettings,
};

/// Abstraction over a compliance log backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Settings ──────────────────────────────────────────────────────────

  /// Load the persisted settings document, or `None` if none was ever saved.
  fn load_settings(
    &self,
  ) -> impl Future<Output = Result<Option<ComplianceSettings>, Self::Error>>
  + Send
  + '_;

  /// Replace the persisted settings document.
  fn save_settings<'a>(
    &'a self,
    settings: &'a ComplianceSettings,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Log document ──────────────────────────────────────────────────────

  /// Create an empty log document if none exists. Idempotent.
  fn ensure_log(&self)
  -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append one entry. Fails if an entry with the same id is already
  /// stored.
  fn append<'a>(
    &'a self,
    entry: &'a LogEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Entries matching `filter`, in insertion order.
  fn query<'a>(
    &'a self,
    filter: &'a LogFilter,
  ) -> impl Future<Output = Result<Vec<LogEntry>, Self::Error>> + Send + 'a;

  /// Append every entry whose id is not already stored (nor earlier in
  /// `incoming`), preserving ids and timestamps. Returns the entries that
  /// were added, in input order.
  fn merge(
    &self,
    incoming: Vec<LogEntry>,
  ) -> impl Future<Output = Result<Vec<LogEntry>, Self::Error>> + Send + '_;

  /// Replace the log document with an empty one.
  fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Number of stored entries.
  fn count(&self)
  -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

//! The CannaFlow compliance engine.
//!
//! [`ComplianceEngine`] is the boundary every caller goes through: it owns
//! the active [`ComplianceSettings`](canna_core::settings::ComplianceSettings),
//! validates and records events through any
//! [`LogStore`](canna_core::store::LogStore), and writes and reads export
//! files with bounded I/O.
//!
//! ```rust,ignore
//! let engine = ComplianceEngine::new(SqliteStore::open(path).await?, EngineConfig::default());
//! engine.init().await?;
//! engine.add_log(LogType::Audit, LogData::new()).await?;
//! ```

mod engine;
pub mod error;
pub mod export;

#[cfg(test)]
mod tests;

pub use engine::{ComplianceEngine, EngineConfig};
pub use error::{Error, ExportError, ImportError, Result};
pub use export::ExportedFile;

//! [`ComplianceEngine`]: settings, the log store and the codec behind one
//! handle.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use canna_core::{
  jurisdiction::{ComplianceDeadline, rules},
  limits::{self, BasketLine, LimitBreach},
  log::{LogEntry, LogFilter, LogType},
  report::{DailySummary, Stats, aggregate_stats, day_bounds},
  settings::{ComplianceSettings, ExportFormat, SettingsPatch},
  store::LogStore,
  validate::{
    ComplianceStatusReport,
    compute_status,
    deadlines_within,
    ensure_sale_complete,
    period_start,
  },
  value::LogData,
};
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
  error::{ExportError, ImportError, Result, persistence},
  export::{self, ExportedFile},
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Directory export files are written into. Created on first export.
  pub export_dir: PathBuf,
  /// Upper bound on each export write or import read.
  pub io_timeout: Duration,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      export_dir: PathBuf::from("exports"),
      io_timeout: Duration::from_secs(30),
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The compliance engine.
///
/// Owns the active settings. Mutations of the log (append, merge, clear) and
/// settings updates hold `gate` for writing; queries and exports hold it for
/// reading, so an export never observes a half-applied merge.
pub struct ComplianceEngine<S: LogStore> {
  store:    S,
  config:   EngineConfig,
  settings: RwLock<ComplianceSettings>,
  gate:     RwLock<()>,
}

impl<S: LogStore> ComplianceEngine<S> {
  /// Wrap `store`. Call [`init`](Self::init) before use to pick up persisted
  /// settings.
  pub fn new(store: S, config: EngineConfig) -> Self {
    Self {
      store,
      config,
      settings: RwLock::new(ComplianceSettings::default()),
      gate: RwLock::new(()),
    }
  }

  pub fn config(&self) -> &EngineConfig { &self.config }

  pub fn store(&self) -> &S { &self.store }

  /// Load persisted settings, or persist the defaults if there are none, and
  /// make sure the log document exists.
  pub async fn init(&self) -> Result<ComplianceSettings> {
    let _guard = self.gate.write().await;

    let settings = match self.store.load_settings().await.map_err(persistence)? {
      Some(stored) => stored,
      None => {
        let defaults = ComplianceSettings::default();
        self.store.save_settings(&defaults).await.map_err(persistence)?;
        defaults
      }
    };
    self.store.ensure_log().await.map_err(persistence)?;

    info!(
      jurisdiction = %settings.jurisdiction,
      business = %settings.business_name,
      "compliance engine initialised"
    );
    *self.settings.write().await = settings.clone();
    Ok(settings)
  }

  /// A snapshot of the active settings.
  pub async fn settings(&self) -> ComplianceSettings {
    self.settings.read().await.clone()
  }

  /// Merge `patch` into the active settings and persist the result. The
  /// in-memory settings change only once the write succeeded.
  pub async fn update_settings(&self, patch: SettingsPatch) -> Result<ComplianceSettings> {
    let _guard = self.gate.write().await;

    let next = self.settings().await.apply(patch);
    self.store.save_settings(&next).await.map_err(persistence)?;
    *self.settings.write().await = next.clone();

    info!(jurisdiction = %next.jurisdiction, "settings updated");
    Ok(next)
  }

  // ── Logging ─────────────────────────────────────────────────────────────

  pub async fn add_log(&self, log_type: LogType, data: LogData) -> Result<LogEntry> {
    self.add_log_at(log_type, data, Utc::now()).await
  }

  /// Record an event stamped `now`.
  ///
  /// Sales are checked against the jurisdiction's required fields first; a
  /// rejected sale writes nothing. A scheduled export may follow a
  /// successful append; its failure is logged and does not fail the call.
  pub async fn add_log_at(
    &self,
    log_type: LogType,
    data: LogData,
    now: DateTime<Utc>,
  ) -> Result<LogEntry> {
    let entry = {
      let _guard = self.gate.write().await;
      let settings = self.settings().await;

      if log_type == LogType::Sale
        && let Err(e) = ensure_sale_complete(&data, rules(settings.jurisdiction))
      {
        warn!(error = %e, "rejected incomplete sale");
        return Err(e.into());
      }

      let entry = LogEntry::record(log_type, data, &settings, now);
      self.store.append(&entry).await.map_err(persistence)?;
      info!(id = %entry.id, log_type = %entry.log_type, "log appended");
      entry
    };

    self.auto_export(now).await;
    Ok(entry)
  }

  async fn auto_export(&self, now: DateTime<Utc>) {
    let settings = self.settings().await;
    if !settings.auto_export
      || !export::export_due(settings.export_schedule, now.date_naive())
    {
      return;
    }

    match self
      .export_logs_at(settings.export_format, &LogFilter::default(), now)
      .await
    {
      Ok(file) => info!(path = %file.path.display(), "auto-export written"),
      Err(e) => warn!(error = %e, "auto-export failed"),
    }
  }

  // ── Queries ─────────────────────────────────────────────────────────────

  /// Entries matching `filter`, in insertion order.
  pub async fn logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
    let _guard = self.gate.read().await;
    let entries = self.store.query(filter).await.map_err(persistence)?;
    debug!(count = entries.len(), ?filter, "logs queried");
    Ok(entries)
  }

  /// Sales statistics over entries in `[start, end]`; either bound may be
  /// open.
  pub async fn stats(
    &self,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
  ) -> Result<Stats> {
    let filter = LogFilter { start_date: start, end_date: end, ..LogFilter::default() };
    Ok(aggregate_stats(&self.logs(&filter).await?))
  }

  pub async fn check_status(&self) -> Result<ComplianceStatusReport> {
    self.check_status_at(Utc::now()).await
  }

  /// Compliance status for the reporting period containing `now`.
  pub async fn check_status_at(&self, now: DateTime<Utc>) -> Result<ComplianceStatusReport> {
    let settings = self.settings().await;
    let cadence = rules(settings.jurisdiction).sales_reporting_frequency;
    let since = LogFilter::since(period_start(cadence, now));
    let entries = self.logs(&since).await?;
    Ok(compute_status(&settings, &entries, now))
  }

  /// Deadlines for the active jurisdiction within `days_ahead` of today.
  pub async fn upcoming_deadlines(&self, days_ahead: u32) -> Vec<ComplianceDeadline> {
    let jurisdiction = self.settings.read().await.jurisdiction;
    deadlines_within(jurisdiction, days_ahead, Utc::now().date_naive())
  }

  /// Summarise `date` and record the summary as a `daily_summary` entry.
  pub async fn daily_summary(&self, date: NaiveDate) -> Result<LogEntry> {
    let (start, end) = day_bounds(date);
    let day = self.logs(&LogFilter::between(start, end)).await?;
    let summary = DailySummary::compute(date, &day);
    let data = summary.to_data().map_err(canna_core::Error::from)?;
    self.add_log(LogType::DailySummary, data).await
  }

  // ── Export / import ─────────────────────────────────────────────────────

  pub async fn export_logs(
    &self,
    format: ExportFormat,
    filter: &LogFilter,
  ) -> Result<ExportedFile> {
    self.export_logs_at(format, filter, Utc::now()).await
  }

  /// Write the entries matching `filter` to a new file in the export
  /// directory.
  pub async fn export_logs_at(
    &self,
    format: ExportFormat,
    filter: &LogFilter,
    now: DateTime<Utc>,
  ) -> Result<ExportedFile> {
    let settings = self.settings().await;
    let (bytes, entry_count) = {
      let _guard = self.gate.read().await;
      let entries = self.store.query(filter).await.map_err(persistence)?;
      if entries.is_empty() {
        return Err(ExportError::Empty.into());
      }
      let bytes = canna_codec::export(format, &entries, &settings, now)
        .map_err(ExportError::Encode)?;
      (bytes, entries.len())
    };

    let dir = &self.config.export_dir;
    let path =
      dir.join(export::file_name(&settings.business_name, filter.log_type, format, now));
    let write = async {
      tokio::fs::create_dir_all(dir).await?;
      tokio::fs::write(&path, &bytes).await
    };
    tokio::time::timeout(self.config.io_timeout, write)
      .await
      .map_err(|_| ExportError::TimedOut(self.config.io_timeout))?
      .map_err(ExportError::Io)?;

    info!(path = %path.display(), %format, entries = entry_count, "logs exported");
    Ok(ExportedFile {
      sha256: export::digest(&bytes),
      path,
      format,
      mime_type: format.mime_type(),
      entry_count,
    })
  }

  /// Merge the entries of a previously exported CSV, JSON or XML file.
  /// Returns the entries that were new; ids already stored are skipped.
  pub async fn import_logs(&self, path: &Path) -> Result<Vec<LogEntry>> {
    let ext = path
      .extension()
      .and_then(|e| e.to_str())
      .unwrap_or_default();
    let format = ExportFormat::from_extension(ext)
      .ok_or_else(|| ImportError::UnsupportedExtension(ext.to_owned()))?;

    let bytes = tokio::time::timeout(self.config.io_timeout, tokio::fs::read(path))
      .await
      .map_err(|_| ImportError::TimedOut(self.config.io_timeout))?
      .map_err(ImportError::Io)?;
    let incoming = canna_codec::import(format, &bytes).map_err(ImportError::Decode)?;
    let total = incoming.len();

    let _guard = self.gate.write().await;
    let added = self.store.merge(incoming).await.map_err(persistence)?;
    info!(
      path = %path.display(),
      added = added.len(),
      skipped = total - added.len(),
      "logs imported"
    );
    Ok(added)
  }

  /// Resolve `path` against the export directory, rejecting anything that
  /// lands outside it once symlinks and `..` are followed.
  pub async fn resolve_export_path(&self, path: &Path) -> Result<PathBuf> {
    let dir = &self.config.export_dir;
    let (root, target) = tokio::try_join!(
      tokio::fs::canonicalize(dir),
      tokio::fs::canonicalize(dir.join(path)),
    )
    .map_err(ImportError::Io)?;
    if !target.starts_with(&root) {
      warn!(path = %path.display(), "import path outside the export directory");
      return Err(ImportError::OutsideExportDir(path.to_path_buf()).into());
    }
    Ok(target)
  }

  pub async fn clear_logs(&self) -> Result<()> {
    let _guard = self.gate.write().await;
    self.store.clear().await.map_err(persistence)?;
    info!("compliance logs cleared");
    Ok(())
  }

  // ── Point-of-sale helpers ───────────────────────────────────────────────

  /// Advisory limit check of `basket` under the active jurisdiction.
  pub async fn check_purchase(&self, basket: &[BasketLine]) -> Vec<LimitBreach> {
    let jurisdiction = self.settings.read().await.jurisdiction;
    limits::check_purchase(basket, rules(jurisdiction))
  }

  /// Sales tax on `subtotal` at the active jurisdiction's rate.
  pub async fn tax_for(&self, subtotal: f64) -> f64 {
    rules(self.settings.read().await.jurisdiction).tax_for(subtotal)
  }
}

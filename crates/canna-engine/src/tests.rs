//! Engine tests against an in-memory SQLite store.

use std::{collections::HashSet, path::Path, time::Duration};

use canna_core::{
  jurisdiction::Jurisdiction,
  limits::{BasketLine, BreachKind},
  log::{LogEntry, LogFilter, LogType},
  settings::{Cadence, ExportFormat, SettingsPatch},
  store::LogStore,
  value::{DataValue, LogData},
};
use canna_store_sqlite::SqliteStore;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use crate::{ComplianceEngine, EngineConfig, Error, ExportError, ImportError};

async fn engine() -> (ComplianceEngine<SqliteStore>, TempDir) {
  let dir = tempfile::tempdir().unwrap();
  let store = SqliteStore::open_in_memory().await.unwrap();
  let engine = ComplianceEngine::new(store, EngineConfig {
    export_dir: dir.path().join("exports"),
    io_timeout: Duration::from_secs(5),
  });
  engine.init().await.unwrap();
  (engine, dir)
}

async fn ontario() -> (ComplianceEngine<SqliteStore>, TempDir) {
  let (engine, dir) = engine().await;
  engine
    .update_settings(SettingsPatch {
      jurisdiction: Some(Jurisdiction::Ontario),
      ..SettingsPatch::default()
    })
    .await
    .unwrap();
  (engine, dir)
}

fn wednesday() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
}

fn data(pairs: &[(&str, DataValue)]) -> LogData {
  pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
}

fn ontario_sale(category: &str) -> LogData {
  data(&[
    ("customerAge", 25_i64.into()),
    ("productSKU", "SKU1".into()),
    ("productCategory", category.into()),
    ("quantity", 1_i64.into()),
    ("price", 10_i64.into()),
    ("total", 10_i64.into()),
    ("taxAmount", 1.3.into()),
    ("paymentMethod", "cash".into()),
    ("employeeID", "E1".into()),
    ("storeID", "S1".into()),
    ("timestamp", "2025-01-15T10:00:00.000Z".into()),
  ])
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn init_persists_defaults_then_reloads_them() {
  let (engine, _dir) = engine().await;
  let stored = engine.store().load_settings().await.unwrap().unwrap();
  assert_eq!(stored, engine.settings().await);

  engine
    .update_settings(SettingsPatch {
      business_name: Some("Green Door".into()),
      ..SettingsPatch::default()
    })
    .await
    .unwrap();

  // A second init keeps what was persisted.
  let reloaded = engine.init().await.unwrap();
  assert_eq!(reloaded.business_name, "Green Door");
  assert_eq!(reloaded.jurisdiction, Jurisdiction::BritishColumbia);
}

#[tokio::test]
async fn entries_snapshot_settings_at_creation() {
  let (engine, _dir) = engine().await;
  let before = engine.add_log(LogType::Audit, LogData::new()).await.unwrap();
  engine
    .update_settings(SettingsPatch {
      jurisdiction: Some(Jurisdiction::Alberta),
      ..SettingsPatch::default()
    })
    .await
    .unwrap();
  let after = engine.add_log(LogType::Audit, LogData::new()).await.unwrap();

  assert_eq!(before.jurisdiction, "BC");
  assert_eq!(after.jurisdiction, "AB");
  let stored = engine.logs(&LogFilter::default()).await.unwrap();
  assert_eq!(stored[0].jurisdiction, "BC");
}

// ─── Logging ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn appended_ids_are_distinct() {
  let (engine, _dir) = engine().await;
  let mut ids = HashSet::new();
  for _ in 0..50 {
    let entry = engine.add_log_at(LogType::Inventory, LogData::new(), wednesday()).await.unwrap();
    assert!(ids.insert(entry.id));
  }
  assert_eq!(engine.store().count().await.unwrap(), 50);
}

#[tokio::test]
async fn incomplete_sale_is_rejected_and_not_stored() {
  let (engine, _dir) = ontario().await;
  let mut sale = ontario_sale("Flower");
  sale.remove("productCategory");
  sale.remove("storeID");

  let err = engine.add_log(LogType::Sale, sale).await.unwrap_err();
  match err {
    Error::Validation { jurisdiction, fields } => {
      assert_eq!(jurisdiction, "ON");
      assert_eq!(fields, vec!["productCategory", "storeID"]);
    }
    other => panic!("expected validation error, got {other:?}"),
  }
  assert_eq!(engine.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn complete_sale_is_compliant() {
  let (engine, _dir) = ontario().await;
  let now = Utc::now();
  engine.add_log_at(LogType::Sale, ontario_sale("Flower"), now).await.unwrap();

  let status = engine.check_status_at(now).await.unwrap();
  assert!(status.compliant);
  assert_eq!(status.sales_log_count, 1);
  assert_eq!(status.jurisdiction, "ON");
  assert_eq!(status.reporting_frequency, Cadence::Weekly);
}

#[tokio::test]
async fn non_sale_entries_skip_validation() {
  let (engine, _dir) = ontario().await;
  assert!(engine.add_log(LogType::Waste, LogData::new()).await.is_ok());
}

#[tokio::test]
async fn clear_then_append_starts_fresh() {
  let (engine, _dir) = engine().await;
  let old = engine.add_log(LogType::Audit, LogData::new()).await.unwrap();
  engine.clear_logs().await.unwrap();
  assert!(engine.logs(&LogFilter::default()).await.unwrap().is_empty());

  let fresh = engine.add_log(LogType::Audit, LogData::new()).await.unwrap();
  assert_ne!(fresh.id, old.id);
  assert_eq!(engine.logs(&LogFilter::default()).await.unwrap(), vec![fresh]);
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_respect_the_date_window() {
  let (engine, _dir) = ontario().await;
  let day = wednesday();
  engine.add_log_at(LogType::Sale, ontario_sale("Flower"), day).await.unwrap();
  engine
    .add_log_at(LogType::Sale, ontario_sale("Edible"), day + chrono::Duration::days(2))
    .await
    .unwrap();

  let all = engine.stats(None, None).await.unwrap();
  assert_eq!(all.total_sales, 20.0);

  let first = engine.stats(Some(day), Some(day)).await.unwrap();
  assert_eq!(first.total_sales, 10.0);
  assert!(first.sales_by_category.contains_key("Flower"));
  assert!(!first.sales_by_category.contains_key("Edible"));
}

#[tokio::test]
async fn daily_summary_is_recorded_as_an_entry() {
  let (engine, _dir) = ontario().await;
  let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
  engine.add_log_at(LogType::Sale, ontario_sale("Flower"), wednesday()).await.unwrap();
  engine.add_log_at(LogType::CashFloat, LogData::new(), wednesday()).await.unwrap();
  // The next day is outside the window.
  engine
    .add_log_at(LogType::Sale, ontario_sale("Flower"), wednesday() + chrono::Duration::days(1))
    .await
    .unwrap();

  let summary = engine.daily_summary(date).await.unwrap();
  assert_eq!(summary.log_type, LogType::DailySummary);
  assert_eq!(summary.data["salesCount"].as_f64(), Some(1.0));
  assert_eq!(summary.data["cashFloatEvents"].as_f64(), Some(1.0));
  assert_eq!(summary.data["date"], DataValue::from("2025-01-15"));

  let stored = engine.logs(&LogFilter::of_type(LogType::DailySummary)).await.unwrap();
  assert_eq!(stored, vec![summary]);
}

// ─── Export / import ─────────────────────────────────────────────────────────

#[tokio::test]
async fn export_of_nothing_fails() {
  let (engine, _dir) = engine().await;
  let err = engine
    .export_logs(ExportFormat::Csv, &LogFilter::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Export(ExportError::Empty)));
}

#[tokio::test]
async fn csv_export_carries_data_columns() {
  let (engine, _dir) = ontario().await;
  for category in ["Flower", "Flower", "Edible"] {
    engine.add_log_at(LogType::Sale, ontario_sale(category), wednesday()).await.unwrap();
  }

  let file = engine
    .export_logs_at(ExportFormat::Csv, &LogFilter::of_type(LogType::Sale), wednesday())
    .await
    .unwrap();
  assert_eq!(file.entry_count, 3);
  assert_eq!(file.mime_type, "text/csv");
  assert_eq!(
    file.path.file_name().unwrap().to_str().unwrap(),
    "CannaFlow-Dispensary-logs-sale-2025-01-15T10-00-00-000Z.csv"
  );

  let text = std::fs::read_to_string(&file.path).unwrap();
  let header = text.lines().next().unwrap();
  assert!(header.split(',').any(|h| h == "data.productCategory"));
  assert_eq!(file.sha256, crate::export::digest(text.as_bytes()));

  let stats = engine.stats(None, None).await.unwrap();
  assert_eq!(stats.sales_by_category["Flower"].count, 2.0);
}

#[tokio::test]
async fn reimporting_an_export_adds_nothing() {
  let (source, _dir) = engine().await;
  for t in [LogType::Audit, LogType::Waste, LogType::Recall] {
    source.add_log(t, data(&[("note", "n".into())])).await.unwrap();
  }
  let file = source
    .export_logs(ExportFormat::Json, &LogFilter::default())
    .await
    .unwrap();

  let (other, _other_dir) = engine().await;
  let first = other.import_logs(&file.path).await.unwrap();
  assert_eq!(first.len(), 3);
  let second = other.import_logs(&file.path).await.unwrap();
  assert!(second.is_empty());
  assert_eq!(other.store().count().await.unwrap(), 3);

  // And back into the store that wrote it.
  assert!(source.import_logs(&file.path).await.unwrap().is_empty());
}

#[tokio::test]
async fn json_export_round_trips_exactly() {
  let (engine, _dir) = ontario().await;
  engine.add_log(LogType::Sale, ontario_sale("Flower")).await.unwrap();
  engine
    .add_log(LogType::Delivery, data(&[("address", "1 Queen St".into()), ("items", 3_i64.into())]))
    .await
    .unwrap();
  let originals = engine.logs(&LogFilter::default()).await.unwrap();

  let file = engine
    .export_logs(ExportFormat::Json, &LogFilter::default())
    .await
    .unwrap();
  engine.clear_logs().await.unwrap();
  let restored = engine.import_logs(&file.path).await.unwrap();

  let key = |e: &LogEntry| {
    (e.id.clone(), e.log_type, e.timestamp, serde_json::to_string(&e.data).unwrap())
  };
  let a: HashSet<_> = originals.iter().map(key).collect();
  let b: HashSet<_> = restored.iter().map(key).collect();
  assert_eq!(a, b);
}

#[tokio::test]
async fn report_formats_cannot_be_imported() {
  let (engine, dir) = engine().await;
  let path = dir.path().join("report.pdf");
  std::fs::write(&path, b"%PDF-1.4").unwrap();

  let err = engine.import_logs(&path).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Import(ImportError::UnsupportedExtension(ref ext)) if ext == "pdf"
  ));
}

#[tokio::test]
async fn import_of_missing_file_is_an_io_error() {
  let (engine, dir) = engine().await;
  let err = engine
    .import_logs(&dir.path().join("absent.csv"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Import(ImportError::Io(_))));
}

#[tokio::test]
async fn api_paths_resolve_inside_the_export_dir() {
  let (engine, dir) = engine().await;
  let exports = &engine.config().export_dir;
  std::fs::create_dir_all(exports).unwrap();
  std::fs::write(exports.join("kept.json"), "[]").unwrap();
  std::fs::write(dir.path().join("outside.json"), "[]").unwrap();

  let inside = engine.resolve_export_path(Path::new("kept.json")).await.unwrap();
  assert!(inside.ends_with("exports/kept.json"));

  let err = engine
    .resolve_export_path(Path::new("../outside.json"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Import(ImportError::OutsideExportDir(_))));
}

/// A named pipe with no peer blocks `open(2)`, so I/O on it stalls until
/// the test opens the other end.
#[cfg(unix)]
fn stalled_pipe(path: &Path) {
  let status = std::process::Command::new("mkfifo").arg(path).status().unwrap();
  assert!(status.success());
}

#[cfg(unix)]
#[tokio::test]
async fn stalled_file_io_times_out() {
  let dir = tempfile::tempdir().unwrap();
  let store = SqliteStore::open_in_memory().await.unwrap();
  let limit = Duration::from_millis(50);
  let engine = ComplianceEngine::new(store, EngineConfig {
    export_dir: dir.path().to_path_buf(),
    io_timeout: limit,
  });
  engine.init().await.unwrap();
  engine.add_log_at(LogType::Audit, LogData::new(), wednesday()).await.unwrap();

  let business = engine.settings().await.business_name;
  let target = dir
    .path()
    .join(crate::export::file_name(&business, None, ExportFormat::Json, wednesday()));
  stalled_pipe(&target);
  let err = engine
    .export_logs_at(ExportFormat::Json, &LogFilter::default(), wednesday())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Export(ExportError::TimedOut(t)) if t == limit));
  // Drain the pipe so the parked writer finishes.
  std::fs::read(&target).unwrap();

  let source = dir.path().join("stalled.json");
  stalled_pipe(&source);
  let err = engine.import_logs(&source).await.unwrap_err();
  assert!(matches!(err, Error::Import(ImportError::TimedOut(t)) if t == limit));
  drop(std::fs::OpenOptions::new().write(true).open(&source).unwrap());
}

#[tokio::test]
async fn legacy_province_field_is_accepted() {
  let (engine, dir) = engine().await;
  let path = dir.path().join("legacy.json");
  std::fs::write(
    &path,
    r#"[{
      "id": "log_1736935200000_abcd1234",
      "type": "audit",
      "timestamp": "2025-01-15T10:00:00.000Z",
      "province": "MB",
      "businessName": "Old Build",
      "licenseNumber": "L-1",
      "location": "Winnipeg",
      "data": { "action": "login" }
    }]"#,
  )
  .unwrap();

  let added = engine.import_logs(&path).await.unwrap();
  assert_eq!(added.len(), 1);
  assert_eq!(added[0].jurisdiction, "MB");
}

#[tokio::test]
async fn scheduled_auto_export_follows_append() {
  let (engine, _dir) = engine().await;
  engine
    .update_settings(SettingsPatch {
      auto_export: Some(true),
      export_format: Some(ExportFormat::Json),
      export_schedule: Some(Cadence::Daily),
      ..SettingsPatch::default()
    })
    .await
    .unwrap();

  engine.add_log_at(LogType::Audit, LogData::new(), wednesday()).await.unwrap();
  let written: Vec<_> = std::fs::read_dir(&engine.config().export_dir)
    .unwrap()
    .collect();
  assert_eq!(written.len(), 1);
}

#[tokio::test]
async fn auto_export_waits_for_its_day() {
  let (engine, _dir) = engine().await;
  engine
    .update_settings(SettingsPatch {
      auto_export: Some(true),
      export_schedule: Some(Cadence::Weekly),
      ..SettingsPatch::default()
    })
    .await
    .unwrap();

  engine.add_log_at(LogType::Audit, LogData::new(), wednesday()).await.unwrap();
  assert!(!engine.config().export_dir.exists());
}

// ─── Point of sale ───────────────────────────────────────────────────────────

#[tokio::test]
async fn purchase_check_and_tax_use_active_jurisdiction() {
  let (engine, _dir) = ontario().await;
  let basket = [BasketLine {
    category:  "dried".into(),
    amount:    31.0,
    thc_class: None,
    thc_mg:    None,
  }];
  let breaches = engine.check_purchase(&basket).await;
  assert_eq!(breaches.len(), 1);
  assert_eq!(breaches[0].kind, BreachKind::PurchaseLimit);

  assert_eq!(engine.tax_for(100.0).await, 13.0);
}

#[tokio::test]
async fn deadlines_follow_notify_window() {
  let (engine, _dir) = engine().await;
  let today = Utc::now().date_naive();
  let upcoming = engine.upcoming_deadlines(365).await;
  assert!(upcoming.iter().all(|d| d.date >= today));
  assert!(engine.upcoming_deadlines(0).await.iter().all(|d| d.date == today));
}

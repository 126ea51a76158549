//! Router tests over an in-memory store.

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use canna_engine::{ComplianceEngine, EngineConfig};
use canna_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> (Router, TempDir) {
  let dir = tempfile::tempdir().unwrap();
  let store = SqliteStore::open_in_memory().await.unwrap();
  let engine = ComplianceEngine::new(store, EngineConfig {
    export_dir: dir.path().to_path_buf(),
    io_timeout: Duration::from_secs(5),
  });
  engine.init().await.unwrap();
  (api_router(Arc::new(engine)), dir)
}

async fn call(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_patch_merges() {
  let (app, _dir) = app().await;
  let (status, body) = call(&app, "GET", "/settings", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["jurisdiction"], "BC");

  let (status, body) =
    call(&app, "PATCH", "/settings", Some(json!({ "jurisdiction": "ON" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["jurisdiction"], "ON");
  assert_eq!(body["businessName"], "CannaFlow Dispensary");
}

// ── Logs ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn incomplete_sale_reports_missing_fields() {
  let (app, _dir) = app().await;
  call(&app, "PATCH", "/settings", Some(json!({ "jurisdiction": "ON" }))).await;

  let sale = json!({
    "type": "sale",
    "data": {
      "customerAge": 25, "productSKU": "SKU1", "quantity": 1, "price": 10,
      "taxAmount": 1.3, "paymentMethod": "cash", "employeeID": "E1",
      "timestamp": "2025-01-15T10:00:00.000Z"
    }
  });
  let (status, body) = call(&app, "POST", "/logs", Some(sale)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["missingFields"], json!(["productCategory", "storeID"]));

  let (_, logs) = call(&app, "GET", "/logs", None).await;
  assert_eq!(logs, json!([]));
}

#[tokio::test]
async fn unknown_log_type_is_a_bad_request() {
  let (app, _dir) = app().await;
  let (status, body) =
    call(&app, "POST", "/logs", Some(json!({ "type": "refund" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("refund"));

  let (status, _) = call(&app, "GET", "/logs?type=refund", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_list_and_clear() {
  let (app, _dir) = app().await;
  let (status, created) = call(
    &app,
    "POST",
    "/logs",
    Some(json!({ "type": "waste", "data": { "weight": 12.5 } })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(created["id"].as_str().unwrap().starts_with("log_"));
  call(&app, "POST", "/logs", Some(json!({ "type": "audit" }))).await;

  let (_, waste) = call(&app, "GET", "/logs?type=waste", None).await;
  assert_eq!(waste.as_array().unwrap().len(), 1);
  assert_eq!(waste[0]["data"]["weight"], 12.5);

  let (_, stats) = call(&app, "GET", "/stats", None).await;
  assert_eq!(stats["totalLogs"], 2);

  let (status, _) = call(&app, "DELETE", "/logs", None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (_, all) = call(&app, "GET", "/logs", None).await;
  assert_eq!(all, json!([]));
}

// ── Reports ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn status_and_summary() {
  let (app, _dir) = app().await;
  let (status, report) = call(&app, "GET", "/status", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["compliant"], true);
  assert_eq!(report["jurisdictionName"], "British Columbia");

  let (status, entry) =
    call(&app, "POST", "/summaries", Some(json!({ "date": "2025-01-15" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(entry["type"], "daily_summary");
  assert_eq!(entry["data"]["salesCount"], 0);

  let (status, deadlines) = call(&app, "GET", "/deadlines?days=0", None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(deadlines.is_array());
}

// ── Files ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn export_then_reimport() {
  let (app, _dir) = app().await;
  let (status, _) =
    call(&app, "POST", "/exports", Some(json!({ "format": "docx" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) =
    call(&app, "POST", "/exports", Some(json!({ "format": "json" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "export failed: no logs to export");

  call(&app, "POST", "/logs", Some(json!({ "type": "recall", "data": { "lot": "A1" } }))).await;
  let (status, file) = call(
    &app,
    "POST",
    "/exports",
    Some(json!({ "format": "XML", "type": "recall" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(file["entryCount"], 1);
  assert_eq!(file["mimeType"], "application/xml");
  assert_eq!(file["sha256"].as_str().unwrap().len(), 64);

  let (status, imported) =
    call(&app, "POST", "/imports", Some(json!({ "path": file["path"] }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(imported["added"], 0);
}

#[tokio::test]
async fn import_of_report_format_is_rejected() {
  let (app, dir) = app().await;
  let path = dir.path().join("report.html");
  std::fs::write(&path, "<html></html>").unwrap();
  let (status, _) =
    call(&app, "POST", "/imports", Some(json!({ "path": path }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn imports_are_confined_to_the_export_dir() {
  let (app, dir) = app().await;
  let elsewhere = tempfile::tempdir().unwrap();
  let outside = elsewhere.path().join("logs.json");
  std::fs::write(&outside, "[]").unwrap();

  let (status, body) =
    call(&app, "POST", "/imports", Some(json!({ "path": outside }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert!(body["error"].as_str().unwrap().contains("outside the export directory"));

  std::fs::write(dir.path().join("mine.json"), "[]").unwrap();
  let (status, imported) =
    call(&app, "POST", "/imports", Some(json!({ "path": "mine.json" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(imported["added"], 0);
}

// ── Point of sale ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn purchase_check_and_tax_quote() {
  let (app, _dir) = app().await;
  let (_, check) = call(
    &app,
    "POST",
    "/purchase-check",
    Some(json!({ "basket": [{ "category": "dried", "amount": 40 }] })),
  )
  .await;
  assert_eq!(check["withinLimits"], false);
  assert_eq!(check["breaches"][0]["kind"], "purchase_limit");

  let (status, quote) = call(&app, "GET", "/tax?subtotal=100", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(quote["rate"], 0.12);
  assert_eq!(quote["tax"], 12.0);
  assert_eq!(quote["total"], 112.0);
}

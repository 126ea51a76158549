//! `cannaflow`: compliance logging for cannabis retail.
//!
//! Reads `cannaflow.toml` (or the path given with `--config`), layered with
//! `CANNAFLOW_*` environment variables, opens the SQLite store and runs one
//! engine operation per subcommand. `serve` exposes the same operations as a
//! JSON API under `/api`.
//!
//! # Usage
//!
//! ```text
//! cannaflow log add sale --data '{"productSKU":"SKU1","quantity":1}'
//! cannaflow export csv --type sale --from 2025-01-01T00:00:00Z
//! cannaflow serve
//! ```

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use canna_core::{
  limits::BasketLine,
  log::{LogFilter, LogType},
  settings::{ExportFormat, SettingsPatch},
  value::{DataValue, LogData},
};
use canna_engine::ComplianceEngine;
use canna_store_sqlite::SqliteStore;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cannaflow", author, version, about = "Cannabis retail compliance logging")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "cannaflow.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Serve the JSON API over HTTP.
  Serve,
  /// Create the store if needed and print the active settings.
  Init,
  /// Print the settings, or merge a JSON patch into them.
  Settings {
    /// e.g. `{"jurisdiction":"ON","autoExport":true}`
    #[arg(long, value_name = "JSON")]
    set: Option<String>,
  },
  /// Record compliance events.
  Log {
    #[command(subcommand)]
    action: LogAction,
  },
  /// List logged events.
  Logs {
    #[command(flatten)]
    filter: FilterArgs,
  },
  /// Sales statistics.
  Stats {
    #[arg(long)]
    from: Option<DateTime<Utc>>,
    #[arg(long)]
    to:   Option<DateTime<Utc>>,
  },
  /// Compliance status for the current reporting period.
  Status,
  /// Upcoming regulatory deadlines.
  Deadlines {
    /// Look-ahead in days (defaults to the `notifyDays` setting).
    #[arg(long)]
    days: Option<u32>,
  },
  /// Summarise a day (default today) and record it.
  Summary { date: Option<NaiveDate> },
  /// Export logs to a file in the export directory.
  Export {
    /// csv, json, xml, pdf, excel or html.
    format: String,
    #[command(flatten)]
    filter: FilterArgs,
  },
  /// Merge a CSV, JSON or XML export back into the log.
  Import { path: PathBuf },
  /// Delete every logged event.
  Clear {
    /// Required; there is no undo.
    #[arg(long)]
    yes: bool,
  },
  /// Check a basket against purchase and potency limits.
  CheckPurchase {
    /// JSON array, e.g. `[{"category":"dried","amount":35}]`.
    basket: String,
  },
  /// Sales tax on a subtotal.
  Tax { subtotal: f64 },
}

#[derive(Subcommand, Debug)]
enum LogAction {
  /// Append one event.
  Add {
    /// sale, inventory, cash_float, daily_summary, audit, employee, waste,
    /// delivery or recall.
    log_type: String,
    /// The event payload as a JSON object.
    #[arg(long, value_name = "JSON")]
    data:     Option<String>,
    /// A single `key=value` field; repeatable. Values are read as JSON
    /// where possible.
    #[arg(short, long = "field", value_name = "KEY=VALUE")]
    fields:   Vec<String>,
  },
}

#[derive(clap::Args, Debug)]
struct FilterArgs {
  #[arg(long = "type")]
  log_type: Option<String>,
  /// Inclusive lower bound (RFC 3339).
  #[arg(long)]
  from:     Option<DateTime<Utc>>,
  /// Inclusive upper bound (RFC 3339).
  #[arg(long)]
  to:       Option<DateTime<Utc>>,
}

impl FilterArgs {
  fn into_filter(self) -> anyhow::Result<LogFilter> {
    Ok(LogFilter {
      log_type:   self.log_type.as_deref().map(LogType::parse_token).transpose()?,
      start_date: self.from,
      end_date:   self.to,
    })
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  if let Some(parent) = cfg.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let engine = ComplianceEngine::new(store, cfg.engine());
  engine.init().await.context("failed to initialise engine")?;

  run(cli.command, engine, &cfg).await
}

async fn run(
  command: Command,
  engine: ComplianceEngine<SqliteStore>,
  cfg: &AppConfig,
) -> anyhow::Result<()> {
  match command {
    Command::Serve => {
      let app = axum::Router::new().nest("/api", canna_api::api_router(Arc::new(engine)));
      let address = cfg.address();

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
      axum::serve(listener, app).await.context("server error")?;
    }
    Command::Init => print(&engine.settings().await)?,
    Command::Settings { set: None } => print(&engine.settings().await)?,
    Command::Settings { set: Some(json) } => {
      let patch: SettingsPatch =
        serde_json::from_str(&json).context("settings patch is not valid JSON")?;
      print(&engine.update_settings(patch).await?)?;
    }
    Command::Log { action: LogAction::Add { log_type, data, fields } } => {
      let log_type = LogType::parse_token(&log_type)?;
      let mut payload: LogData = match data {
        Some(json) => serde_json::from_str(&json).context("--data is not a JSON object")?,
        None => LogData::new(),
      };
      for field in &fields {
        let (key, value) = parse_field(field)?;
        payload.insert(key, value);
      }
      print(&engine.add_log(log_type, payload).await?)?;
    }
    Command::Logs { filter } => print(&engine.logs(&filter.into_filter()?).await?)?,
    Command::Stats { from, to } => print(&engine.stats(from, to).await?)?,
    Command::Status => print(&engine.check_status().await?)?,
    Command::Deadlines { days } => {
      let days = days.unwrap_or(engine.settings().await.notify_days);
      print(&engine.upcoming_deadlines(days).await)?;
    }
    Command::Summary { date } => {
      let date = date.unwrap_or_else(|| Utc::now().date_naive());
      print(&engine.daily_summary(date).await?)?;
    }
    Command::Export { format, filter } => {
      let format = ExportFormat::parse_token(&format)?;
      print(&engine.export_logs(format, &filter.into_filter()?).await?)?;
    }
    Command::Import { path } => {
      let added = engine
        .import_logs(&path)
        .await
        .with_context(|| format!("failed to import {}", path.display()))?;
      println!("imported {} new entries", added.len());
    }
    Command::Clear { yes: false } => {
      anyhow::bail!("refusing to clear the compliance log without --yes");
    }
    Command::Clear { yes: true } => {
      engine.clear_logs().await?;
      println!("compliance log cleared");
    }
    Command::CheckPurchase { basket } => {
      let basket: Vec<BasketLine> =
        serde_json::from_str(&basket).context("basket is not a JSON array of lines")?;
      print(&engine.check_purchase(&basket).await)?;
    }
    Command::Tax { subtotal } => println!("{:.2}", engine.tax_for(subtotal).await),
  }
  Ok(())
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

/// Split `key=value`; the value is JSON if it parses as JSON, else a string.
fn parse_field(field: &str) -> anyhow::Result<(String, DataValue)> {
  let (key, raw) = field
    .split_once('=')
    .with_context(|| format!("field {field:?} is not key=value"))?;
  let value = serde_json::from_str(raw).unwrap_or_else(|_| DataValue::from(raw));
  Ok((key.trim().to_owned(), value))
}

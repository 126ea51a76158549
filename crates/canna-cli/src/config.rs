//! Layered configuration: built-in defaults, then `cannaflow.toml`, then
//! `CANNAFLOW_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use canna_engine::EngineConfig;
use serde::Deserialize;

/// Runtime configuration for the `cannaflow` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  pub store_path:      PathBuf,
  pub export_dir:      PathBuf,
  pub io_timeout_secs: u64,
  pub host:            String,
  pub port:            u16,
}

impl AppConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", "~/.local/share/cannaflow/compliance.db")?
      .set_default("export_dir", "./exports")?
      .set_default("io_timeout_secs", 30)?
      .set_default("host", "127.0.0.1")?
      .set_default("port", 5260)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CANNAFLOW"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: AppConfig = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.export_dir = expand_tilde(&cfg.export_dir);
    Ok(cfg)
  }

  pub fn engine(&self) -> EngineConfig {
    EngineConfig {
      export_dir: self.export_dir.clone(),
      io_timeout: Duration::from_secs(self.io_timeout_secs),
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.port, 5260);
    assert_eq!(cfg.io_timeout_secs, 30);
    assert_eq!(cfg.export_dir, PathBuf::from("./exports"));
    assert!(cfg.store_path.ends_with(".local/share/cannaflow/compliance.db"));
  }

  #[test]
  fn file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cannaflow.toml");
    std::fs::write(&path, "port = 8080\nexport_dir = \"/srv/exports\"\n").unwrap();

    let cfg = AppConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.export_dir, PathBuf::from("/srv/exports"));
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.engine().io_timeout, Duration::from_secs(30));
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }
}

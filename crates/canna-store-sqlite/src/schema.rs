//! SQL schema for the compliance SQLite store.

/// Key of the settings document.
pub const SETTINGS_KEY: &str = "compliance_settings";

/// Key of the log document.
pub const LOGS_KEY: &str = "compliance_logs";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per named document. A document is only ever replaced whole,
-- inside the transaction that read it.
CREATE TABLE IF NOT EXISTS documents (
    key         TEXT PRIMARY KEY,
    body        TEXT NOT NULL,   -- JSON
    updated_at  TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";

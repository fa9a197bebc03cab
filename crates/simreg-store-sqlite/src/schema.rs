//! SQL schema for the simreg SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS bindings (
    phone_number    TEXT PRIMARY KEY,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    email           TEXT,
    national_id     TEXT NOT NULL,
    date_of_birth   TEXT NOT NULL,   -- ISO 8601 calendar date
    binding_token   TEXT NOT NULL,   -- rotated on every successful swap
    activation_date TEXT NOT NULL    -- set at registration; swap leaves it
);

-- Fraud reports are strictly append-only.
-- The registry reads this table; only the reporting pipeline writes it.
CREATE TABLE IF NOT EXISTS fraud_reports (
    report_id        TEXT PRIMARY KEY,
    phone_number     TEXT NOT NULL,
    reason           TEXT NOT NULL,
    reported_at      TEXT NOT NULL,   -- ISO 8601 UTC
    reporter_phone   TEXT NOT NULL,
    transaction_json TEXT NOT NULL    -- JSON payload of the transaction
);

CREATE INDEX IF NOT EXISTS bindings_national_id_idx ON bindings(national_id);
CREATE INDEX IF NOT EXISTS fraud_reports_phone_idx  ON fraud_reports(phone_number);

PRAGMA user_version = 1;
";

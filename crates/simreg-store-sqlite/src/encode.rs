//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, and the transaction payload of a fraud report as compact
//! JSON.

use chrono::{DateTime, NaiveDate, Utc};
use simreg_core::{
  binding::{Binding, BindingId},
  fraud::{FraudReport, Transaction},
  identity::Identity,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Transaction payload ─────────────────────────────────────────────────────

pub fn encode_transaction(t: &Transaction) -> Result<String> {
  Ok(serde_json::to_string(t)?)
}

pub fn decode_transaction(s: &str) -> Result<Transaction> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `bindings` row.
pub struct RawBinding {
  pub phone_number:    String,
  pub first_name:      String,
  pub last_name:       String,
  pub email:           Option<String>,
  pub national_id:     String,
  pub date_of_birth:   String,
  pub binding_token:   String,
  pub activation_date: String,
}

impl RawBinding {
  pub fn into_binding(self) -> Result<Binding> {
    Ok(Binding {
      phone_number: self.phone_number,
      identity:     Identity {
        first_name:    self.first_name,
        last_name:     self.last_name,
        email:         self.email,
        national_id:   self.national_id,
        date_of_birth: decode_date(&self.date_of_birth)?,
      },
      binding_id:   BindingId {
        id:              self.binding_token,
        activation_date: decode_date(&self.activation_date)?,
      },
    })
  }
}

/// Raw strings read directly from a `fraud_reports` row.
pub struct RawFraudReport {
  pub reason:           String,
  pub reported_at:      String,
  pub reporter_phone:   String,
  pub transaction_json: String,
}

impl RawFraudReport {
  pub fn into_report(self) -> Result<FraudReport> {
    Ok(FraudReport {
      transaction:    decode_transaction(&self.transaction_json)?,
      reason:         self.reason,
      reported_at:    decode_dt(&self.reported_at)?,
      reporter_phone: self.reporter_phone,
    })
  }
}

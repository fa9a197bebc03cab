//! Fraud report payloads. The registry reads these; it never writes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of transfer a reported transaction was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
  Send,
  Receive,
  Withdraw,
  Pay,
}

/// Where a transaction was initiated from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub latitude:  f64,
  pub longitude: f64,
}

/// A transaction as carried inside a fraud report.
///
/// Transactions enter this system only as report payloads; the registry
/// never creates or settles them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
  pub kind:              TransactionKind,
  pub amount:            f64,
  pub timestamp:         DateTime<Utc>,
  pub location:          GeoPoint,
  pub recipient_account: String,
  pub device_id:         String,
  pub ip_address:        Option<String>,
  pub reported:          Option<bool>,
}

/// A fraud report filed against the phone number it is stored under.
/// The collection is append-only and the registry treats it as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudReport {
  pub transaction:    Transaction,
  pub reason:         String,
  pub reported_at:    DateTime<Utc>,
  pub reporter_phone: String,
}

//! Error type for `simreg-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to rotate the token of a phone number with no binding.
  #[error("no binding stored for phone number {0}")]
  BindingNotFound(String),

  /// The stored token no longer matches the one the rotation was
  /// conditioned on — a concurrent swap won the race.
  #[error("binding token for {0} changed concurrently")]
  TokenConflict(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

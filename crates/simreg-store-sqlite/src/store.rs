//! [`SqliteStore`] — the SQLite implementation of [`BindingStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use simreg_core::{binding::Binding, fraud::FraudReport, store::BindingStore};

use crate::{
  Error, Result,
  encode::{RawBinding, RawFraudReport, encode_date, encode_dt, encode_transaction},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A binding store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What happened inside the conditional token update.
enum RotateOutcome {
  Rotated,
  Missing,
  Conflict,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Append a fraud report to `phone_number`'s collection.
  ///
  /// Not part of [`BindingStore`]: the registry only ever reads reports.
  /// This is the ingestion hook the reporting pipeline writes through, and
  /// what the tests use to seed report fixtures.
  pub async fn record_fraud_report(
    &self,
    phone_number: &str,
    report: &FraudReport,
  ) -> Result<()> {
    let report_id   = Uuid::new_v4().hyphenated().to_string();
    let phone       = phone_number.to_owned();
    let reason      = report.reason.clone();
    let reported_at = encode_dt(report.reported_at);
    let reporter    = report.reporter_phone.clone();
    let tx_json     = encode_transaction(&report.transaction)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fraud_reports (
             report_id, phone_number, reason, reported_at, reporter_phone,
             transaction_json
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![report_id, phone, reason, reported_at, reporter, tx_json],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── BindingStore impl ───────────────────────────────────────────────────────

impl BindingStore for SqliteStore {
  type Error = Error;

  async fn get(&self, phone_number: &str) -> Result<Option<Binding>> {
    let phone = phone_number.to_owned();

    let raw: Option<RawBinding> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT phone_number, first_name, last_name, email, national_id,
                      date_of_birth, binding_token, activation_date
               FROM bindings WHERE phone_number = ?1",
              rusqlite::params![phone],
              |row| {
                Ok(RawBinding {
                  phone_number:    row.get(0)?,
                  first_name:      row.get(1)?,
                  last_name:       row.get(2)?,
                  email:           row.get(3)?,
                  national_id:     row.get(4)?,
                  date_of_birth:   row.get(5)?,
                  binding_token:   row.get(6)?,
                  activation_date: row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBinding::into_binding).transpose()
  }

  async fn put(&self, binding: &Binding) -> Result<()> {
    let phone           = binding.phone_number.clone();
    let first_name      = binding.identity.first_name.clone();
    let last_name       = binding.identity.last_name.clone();
    let email           = binding.identity.email.clone();
    let national_id     = binding.identity.national_id.clone();
    let date_of_birth   = encode_date(binding.identity.date_of_birth);
    let binding_token   = binding.binding_id.id.clone();
    let activation_date = encode_date(binding.binding_id.activation_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO bindings (
             phone_number, first_name, last_name, email, national_id,
             date_of_birth, binding_token, activation_date
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            phone,
            first_name,
            last_name,
            email,
            national_id,
            date_of_birth,
            binding_token,
            activation_date,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn rotate_binding_id(
    &self,
    phone_number: &str,
    current_id: &str,
    new_id: &str,
  ) -> Result<()> {
    let phone    = phone_number.to_owned();
    let expected = current_id.to_owned();
    let token    = new_id.to_owned();

    // Read-verify-write runs inside one transaction on the connection's
    // dedicated thread, so a concurrent rotation cannot interleave.
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let stored: Option<String> = tx
          .query_row(
            "SELECT binding_token FROM bindings WHERE phone_number = ?1",
            rusqlite::params![phone],
            |row| row.get(0),
          )
          .optional()?;

        let outcome = match stored {
          None => RotateOutcome::Missing,
          Some(stored) if stored != expected => RotateOutcome::Conflict,
          Some(_) => {
            tx.execute(
              "UPDATE bindings SET binding_token = ?2 WHERE phone_number = ?1",
              rusqlite::params![phone, token],
            )?;
            RotateOutcome::Rotated
          }
        };

        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    match outcome {
      RotateOutcome::Rotated => Ok(()),
      RotateOutcome::Missing => Err(Error::BindingNotFound(phone_number.to_owned())),
      RotateOutcome::Conflict => Err(Error::TokenConflict(phone_number.to_owned())),
    }
  }

  async fn find_by_national_id(&self, national_id: &str) -> Result<Vec<Binding>> {
    let id = national_id.to_owned();

    let raws: Vec<RawBinding> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT phone_number, first_name, last_name, email, national_id,
                  date_of_birth, binding_token, activation_date
           FROM bindings WHERE national_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok(RawBinding {
              phone_number:    row.get(0)?,
              first_name:      row.get(1)?,
              last_name:       row.get(2)?,
              email:           row.get(3)?,
              national_id:     row.get(4)?,
              date_of_birth:   row.get(5)?,
              binding_token:   row.get(6)?,
              activation_date: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBinding::into_binding).collect()
  }

  async fn fraud_reports(&self, phone_number: &str) -> Result<Vec<FraudReport>> {
    let phone = phone_number.to_owned();

    let raws: Vec<RawFraudReport> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT reason, reported_at, reporter_phone, transaction_json
           FROM fraud_reports WHERE phone_number = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![phone], |row| {
            Ok(RawFraudReport {
              reason:           row.get(0)?,
              reported_at:      row.get(1)?,
              reporter_phone:   row.get(2)?,
              transaction_json: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFraudReport::into_report).collect()
  }
}

//! The registry services: registration, re-verification, identifier swap,
//! and fraud-report aggregation across one national id.
//!
//! Every operation is a sequence of store round trips; no lock is held
//! across an await, and nothing here caches store state.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinSet, time::Instant};
use tracing::warn;

use crate::{
  binding::{Binding, BindingId},
  error::{Error, Result},
  fraud::FraudReport,
  identity::Identity,
  store::BindingStore,
};

/// Maximum number of bindings one national id may hold.
///
/// Advisory: callers consult [`BindingService::registration_count`] before
/// registering, and [`BindingService::register`] itself only enforces
/// phone-number uniqueness. Two concurrent registrations can both pass the
/// check and transiently exceed the cap.
pub const REGISTRATION_CAP: usize = 3;

/// How long one fraud-aggregation fan-out may run before the remaining
/// sub-lookups are abandoned.
pub const DEFAULT_FAN_OUT_DEADLINE: Duration = Duration::from_secs(5);

/// The registry operations, generic over any [`BindingStore`] backend.
pub struct BindingService<S> {
  store:            Arc<S>,
  fan_out_deadline: Duration,
}

impl<S> Clone for BindingService<S> {
  fn clone(&self) -> Self {
    Self {
      store:            Arc::clone(&self.store),
      fan_out_deadline: self.fan_out_deadline,
    }
  }
}

impl<S> BindingService<S>
where
  S: BindingStore + 'static,
{
  pub fn new(store: Arc<S>) -> Self {
    Self { store, fan_out_deadline: DEFAULT_FAN_OUT_DEADLINE }
  }

  /// Override the overall deadline applied across one fraud fan-out.
  pub fn with_fan_out_deadline(mut self, deadline: Duration) -> Self {
    self.fan_out_deadline = deadline;
    self
  }

  // ── Registration ──────────────────────────────────────────────────────

  /// Create a new binding, enforcing phone-number uniqueness.
  ///
  /// Field validation and the advisory cap/fraud checks are the caller's
  /// responsibility; this only guarantees that an occupied phone number is
  /// never overwritten. On conflict the existing holder's display name is
  /// carried in the failure and the store is left untouched.
  pub async fn register(&self, binding: Binding) -> Result<Binding> {
    let existing = self
      .store
      .get(&binding.phone_number)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;

    if let Some(existing) = existing {
      return Err(Error::AlreadyRegistered {
        owner: existing.identity.display_name(),
      });
    }

    self
      .store
      .put(&binding)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;

    Ok(binding)
  }

  /// The number of bindings currently registered under `national_id`.
  ///
  /// Input to the registration cap. The count is a separate round trip
  /// from any subsequent create, so it is advisory, not transactional.
  pub async fn registration_count(&self, national_id: &str) -> Result<usize> {
    let bindings = self
      .store
      .find_by_national_id(national_id)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;
    Ok(bindings.len())
  }

  // ── Verification ──────────────────────────────────────────────────────

  /// Re-authenticate a claimed identity against the binding stored for
  /// `phone_number`, yielding the full binding on success.
  pub async fn verify(&self, phone_number: &str, claimed: &Identity) -> Result<Binding> {
    let binding = self
      .store
      .get(phone_number)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?
      .ok_or_else(|| Error::NotRegistered(phone_number.to_string()))?;

    if !binding.identity.matches(claimed) {
      return Err(Error::IdentityMismatch);
    }

    Ok(binding)
  }

  // ── Swap ──────────────────────────────────────────────────────────────

  /// Verify the claimed identity, then rotate the binding-id token.
  ///
  /// The rotation is conditioned on the token observed during
  /// verification: a concurrent swap that won the race surfaces here as
  /// `SwapFailed` instead of silently overwriting the newer token. The
  /// activation date is left as it was.
  pub async fn swap(&self, phone_number: &str, claimed: &Identity) -> Result<BindingId> {
    let binding = self.verify(phone_number, claimed).await?;

    let new_id = BindingId::fresh_token();
    self
      .store
      .rotate_binding_id(phone_number, &binding.binding_id.id, &new_id)
      .await
      .map_err(|e| Error::SwapFailed(Box::new(e)))?;

    Ok(BindingId {
      id:              new_id,
      activation_date: binding.binding_id.activation_date,
    })
  }

  // ── Fraud aggregation ─────────────────────────────────────────────────

  /// The fraud reports filed against a single phone number.
  pub async fn fraud_reports_for_phone(&self, phone_number: &str) -> Result<Vec<FraudReport>> {
    self
      .store
      .fraud_reports(phone_number)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))
  }

  /// Merge the fraud reports of every binding registered under
  /// `national_id`.
  ///
  /// One lookup runs concurrently per binding. A failed or deadline-late
  /// sub-lookup contributes nothing — it is logged and the remaining
  /// phones' reports are still returned. Reports are merged as returned,
  /// without deduplication or ordering. Dropping the returned future
  /// cancels all in-flight lookups.
  pub async fn fraud_reports_for_identity(
    &self,
    national_id: &str,
  ) -> Result<Vec<FraudReport>> {
    let bindings = self
      .store
      .find_by_national_id(national_id)
      .await
      .map_err(|e| Error::Storage(Box::new(e)))?;

    // No bindings: answer immediately, without issuing a single report
    // lookup.
    if bindings.is_empty() {
      return Ok(Vec::new());
    }

    let mut lookups = JoinSet::new();
    for binding in bindings {
      let store = Arc::clone(&self.store);
      lookups.spawn(async move {
        let reports = store.fraud_reports(&binding.phone_number).await;
        (binding.phone_number, reports)
      });
    }

    let deadline = Instant::now() + self.fan_out_deadline;
    let mut merged = Vec::new();

    loop {
      let next = tokio::time::timeout_at(deadline, lookups.join_next()).await;
      match next {
        Ok(None) => break,
        Ok(Some(Ok((_, Ok(mut reports))))) => merged.append(&mut reports),
        Ok(Some(Ok((phone, Err(e))))) => {
          // Availability over completeness: treat this phone's reports as
          // empty rather than failing the aggregate.
          warn!(phone_number = %phone, error = %e, "fraud report lookup failed");
        }
        Ok(Some(Err(e))) => {
          warn!(error = %e, "fraud report lookup task aborted");
        }
        Err(_) => {
          warn!(
            national_id = %national_id,
            pending = lookups.len(),
            "fraud fan-out deadline reached; returning partial results"
          );
          lookups.abort_all();
          break;
        }
      }
    }

    Ok(merged)
  }
}

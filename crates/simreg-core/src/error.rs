//! Error taxonomy for the binding registry.

use thiserror::Error;

/// Boxed source error from a storage backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// The verify/swap target phone number has no binding.
  #[error("phone number {0} is not registered")]
  NotRegistered(String),

  /// The claimed identity failed the matcher against the stored record.
  #[error("supplied details do not match the registered holder")]
  IdentityMismatch,

  /// The registration target phone number is already bound. Carries the
  /// existing holder's display name.
  #[error("phone number is already registered to {owner}")]
  AlreadyRegistered { owner: String },

  /// Advisory: the national id already holds `count` bindings.
  #[error("national id {national_id} already has {count} registration(s); the cap is {cap}")]
  RegistrationCapReached {
    national_id: String,
    count:       usize,
    cap:         usize,
  },

  /// Advisory: existing bindings of this national id carry fraud reports.
  #[error("national id {national_id} is linked to {count} fraud report(s)")]
  FraudAssociated { national_id: String, count: usize },

  /// The store rejected the identifier rotation after a successful
  /// verification.
  #[error("identifier rotation failed: {0}")]
  SwapFailed(#[source] BoxError),

  /// Transport/adapter failure, not a business-rule outcome. The only
  /// class a caller may retry.
  #[error("storage error: {0}")]
  Storage(#[source] BoxError),
}

impl Error {
  /// Stable machine-readable discriminant, exposed in API error bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::NotRegistered(_) => "not_registered",
      Self::IdentityMismatch => "identity_mismatch",
      Self::AlreadyRegistered { .. } => "already_registered",
      Self::RegistrationCapReached { .. } => "registration_cap_reached",
      Self::FraudAssociated { .. } => "fraud_associated",
      Self::SwapFailed(_) => "swap_failed",
      Self::Storage(_) => "storage",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Identity records and the matching rule used for re-verification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The personal details a binding holder supplied at registration.
///
/// Immutable once a binding is created: a swap re-supplies an identity for
/// comparison only and never overwrites the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
  pub first_name:    String,
  pub last_name:     String,
  pub email:         Option<String>,
  pub national_id:   String,
  pub date_of_birth: NaiveDate,
}

impl Identity {
  /// "First Last", as carried in the `AlreadyRegistered` failure so support
  /// staff can tell who holds the conflicting number.
  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  /// Whether `claimed` names the same person as this stored record.
  ///
  /// First name, last name, and national id are compared case-folded; the
  /// date of birth must be exactly equal. Email is never part of the
  /// comparison. No partial-match scoring — the result is all-or-nothing.
  pub fn matches(&self, claimed: &Identity) -> bool {
    let fold = |s: &str| s.to_lowercase();
    fold(&self.first_name) == fold(&claimed.first_name)
      && fold(&self.last_name) == fold(&claimed.last_name)
      && fold(&self.national_id) == fold(&claimed.national_id)
      && self.date_of_birth == claimed.date_of_birth
  }
}

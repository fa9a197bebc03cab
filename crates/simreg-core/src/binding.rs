//! Bindings — the persisted association between a phone number and a
//! verified identity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Identity;

/// The identifier pair for one activation of a phone number.
///
/// `id` distinguishes successive activations of the same number and is
/// replaced on every successful swap. `activation_date` is set once at
/// registration; a swap does not touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingId {
  pub id:              String,
  pub activation_date: NaiveDate,
}

impl BindingId {
  /// Mint a binding id with a fresh token, activated on `activation_date`.
  pub fn issue(activation_date: NaiveDate) -> Self {
    Self { id: Self::fresh_token(), activation_date }
  }

  /// A new opaque token. Uuid v4 carries 122 random bits, keeping the
  /// collision probability across swaps negligible.
  pub fn fresh_token() -> String {
    Uuid::new_v4().hyphenated().to_string()
  }
}

/// One phone number bound to one verified identity.
///
/// The phone number is the sole external key. Several bindings may share a
/// national id; the registration cap bounds how many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
  pub phone_number: String,
  pub identity:     Identity,
  pub binding_id:   BindingId,
}

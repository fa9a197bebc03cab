//! The `BindingStore` trait — the only seam through which the registry
//! touches external storage.
//!
//! The trait is implemented by storage backends (e.g. `simreg-store-sqlite`)
//! and by the in-memory mock the service tests use. Every service is
//! deterministic given the data a store returns; side effects are confined
//! to implementations of this trait.

use std::future::Future;

use crate::{binding::Binding, fraud::FraudReport};

/// Abstraction over a keyed document store holding bindings and fraud
/// reports.
///
/// Bindings are keyed by phone number. Fraud reports are a per-phone-number
/// collection the registry only ever reads. All methods return `Send`
/// futures so the trait can be used in multi-threaded async runtimes
/// (e.g. tokio with `axum`).
pub trait BindingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the binding stored at `phone_number`, if any.
  fn get<'a>(
    &'a self,
    phone_number: &'a str,
  ) -> impl Future<Output = Result<Option<Binding>, Self::Error>> + Send + 'a;

  /// Unconditionally create or overwrite the binding at its phone number.
  fn put<'a>(
    &'a self,
    binding: &'a Binding,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Replace only the binding-id token, and only if the stored token still
  /// equals `current_id`.
  ///
  /// The read-verify-write must be atomic in the backend: a concurrent
  /// swap that rotated the token first makes this call fail rather than
  /// letting the caller clobber the newer token. Fails when no binding
  /// exists at `phone_number`.
  fn rotate_binding_id<'a>(
    &'a self,
    phone_number: &'a str,
    current_id: &'a str,
    new_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All bindings whose identity carries `national_id` (equality lookup
  /// over a secondary index). Unordered; may be empty.
  fn find_by_national_id<'a>(
    &'a self,
    national_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Binding>, Self::Error>> + Send + 'a;

  /// All fraud reports filed against `phone_number`.
  fn fraud_reports<'a>(
    &'a self,
    phone_number: &'a str,
  ) -> impl Future<Output = Result<Vec<FraudReport>, Self::Error>> + Send + 'a;
}

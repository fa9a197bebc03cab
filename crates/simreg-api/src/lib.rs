//! JSON REST API for the simreg binding registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`simreg_core::store::BindingStore`]. This layer owns everything the
//! registry core treats as caller responsibility: field validation, the
//! minimum-age rule, the advisory registration cap, and the fraud gate.
//! Auth, TLS, and transport concerns stay outside.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", simreg_api::api_router(service.clone()))
//! ```

pub mod bindings;
pub mod error;
pub mod fraud;

use axum::{
  Router,
  routing::{get, post},
};
use simreg_core::{service::BindingService, store::BindingStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(service: BindingService<S>) -> Router<()>
where
  S: BindingStore + 'static,
{
  Router::new()
    // Bindings
    .route("/bindings", post(bindings::register::<S>))
    .route("/bindings/{phone}/verify", post(bindings::verify::<S>))
    .route("/bindings/{phone}/swap", post(bindings::swap::<S>))
    .route("/bindings/{phone}/fraud-reports", get(fraud::reports_for_phone::<S>))
    // Identities
    .route(
      "/identities/{national_id}/registrations",
      get(fraud::registration_count::<S>),
    )
    .route(
      "/identities/{national_id}/fraud-reports",
      get(fraud::reports_for_identity::<S>),
    )
    .with_state(service)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::TimeZone as _;
  use chrono::Utc;
  use serde_json::{Value, json};
  use simreg_core::fraud::{FraudReport, GeoPoint, Transaction, TransactionKind};
  use simreg_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn setup() -> (BindingService<SqliteStore>, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let service = BindingService::new(Arc::clone(&store));
    (service, store)
  }

  async fn send(
    service: &BindingService<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let request = match body {
      Some(body) => Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap(),
    };

    let response = api_router(service.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn register_body(phone: &str, first: &str, last: &str, national_id: &str) -> Value {
    json!({
      "phone_number":  phone,
      "first_name":    first,
      "last_name":     last,
      "national_id":   national_id,
      "date_of_birth": "2000-01-01",
    })
  }

  fn claim_body(first: &str, last: &str, national_id: &str, dob: &str) -> Value {
    json!({
      "first_name":    first,
      "last_name":     last,
      "national_id":   national_id,
      "date_of_birth": dob,
    })
  }

  fn fixture_report(reporter: &str, reason: &str) -> FraudReport {
    FraudReport {
      transaction:    Transaction {
        kind:              TransactionKind::Pay,
        amount:            90.0,
        timestamp:         Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        location:          GeoPoint { latitude: -13.96, longitude: 33.79 },
        recipient_account: "ACC-001".to_string(),
        device_id:         "device-1".to_string(),
        ip_address:        None,
        reported:          Some(true),
      },
      reason:         reason.to_string(),
      reported_at:    Utc.with_ymd_and_hms(2025, 3, 2, 9, 30, 0).unwrap(),
      reporter_phone: reporter.to_string(),
    }
  }

  fn error_kind(body: &Value) -> &str {
    body["error"]["kind"].as_str().unwrap()
  }

  // ── Registration ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_returns_201_with_a_token() {
    let (service, _) = setup().await;

    let (status, body) = send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+10000000001", "Ann", "Lee", "A1")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phone_number"], "+10000000001");
    assert!(!body["binding_id"]["id"].as_str().unwrap().is_empty());
  }

  #[tokio::test]
  async fn register_duplicate_phone_conflicts_and_names_the_owner() {
    let (service, _) = setup().await;

    send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+10000000001", "Ann", "Lee", "A1")),
    )
    .await;

    let (status, body) = send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+10000000001", "Bob", "Lee", "B2")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_kind(&body), "already_registered");
    assert!(body["error"]["message"].as_str().unwrap().contains("Ann Lee"));
  }

  #[tokio::test]
  async fn register_rejects_malformed_phone_numbers() {
    let (service, _) = setup().await;

    let (status, body) = send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("12ab567890", "Ann", "Lee", "A1")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&body), "bad_request");
  }

  #[tokio::test]
  async fn register_rejects_underage_holders() {
    let (service, _) = setup().await;

    let mut body = register_body("+10000000001", "Kid", "Lee", "K1");
    body["date_of_birth"] = json!("2015-01-01");
    let (status, body) = send(&service, "POST", "/bindings", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&body), "bad_request");
  }

  #[tokio::test]
  async fn register_blocks_at_the_registration_cap() {
    let (service, _) = setup().await;

    for phone in ["+20000000001", "+20000000002", "+20000000003"] {
      let (status, _) = send(
        &service,
        "POST",
        "/bindings",
        Some(register_body(phone, "Holder", "Nine", "N9")),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+20000000004", "Holder", "Nine", "N9")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_kind(&body), "registration_cap_reached");
  }

  #[tokio::test]
  async fn register_is_blocked_by_fraud_history() {
    let (service, store) = setup().await;

    send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+20000000001", "Holder", "Nine", "N9")),
    )
    .await;
    store
      .record_fraud_report("+20000000001", &fixture_report("+30000000001", "phishing"))
      .await
      .unwrap();

    let (status, body) = send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+20000000002", "Holder", "Nine", "N9")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_kind(&body), "fraud_associated");
  }

  // ── Verification ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn verify_accepts_case_varied_identity() {
    let (service, _) = setup().await;

    send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+10000000001", "Ann", "Lee", "A1")),
    )
    .await;

    let (status, body) = send(
      &service,
      "POST",
      "/bindings/+10000000001/verify",
      Some(claim_body("ann", "LEE", "a1", "2000-01-01")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone_number"], "+10000000001");
  }

  #[tokio::test]
  async fn verify_unknown_phone_is_404() {
    let (service, _) = setup().await;

    let (status, body) = send(
      &service,
      "POST",
      "/bindings/+19999999999/verify",
      Some(claim_body("Ann", "Lee", "A1", "2000-01-01")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_kind(&body), "not_registered");
  }

  #[tokio::test]
  async fn verify_mismatch_is_403() {
    let (service, _) = setup().await;

    send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+10000000001", "Ann", "Lee", "A1")),
    )
    .await;

    let (status, body) = send(
      &service,
      "POST",
      "/bindings/+10000000001/verify",
      Some(claim_body("Bob", "Lee", "A1", "2000-01-01")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_kind(&body), "identity_mismatch");
  }

  // ── Swap ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn swap_rotates_the_token_and_preserves_activation_date() {
    let (service, _) = setup().await;

    let (_, created) = send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+10000000001", "Ann", "Lee", "A1")),
    )
    .await;
    let old_token = created["binding_id"]["id"].as_str().unwrap().to_string();
    let activation = created["binding_id"]["activation_date"].clone();

    let (status, rotated) = send(
      &service,
      "POST",
      "/bindings/+10000000001/swap",
      Some(claim_body("ann", "LEE", "a1", "2000-01-01")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_ne!(rotated["id"].as_str().unwrap(), old_token);
    assert_eq!(rotated["activation_date"], activation);

    // The holder can still verify after the swap.
    let (status, _) = send(
      &service,
      "POST",
      "/bindings/+10000000001/verify",
      Some(claim_body("Ann", "Lee", "A1", "2000-01-01")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn swap_with_wrong_identity_is_403() {
    let (service, _) = setup().await;

    send(
      &service,
      "POST",
      "/bindings",
      Some(register_body("+10000000001", "Ann", "Lee", "A1")),
    )
    .await;

    let (status, body) = send(
      &service,
      "POST",
      "/bindings/+10000000001/swap",
      Some(claim_body("Ann", "Lee", "A1", "1999-01-01")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_kind(&body), "identity_mismatch");
  }

  // ── Fraud visibility ──────────────────────────────────────────────────

  #[tokio::test]
  async fn registration_count_endpoint_reports_the_cap_input() {
    let (service, _) = setup().await;

    let (status, body) = send(&service, "GET", "/identities/N9/registrations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    for phone in ["+20000000001", "+20000000002", "+20000000003"] {
      send(
        &service,
        "POST",
        "/bindings",
        Some(register_body(phone, "Holder", "Nine", "N9")),
      )
      .await;
    }

    let (_, body) = send(&service, "GET", "/identities/N9/registrations", None).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["national_id"], "N9");
  }

  #[tokio::test]
  async fn identity_fraud_reports_merge_across_phones() {
    let (service, store) = setup().await;

    for phone in ["+20000000001", "+20000000002"] {
      send(
        &service,
        "POST",
        "/bindings",
        Some(register_body(phone, "Holder", "Nine", "N9")),
      )
      .await;
    }
    store
      .record_fraud_report("+20000000001", &fixture_report("+30000000001", "phishing"))
      .await
      .unwrap();
    store
      .record_fraud_report("+20000000002", &fixture_report("+30000000002", "mule account"))
      .await
      .unwrap();

    let (status, body) = send(&service, "GET", "/identities/N9/fraud-reports", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn phone_fraud_reports_are_scoped_to_that_phone() {
    let (service, store) = setup().await;

    store
      .record_fraud_report("+20000000001", &fixture_report("+30000000001", "phishing"))
      .await
      .unwrap();
    store
      .record_fraud_report("+20000000002", &fixture_report("+30000000002", "mule account"))
      .await
      .unwrap();

    let (status, body) =
      send(&service, "GET", "/bindings/+20000000001/fraud-reports", None).await;
    assert_eq!(status, StatusCode::OK);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["reporter_phone"], "+30000000001");
  }
}

//! Handlers for `/bindings` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/bindings` | Register a phone number |
//! | `POST` | `/bindings/{phone}/verify` | Re-authenticate the holder |
//! | `POST` | `/bindings/{phone}/swap` | Rotate the binding token |
//!
//! Registration runs the caller-side guards the registry itself does not:
//! field validation, the minimum-age rule, the advisory registration cap,
//! and the fraud gate.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use simreg_core::{
  REGISTRATION_CAP,
  binding::{Binding, BindingId},
  error::Error,
  identity::Identity,
  service::BindingService,
  store::BindingStore,
};

use crate::error::ApiError;

/// Holders must be at least this old on the day of registration.
pub const MINIMUM_AGE_YEARS: i32 = 18;

// ─── Request bodies ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
  pub phone_number:  String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         Option<String>,
  pub national_id:   String,
  pub date_of_birth: NaiveDate,
}

/// The identity a caller claims to be; the phone number comes from the
/// request path.
#[derive(Debug, Deserialize)]
pub struct ClaimedIdentity {
  pub first_name:    String,
  pub last_name:     String,
  pub email:         Option<String>,
  pub national_id:   String,
  pub date_of_birth: NaiveDate,
}

impl ClaimedIdentity {
  fn into_identity(self) -> Identity {
    Identity {
      first_name:    self.first_name,
      last_name:     self.last_name,
      email:         self.email,
      national_id:   self.national_id,
      date_of_birth: self.date_of_birth,
    }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Strip whitespace and check the `+`-optional 10–15 digit shape.
fn normalize_phone(raw: &str) -> Result<String, ApiError> {
  let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
  let digits = compact.strip_prefix('+').unwrap_or(&compact);
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
    return Err(ApiError::BadRequest(
      "phone number may contain only digits and a leading '+'".to_string(),
    ));
  }
  if !(10..=15).contains(&digits.len()) {
    return Err(ApiError::BadRequest(
      "phone number must have 10 to 15 digits".to_string(),
    ));
  }
  Ok(compact)
}

fn years_old(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
  let mut age = today.year() - date_of_birth.year();
  if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
    age -= 1;
  }
  age
}

fn check_minimum_age(date_of_birth: NaiveDate, today: NaiveDate) -> Result<(), ApiError> {
  if years_old(date_of_birth, today) < MINIMUM_AGE_YEARS {
    return Err(ApiError::BadRequest(format!(
      "holder must be at least {MINIMUM_AGE_YEARS} years old"
    )));
  }
  Ok(())
}

// ─── Register ────────────────────────────────────────────────────────────────

/// `POST /bindings`
pub async fn register<S>(
  State(service): State<BindingService<S>>,
  Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BindingStore + 'static,
{
  let phone_number = normalize_phone(&body.phone_number)?;
  let today = Utc::now().date_naive();
  check_minimum_age(body.date_of_birth, today)?;

  // Advisory pre-checks. Each is a separate round trip from the create
  // below, so a concurrent registration can race past them; the registry
  // itself only guards phone-number uniqueness.
  let count = service.registration_count(&body.national_id).await?;
  if count >= REGISTRATION_CAP {
    return Err(
      Error::RegistrationCapReached {
        national_id: body.national_id,
        count,
        cap: REGISTRATION_CAP,
      }
      .into(),
    );
  }

  let reports = service.fraud_reports_for_identity(&body.national_id).await?;
  if !reports.is_empty() {
    return Err(
      Error::FraudAssociated {
        national_id: body.national_id,
        count: reports.len(),
      }
      .into(),
    );
  }

  let binding = Binding {
    phone_number,
    identity:   Identity {
      first_name:    body.first_name,
      last_name:     body.last_name,
      email:         body.email,
      national_id:   body.national_id,
      date_of_birth: body.date_of_birth,
    },
    binding_id: BindingId::issue(today),
  };

  let stored = service.register(binding).await?;
  Ok((StatusCode::CREATED, Json(stored)))
}

// ─── Verify ──────────────────────────────────────────────────────────────────

/// `POST /bindings/{phone}/verify`
pub async fn verify<S>(
  State(service): State<BindingService<S>>,
  Path(phone): Path<String>,
  Json(body): Json<ClaimedIdentity>,
) -> Result<Json<Binding>, ApiError>
where
  S: BindingStore + 'static,
{
  let binding = service.verify(&phone, &body.into_identity()).await?;
  Ok(Json(binding))
}

// ─── Swap ────────────────────────────────────────────────────────────────────

/// `POST /bindings/{phone}/swap`
pub async fn swap<S>(
  State(service): State<BindingService<S>>,
  Path(phone): Path<String>,
  Json(body): Json<ClaimedIdentity>,
) -> Result<Json<BindingId>, ApiError>
where
  S: BindingStore + 'static,
{
  let binding_id = service.swap(&phone, &body.into_identity()).await?;
  Ok(Json(binding_id))
}

//! Handlers for the fraud-visibility and registration-count endpoints.
//!
//! | Method | Path |
//! |--------|------|
//! | `GET` | `/identities/{national_id}/registrations` |
//! | `GET` | `/identities/{national_id}/fraud-reports` |
//! | `GET` | `/bindings/{phone}/fraud-reports` |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use simreg_core::{fraud::FraudReport, service::BindingService, store::BindingStore};

use crate::error::ApiError;

/// The registration-cap payload: how many bindings a national id holds.
#[derive(Debug, Serialize)]
pub struct RegistrationCount {
  pub national_id: String,
  pub count:       usize,
}

/// `GET /identities/{national_id}/registrations`
pub async fn registration_count<S>(
  State(service): State<BindingService<S>>,
  Path(national_id): Path<String>,
) -> Result<Json<RegistrationCount>, ApiError>
where
  S: BindingStore + 'static,
{
  let count = service.registration_count(&national_id).await?;
  Ok(Json(RegistrationCount { national_id, count }))
}

/// `GET /identities/{national_id}/fraud-reports` — the aggregated report
/// set across every binding of the national id.
pub async fn reports_for_identity<S>(
  State(service): State<BindingService<S>>,
  Path(national_id): Path<String>,
) -> Result<Json<Vec<FraudReport>>, ApiError>
where
  S: BindingStore + 'static,
{
  let reports = service.fraud_reports_for_identity(&national_id).await?;
  Ok(Json(reports))
}

/// `GET /bindings/{phone}/fraud-reports` — reports for one phone number.
pub async fn reports_for_phone<S>(
  State(service): State<BindingService<S>>,
  Path(phone): Path<String>,
) -> Result<Json<Vec<FraudReport>>, ApiError>
where
  S: BindingStore + 'static,
{
  let reports = service.fraud_reports_for_phone(&phone).await?;
  Ok(Json(reports))
}

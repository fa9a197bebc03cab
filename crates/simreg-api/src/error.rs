//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is rendered as
//! `{"error": {"kind": <stable string>, "message": <text>}}` so callers can
//! branch on the kind without parsing prose.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// A request field failed validation before reaching the registry.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Registry(#[from] simreg_core::Error),
}

impl ApiError {
  fn kind(&self) -> &'static str {
    match self {
      Self::BadRequest(_) => "bad_request",
      Self::Registry(e) => e.kind(),
    }
  }

  fn status(&self) -> StatusCode {
    use simreg_core::Error as E;
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Registry(E::NotRegistered(_)) => StatusCode::NOT_FOUND,
      Self::Registry(E::IdentityMismatch) => StatusCode::FORBIDDEN,
      Self::Registry(
        E::AlreadyRegistered { .. }
        | E::RegistrationCapReached { .. }
        | E::FraudAssociated { .. }
        | E::SwapFailed(_),
      ) => StatusCode::CONFLICT,
      Self::Registry(E::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = json!({
      "error": { "kind": self.kind(), "message": self.to_string() }
    });
    (status, Json(body)).into_response()
  }
}

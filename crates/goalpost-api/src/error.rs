//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every handler failure lands in one of four categories. The response body
//! is always `{"error": "<message>"}`. Internal failures are logged in full
//! and answered with a generic message.

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
  /// A required identifier (owner, goal id) was missing.
  #[error("unauthorized")]
  Unauthorized,

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("internal failure: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a storage backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Internal(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<goalpost_core::Error> for ApiError {
  fn from(e: goalpost_core::Error) -> Self { Self::InvalidInput(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Unauthorized => "Unauthorized".to_owned(),
      ApiError::InvalidInput(m) => format!("Invalid request: {m}"),
      ApiError::NotFound(_) => "Goal not found".to_owned(),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        "Internal server error".to_owned()
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use bleach_core::entity::EntityKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// A refresh was needed but a catalog is empty.
  #[error("no data available for {0}")]
  NoData(EntityKind),

  #[error("internal error: {0}")]
  Internal(#[source] bleach_core::Error),
}

impl From<bleach_core::Error> for ApiError {
  fn from(e: bleach_core::Error) -> Self {
    match e {
      bleach_core::Error::NoData(kind) => ApiError::NoData(kind),
      other => ApiError::Internal(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::NoData(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
      }
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

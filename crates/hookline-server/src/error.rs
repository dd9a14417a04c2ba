//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Storage being unreachable is deliberately not represented for the
/// ingestion and query paths — those degrade inside the gateway instead.
/// The retention sweep is the exception: it has nothing useful to report
/// without a store.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("content type must be application/json")]
  UnsupportedContentType,

  #[error("{0}")]
  Malformed(#[from] hookline_core::Error),

  #[error("unknown seed kind: {0}")]
  UnknownSeedKind(String),

  #[error("storage unavailable")]
  StorageUnavailable,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::UnsupportedContentType
      | ApiError::Malformed(_)
      | ApiError::UnknownSeedKind(_) => StatusCode::BAD_REQUEST,
      ApiError::StorageUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

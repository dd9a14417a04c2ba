//! Handler for the `/cleanup` retention sweep.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/cleanup` | Deletes stale events; 500 when the store is unreachable |
//!
//! Stale means older than the configured retention window, or authored by
//! the `Unknown` sentinel (synthetic records that never had a real author).

use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use hookline_core::{
  normalize::UNKNOWN,
  store::{EventStore, StalePredicate},
};

use crate::{AppState, error::ApiError};

/// `POST /cleanup`
pub async fn sweep<S>(State(state): State<AppState<S>>) -> Result<Json<Value>, ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let predicate = StalePredicate {
    older_than:      Utc::now() - Duration::days(i64::from(state.config.retention_days)),
    sentinel_author: Some(UNKNOWN.to_string()),
  };

  let outcome = state
    .gateway
    .purge(&predicate)
    .await
    .ok_or(ApiError::StorageUnavailable)?;

  tracing::info!(
    deleted = outcome.deleted,
    remaining = outcome.remaining,
    "retention sweep complete"
  );

  Ok(Json(json!({
    "status": "success",
    "deleted": outcome.deleted,
    "remaining": outcome.remaining,
  })))
}

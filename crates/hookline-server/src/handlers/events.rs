//! Handler for the `/api/events` polling feed.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/events` | Optional `?limit=N`, capped at the configured query limit |
//!
//! Returns presented display records, newest first. An unreachable store
//! yields `[]`, never an error status — the dashboard keeps polling.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;

use hookline_core::{
  present::{DisplayRecord, present},
  store::EventStore,
};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
  pub limit: Option<usize>,
}

/// `GET /api/events[?limit=N]`
pub async fn latest<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<FeedParams>,
) -> Json<Vec<DisplayRecord>>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let cap = state.config.query_limit;
  let limit = params.limit.unwrap_or(cap).min(cap);

  let events = state.gateway.latest(limit).await;
  tracing::debug!(returned = events.len(), "serving event feed");

  Json(events.iter().map(present).collect())
}

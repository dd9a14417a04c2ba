//! Handler for the `/health` endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/health` | Always 200; `storage` reports connectivity |

use axum::{Json, extract::State};
use chrono::Utc;
use serde_json::{Value, json};

use hookline_core::store::EventStore;

use crate::AppState;

/// `GET /health`
pub async fn check<S>(State(state): State<AppState<S>>) -> Json<Value>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let status = state.gateway.status().await;

  Json(json!({
    "status": "ok",
    "service": "hookline",
    "storage": status.label(),
    "event_count": status.event_count(),
    "timestamp": Utc::now().to_rfc3339(),
  }))
}

//! Handler for the `/api/seed` endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/seed` | Body: `{"kind": "push" \| "pull_request" \| "merge" \| "ping"}` |
//!
//! Replays a canned producer payload through the real ingestion pipeline so
//! a deployment can be exercised without wiring up a live producer. Seeded
//! events are ordinary events; nothing marks them beyond their fixture
//! content.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use hookline_core::store::EventStore;

use crate::{AppState, error::ApiError, handlers::webhook};

#[derive(Debug, Deserialize)]
pub struct SeedBody {
  pub kind: String,
}

/// `POST /api/seed`
pub async fn seed<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SeedBody>,
) -> Result<Json<Value>, ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  let (kind, payload) =
    fixture(&body.kind).ok_or_else(|| ApiError::UnknownSeedKind(body.kind.clone()))?;

  tracing::info!(kind, "seeding canned payload");
  Ok(Json(webhook::ingest(&state, kind, &payload, Some("seeded")).await))
}

/// Canned payloads mirroring what the producer sends for each kind.
fn fixture(kind: &str) -> Option<(&'static str, Value)> {
  let now = Utc::now().to_rfc3339();
  match kind {
    "push" => Some((
      "push",
      json!({
        "ref": "refs/heads/main",
        "pusher": { "name": "Test User" },
        "sender": { "login": "testuser" },
        "repository": { "full_name": "test/repo" },
        "commits": [{ "id": "abc123", "message": "Test commit" }],
        "head_commit": { "timestamp": now },
      }),
    )),
    "pull_request" => Some((
      "pull_request",
      json!({
        "action": "opened",
        "pull_request": {
          "number": 1,
          "title": "Test PR",
          "user": { "login": "testuser" },
          "head": { "ref": "feature-branch" },
          "base": { "ref": "main" },
          "created_at": now,
        },
        "repository": { "full_name": "test/repo" },
        "sender": { "login": "testuser" },
      }),
    )),
    "merge" => Some((
      "pull_request",
      json!({
        "action": "closed",
        "pull_request": {
          "number": 1,
          "title": "Test PR",
          "merged": true,
          "merged_by": { "login": "testuser" },
          "head": { "ref": "feature-branch" },
          "base": { "ref": "main" },
          "merged_at": now,
        },
        "repository": { "full_name": "test/repo" },
        "sender": { "login": "testuser" },
      }),
    )),
    "ping" => Some(("ping", json!({ "zen": "Keep it logically awesome.", "hook_id": 1 }))),
    _ => None,
  }
}

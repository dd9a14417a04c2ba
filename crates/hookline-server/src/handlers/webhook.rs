//! Handler for the `/webhook` ingress endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/webhook` | Kind in `X-GitHub-Event`, delivery id in `X-GitHub-Delivery`; body is the producer's JSON payload |
//!
//! Pings are acknowledged before persistence is ever touched. Payloads with
//! no canonical mapping are acknowledged and dropped. A storage outage
//! downgrades the write to `"stored": false` — never an error status.

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
};
use bytes::Bytes;
use chrono::Utc;
use serde_json::{Value, json};

use hookline_core::{normalize, store::EventStore};

use crate::{AppState, error::ApiError, gateway::AppendOutcome};

/// Header carrying the producer's event kind.
pub const EVENT_KIND_HEADER: &str = "x-github-event";
/// Header carrying the producer's delivery identifier.
pub const DELIVERY_ID_HEADER: &str = "x-github-delivery";

/// `POST /webhook`
pub async fn receive<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Value>, ApiError>
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  if !is_json_content(&headers) {
    return Err(ApiError::UnsupportedContentType);
  }

  let kind = header_str(&headers, EVENT_KIND_HEADER).unwrap_or("unknown");
  let delivery_id = header_str(&headers, DELIVERY_ID_HEADER);

  let payload = normalize::parse_payload(&body)?;

  tracing::info!(kind, delivery_id, "webhook received");

  Ok(Json(ingest(&state, kind, &payload, delivery_id).await))
}

/// The shared ingestion pipeline: normalize, then append through the
/// gateway. Produces the response body for both the webhook and seed
/// routes.
pub(crate) async fn ingest<S>(
  state: &AppState<S>,
  kind: &str,
  payload: &Value,
  delivery_id: Option<&str>,
) -> Value
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  if kind == "ping" {
    return json!({ "status": "success", "event": "ping" });
  }

  let received_at = Utc::now();
  let Some(new_event) = normalize::normalize(kind, payload, received_at, delivery_id)
  else {
    tracing::info!(kind, "no canonical mapping, ignoring");
    return json!({ "status": "ignored" });
  };

  let label = new_event.action_label();
  match state.gateway.append(new_event).await {
    AppendOutcome::Stored(event) => {
      tracing::info!(action = %label, event_id = %event.event_id, "event stored");
      json!({ "status": "success", "event": label, "stored": true })
    }
    AppendOutcome::Dropped => {
      json!({ "status": "success", "event": label, "stored": false })
    }
  }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers.get(name).and_then(|v| v.to_str().ok())
}

fn is_json_content(headers: &HeaderMap) -> bool {
  header_str(headers, header::CONTENT_TYPE.as_str())
    .is_some_and(|ct| ct.starts_with("application/json"))
}

//! HTTP layer for the hookline event feed.
//!
//! Exposes an axum [`Router`] backed by any [`EventStore`], wrapped in the
//! reconnect-on-demand [`gateway::Gateway`]. Ingestion, the polling feed,
//! health, and retention are the whole surface; rendering a dashboard on
//! top of the feed is the caller's problem.

pub mod error;
pub mod gateway;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use hookline_core::store::EventStore;

use gateway::Gateway;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// overridable through `HOOKLINE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Default and maximum number of records served per feed query.
  #[serde(default = "default_query_limit")]
  pub query_limit: usize,
  /// Events older than this many days are removed by the retention sweep.
  #[serde(default = "default_retention_days")]
  pub retention_days: u32,
  /// Upper bound on the storage handshake before a request proceeds on the
  /// unavailable path.
  #[serde(default = "default_connect_timeout_ms")]
  pub connect_timeout_ms: u64,
}

fn default_query_limit() -> usize { 50 }
fn default_retention_days() -> u32 { 7 }
fn default_connect_timeout_ms() -> u64 { 10_000 }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: EventStore> {
  pub gateway: Arc<Gateway<S>>,
  pub config:  Arc<ServerConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/webhook", post(handlers::webhook::receive::<S>))
    .route("/api/events", get(handlers::events::latest::<S>))
    .route("/api/seed", post(handlers::seed::seed::<S>))
    .route("/health", get(handlers::health::check::<S>))
    .route("/cleanup", post(handlers::cleanup::sweep::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

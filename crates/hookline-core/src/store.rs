//! The [`EventStore`] trait and retention types.
//!
//! Implemented by storage backends (`hookline-store-sqlite`). The HTTP
//! layer depends on this abstraction, never on a concrete backend, and
//! wraps it in a gateway that degrades gracefully when the backend is
//! unreachable.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::event::{Event, NewEvent};

// ─── Retention ───────────────────────────────────────────────────────────────

/// Which stored events the retention sweep deletes.
#[derive(Debug, Clone)]
pub struct StalePredicate {
  /// Events whose semantic timestamp sorts before this instant are stale.
  pub older_than:      DateTime<Utc>,
  /// Events authored by this sentinel are synthetic and stale regardless of
  /// age.
  pub sentinel_author: Option<String>,
}

/// What a retention sweep did.
#[derive(Debug, Clone, Copy)]
pub struct PurgeOutcome {
  pub deleted:   u64,
  pub remaining: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the event store backend.
///
/// Writes are append-only; there is no update path. All methods return
/// `Send` futures so implementations drop cleanly into a multi-threaded
/// async runtime.
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a normalized event, assigning its id. Returns the stored
  /// form.
  fn append(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// The most recent events, ordered by semantic timestamp descending, at
  /// most `limit` of them.
  fn latest(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Total number of stored events.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Delete every event matching `predicate` and report what happened.
  fn purge_stale<'a>(
    &'a self,
    predicate: &'a StalePredicate,
  ) -> impl Future<Output = Result<PurgeOutcome, Self::Error>> + Send + 'a;
}

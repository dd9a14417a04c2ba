//! The event store gateway — a lazily-connected, reconnect-on-demand
//! wrapper around an [`EventStore`] backend.
//!
//! Storage being down is an expected condition here, not an error: writes
//! degrade to "accepted but not stored", reads to an empty result, health
//! to "disconnected". Every degradation is logged and none of them fails
//! the enclosing request. A connection is attempted on first use and again
//! whenever a request finds the slot empty; the handshake is bounded by the
//! configured timeout. A handle that produces a storage error is dropped so
//! the next request reconnects from scratch.

use std::{future::Future, pin::Pin, time::Duration};

use tokio::sync::RwLock;

use hookline_core::{
  event::{Event, NewEvent},
  store::{EventStore, PurgeOutcome, StalePredicate},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type ConnectFuture<S> = Pin<Box<dyn Future<Output = Result<S, BoxError>> + Send>>;
type Connector<S> = Box<dyn Fn() -> ConnectFuture<S> + Send + Sync>;

/// Whether an append made it to durable storage.
#[derive(Debug)]
pub enum AppendOutcome {
  /// The event was persisted; the stored form is returned.
  Stored(Event),
  /// The store was unavailable or the insert failed; the event was dropped.
  Dropped,
}

/// Health view of the store, as reported by [`Gateway::status`].
#[derive(Debug, Clone, Copy)]
pub enum StorageStatus {
  Connected { events: u64 },
  Disconnected,
}

impl StorageStatus {
  pub fn label(&self) -> &'static str {
    match self {
      Self::Connected { .. } => "connected",
      Self::Disconnected => "disconnected",
    }
  }

  pub fn event_count(&self) -> u64 {
    match self {
      Self::Connected { events } => *events,
      Self::Disconnected => 0,
    }
  }
}

// ─── Gateway ─────────────────────────────────────────────────────────────────

pub struct Gateway<S> {
  slot:    RwLock<Option<S>>,
  connect: Connector<S>,
  timeout: Duration,
}

impl<S> Gateway<S>
where
  S: EventStore + Clone,
{
  /// Build a gateway over `connect`. No connection is attempted until the
  /// first request needs one.
  pub fn new<F, Fut, E>(connect: F, timeout: Duration) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
  {
    let connect: Connector<S> = Box::new(move || {
      let fut = connect();
      Box::pin(async move { fut.await.map_err(|e| Box::new(e) as BoxError) })
    });

    Self {
      slot: RwLock::new(None),
      connect,
      timeout,
    }
  }

  /// Current store handle, connecting first if none is held. `None` means
  /// the store is unavailable right now.
  async fn acquire(&self) -> Option<S> {
    if let Some(store) = self.slot.read().await.as_ref() {
      return Some(store.clone());
    }

    let mut slot = self.slot.write().await;
    // A concurrent request may have connected while we waited for the lock.
    if let Some(store) = slot.as_ref() {
      return Some(store.clone());
    }

    match tokio::time::timeout(self.timeout, (self.connect)()).await {
      Ok(Ok(store)) => {
        tracing::info!("event store connected");
        *slot = Some(store.clone());
        Some(store)
      }
      Ok(Err(e)) => {
        tracing::warn!("event store unavailable: {e}");
        None
      }
      Err(_) => {
        tracing::warn!(timeout = ?self.timeout, "event store handshake timed out");
        None
      }
    }
  }

  /// Drop the held handle so the next request reconnects.
  async fn invalidate(&self) {
    *self.slot.write().await = None;
  }

  /// Append one event, degrading to a dropped write if the store is down.
  pub async fn append(&self, input: NewEvent) -> AppendOutcome {
    let Some(store) = self.acquire().await else {
      tracing::warn!(
        action = %input.action_label(),
        "store unavailable, dropping event"
      );
      return AppendOutcome::Dropped;
    };

    match store.append(input).await {
      Ok(event) => AppendOutcome::Stored(event),
      Err(e) => {
        tracing::warn!("append failed, dropping event: {e}");
        self.invalidate().await;
        AppendOutcome::Dropped
      }
    }
  }

  /// The latest `limit` events, newest first; empty when the store is down.
  pub async fn latest(&self, limit: usize) -> Vec<Event> {
    let Some(store) = self.acquire().await else {
      return Vec::new();
    };

    match store.latest(limit).await {
      Ok(events) => events,
      Err(e) => {
        tracing::warn!("query failed, serving empty feed: {e}");
        self.invalidate().await;
        Vec::new()
      }
    }
  }

  /// Connectivity plus stored-event count, for the health endpoint.
  pub async fn status(&self) -> StorageStatus {
    let Some(store) = self.acquire().await else {
      return StorageStatus::Disconnected;
    };

    match store.count().await {
      Ok(events) => StorageStatus::Connected { events },
      Err(e) => {
        tracing::warn!("count failed: {e}");
        self.invalidate().await;
        StorageStatus::Disconnected
      }
    }
  }

  /// Run the retention sweep; `None` when the store is unavailable.
  pub async fn purge(&self, predicate: &StalePredicate) -> Option<PurgeOutcome> {
    let store = self.acquire().await?;

    match store.purge_stale(predicate).await {
      Ok(outcome) => Some(outcome),
      Err(e) => {
        tracing::warn!("retention sweep failed: {e}");
        self.invalidate().await;
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use chrono::Utc;
  use thiserror::Error;

  use hookline_core::event::Action;
  use hookline_store_sqlite::SqliteStore;

  use super::*;

  #[derive(Debug, Error)]
  #[error("store failure")]
  struct StoreFailure;

  /// Connects without complaint, then fails every call.
  #[derive(Clone)]
  struct FailingStore;

  impl EventStore for FailingStore {
    type Error = StoreFailure;

    async fn append(&self, _input: NewEvent) -> Result<Event, StoreFailure> {
      Err(StoreFailure)
    }

    async fn latest(&self, _limit: usize) -> Result<Vec<Event>, StoreFailure> {
      Err(StoreFailure)
    }

    async fn count(&self) -> Result<u64, StoreFailure> {
      Err(StoreFailure)
    }

    async fn purge_stale(
      &self,
      _predicate: &StalePredicate,
    ) -> Result<PurgeOutcome, StoreFailure> {
      Err(StoreFailure)
    }
  }

  fn sample_event() -> NewEvent {
    NewEvent {
      action:          Action::Push,
      event_kind:      "push".to_string(),
      delivery_id:     None,
      author:          "alice".to_string(),
      repository:      "acme/widgets".to_string(),
      timestamp:       "2024-03-01T10:00:00Z".to_string(),
      to_branch:       Some("main".to_string()),
      from_branch:     None,
      commit_count:    Some(1),
      pr_number:       None,
      pr_title:        None,
      display_message: Some("alice pushed to main".to_string()),
      received_at:     Utc::now(),
    }
  }

  fn counting_failing_gateway() -> (Gateway<FailingStore>, Arc<AtomicUsize>) {
    let connects = Arc::new(AtomicUsize::new(0));
    let counter = connects.clone();
    let gateway = Gateway::new(
      move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, StoreFailure>(FailingStore) }
      },
      Duration::from_millis(500),
    );
    (gateway, connects)
  }

  #[tokio::test]
  async fn store_error_empties_the_slot_and_reconnects() {
    let (gateway, connects) = counting_failing_gateway();

    let first = gateway.append(sample_event()).await;
    assert!(matches!(first, AppendOutcome::Dropped));
    let second = gateway.append(sample_event()).await;
    assert!(matches!(second, AppendOutcome::Dropped));

    // The failing handle was dropped after the first error, so the second
    // append had to connect again.
    assert_eq!(connects.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn failing_reads_degrade_and_reconnect() {
    let (gateway, connects) = counting_failing_gateway();

    assert!(gateway.latest(10).await.is_empty());
    assert!(matches!(gateway.status().await, StorageStatus::Disconnected));

    let predicate = StalePredicate {
      older_than:      Utc::now(),
      sentinel_author: None,
    };
    assert!(gateway.purge(&predicate).await.is_none());

    // Each call found the slot emptied by the previous failure.
    assert_eq!(connects.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn healthy_store_is_connected_once_and_reused() {
    let connects = Arc::new(AtomicUsize::new(0));
    let counter = connects.clone();
    let store = SqliteStore::open_in_memory().await.unwrap();
    let gateway = Gateway::new(
      move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let store = store.clone();
        async move { Ok::<_, hookline_store_sqlite::Error>(store) }
      },
      Duration::from_millis(500),
    );

    let first = gateway.append(sample_event()).await;
    assert!(matches!(first, AppendOutcome::Stored(_)));
    let second = gateway.append(sample_event()).await;
    assert!(matches!(second, AppendOutcome::Stored(_)));
    assert_eq!(gateway.latest(10).await.len(), 2);

    assert_eq!(connects.load(Ordering::SeqCst), 1);
  }
}

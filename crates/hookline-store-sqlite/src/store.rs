//! [`SqliteStore`] — the SQLite implementation of [`EventStore`].

use std::path::Path;

use uuid::Uuid;

use hookline_core::{
  event::{Event, NewEvent},
  store::{EventStore, PurgeOutcome, StalePredicate},
};

use crate::{
  Result,
  encode::{RawEvent, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hookline event store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:        row.get(0)?,
    action:          row.get(1)?,
    event_kind:      row.get(2)?,
    delivery_id:     row.get(3)?,
    author:          row.get(4)?,
    repository:      row.get(5)?,
    timestamp:       row.get(6)?,
    to_branch:       row.get(7)?,
    from_branch:     row.get(8)?,
    commit_count:    row.get(9)?,
    pr_number:       row.get(10)?,
    pr_title:        row.get(11)?,
    display_message: row.get(12)?,
    received_at:     row.get(13)?,
  })
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = crate::Error;

  async fn append(&self, input: NewEvent) -> Result<Event> {
    let event = Event {
      event_id:        Uuid::new_v4(),
      action:          input.action,
      event_kind:      input.event_kind,
      delivery_id:     input.delivery_id,
      author:          input.author,
      repository:      input.repository,
      timestamp:       input.timestamp,
      to_branch:       input.to_branch,
      from_branch:     input.from_branch,
      commit_count:    input.commit_count,
      pr_number:       input.pr_number,
      pr_title:        input.pr_title,
      display_message: input.display_message,
      received_at:     input.received_at,
    };

    let event_id_str    = encode_uuid(event.event_id);
    let action_str      = event.action_label();
    let event_kind      = event.event_kind.clone();
    let delivery_id     = event.delivery_id.clone();
    let author          = event.author.clone();
    let repository      = event.repository.clone();
    let timestamp       = event.timestamp.clone();
    let to_branch       = event.to_branch.clone();
    let from_branch     = event.from_branch.clone();
    let commit_count    = event.commit_count.map(i64::from);
    let pr_number       = event.pr_number;
    let pr_title        = event.pr_title.clone();
    let display_message = event.display_message.clone();
    let received_at_str = encode_dt(event.received_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             event_id, action, event_kind, delivery_id, author, repository,
             timestamp, to_branch, from_branch, commit_count, pr_number,
             pr_title, display_message, received_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
          rusqlite::params![
            event_id_str,
            action_str,
            event_kind,
            delivery_id,
            author,
            repository,
            timestamp,
            to_branch,
            from_branch,
            commit_count,
            pr_number,
            pr_title,
            display_message,
            received_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn latest(&self, limit: usize) -> Result<Vec<Event>> {
    let limit_val = limit as i64;

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             event_id, action, event_kind, delivery_id, author, repository,
             timestamp, to_branch, from_branch, commit_count, pr_number,
             pr_title, display_message, received_at
           FROM events
           ORDER BY timestamp DESC
           LIMIT ?1",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![limit_val], read_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?)
      })
      .await?;

    Ok(n as u64)
  }

  async fn purge_stale(&self, predicate: &StalePredicate) -> Result<PurgeOutcome> {
    let cutoff_str = encode_dt(predicate.older_than);
    let sentinel   = predicate.sentinel_author.clone();

    let (deleted, remaining): (usize, i64) = self
      .conn
      .call(move |conn| {
        let deleted = match &sentinel {
          Some(author) => conn.execute(
            "DELETE FROM events WHERE timestamp < ?1 OR author = ?2",
            rusqlite::params![cutoff_str, author],
          )?,
          None => conn.execute(
            "DELETE FROM events WHERE timestamp < ?1",
            rusqlite::params![cutoff_str],
          )?,
        };

        let remaining: i64 =
          conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;

        Ok((deleted, remaining))
      })
      .await?;

    Ok(PurgeOutcome {
      deleted:   deleted as u64,
      remaining: remaining as u64,
    })
  }
}

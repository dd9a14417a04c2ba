//! Encoding and decoding between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Store-assigned instants are RFC 3339 strings; the event's own semantic
//! timestamp column keeps whatever string the producer sent. UUIDs are
//! stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use hookline_core::event::{Action, Event};

use crate::{Error, Result};

// ─── Scalar codecs ───────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Stored action label to enum. Total: an unrecognized label (a drifted or
/// producer-specific row) decodes as `Other`.
pub fn decode_action(label: &str) -> Action {
  match label {
    "PUSH" => Action::Push,
    "PULL_REQUEST" => Action::PullRequest,
    "MERGE" => Action::Merge,
    _ => Action::Other,
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw column values read straight from an `events` row.
pub struct RawEvent {
  pub event_id:        String,
  pub action:          String,
  pub event_kind:      String,
  pub delivery_id:     Option<String>,
  pub author:          String,
  pub repository:      String,
  pub timestamp:       String,
  pub to_branch:       Option<String>,
  pub from_branch:     Option<String>,
  pub commit_count:    Option<i64>,
  pub pr_number:       Option<i64>,
  pub pr_title:        Option<String>,
  pub display_message: Option<String>,
  pub received_at:     String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:        decode_uuid(&self.event_id)?,
      action:          decode_action(&self.action),
      event_kind:      self.event_kind,
      delivery_id:     self.delivery_id,
      author:          self.author,
      repository:      self.repository,
      timestamp:       self.timestamp,
      to_branch:       self.to_branch,
      from_branch:     self.from_branch,
      commit_count:    self
        .commit_count
        .map(|n| u32::try_from(n).unwrap_or_default()),
      pr_number:       self.pr_number,
      pr_title:        self.pr_title,
      display_message: self.display_message,
      received_at:     decode_dt(&self.received_at)?,
    })
  }
}

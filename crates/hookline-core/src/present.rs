//! The presentation mapper — turns stored events into the JSON records the
//! polling dashboard consumes.
//!
//! The stored `display_message` is authoritative. Rebuilding a message from
//! typed fields happens only for rows written before the field existed, and
//! uses the same templates the normalizer writes with, so the two paths
//! cannot disagree.

use serde::Serialize;

use crate::{
  event::{Event, message_body},
  timefmt,
};

/// One presented event, ready for the dashboard.
///
/// Branch and PR fields are echoed only when the stored event carries them;
/// absent fields are omitted from the JSON rather than emitted as null.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayRecord {
  pub action:             String,
  pub author:             String,
  /// Human-formatted form of the event's semantic timestamp.
  pub timestamp:          String,
  /// The stored message with the formatted timestamp appended.
  pub message:            String,
  /// The raw stored timestamp, for callers that sort or link on it.
  pub original_timestamp: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub to_branch:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub from_branch:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pr_number:          Option<i64>,
}

/// Map one stored event to its display record.
pub fn present(event: &Event) -> DisplayRecord {
  let formatted = timefmt::format(&event.timestamp);

  let body = match &event.display_message {
    Some(m) if !m.is_empty() => m.clone(),
    // Rows that predate the stored message; rebuild with the write-time
    // templates.
    _ => message_body(
      event.action,
      &event.event_kind,
      &event.author,
      event.from_branch.as_deref(),
      event.to_branch.as_deref(),
      event.pr_number,
    ),
  };

  DisplayRecord {
    action:             event.action_label(),
    author:             event.author.clone(),
    message:            format!("{body} on {formatted}"),
    timestamp:          formatted,
    original_timestamp: event.timestamp.clone(),
    to_branch:          event.to_branch.clone(),
    from_branch:        event.from_branch.clone(),
    pr_number:          event.pr_number,
  }
}

//! Canonical event records.
//!
//! Every upstream notification that survives normalization collapses into
//! one flat [`Event`]. Events are immutable once stored; the only write
//! operations anywhere in the system are the insert and the retention
//! sweep's bulk delete.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// ─── Action ──────────────────────────────────────────────────────────────────

/// The canonical kind of a stored event.
///
/// `Other` covers every producer kind outside the three modeled ones; the
/// producer's own kind string is retained alongside it on the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Push,
  PullRequest,
  Merge,
  Other,
}

impl Action {
  /// The fixed label for the three modeled kinds. `Other` events take the
  /// uppercased producer kind instead; see [`Event::action_label`].
  pub fn label(&self) -> &'static str {
    match self {
      Self::Push => "PUSH",
      Self::PullRequest => "PULL_REQUEST",
      Self::Merge => "MERGE",
      Self::Other => "OTHER",
    }
  }
}

fn label_for(action: Action, event_kind: &str) -> String {
  match action {
    Action::Other => event_kind.to_uppercase(),
    modeled => modeled.label().to_string(),
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// A normalized, persisted notification.
#[derive(Debug, Clone)]
pub struct Event {
  pub event_id:        Uuid,
  pub action:          Action,
  /// The producer's own kind string, verbatim (`"push"`, `"issues"`, ...).
  pub event_kind:      String,
  /// Opaque delivery identifier from the producer, kept for audit.
  pub delivery_id:     Option<String>,
  pub author:          String,
  pub repository:      String,
  /// Semantic instant of the event as the producer reported it (commit
  /// time, PR creation time, merge time), or the ingestion instant when the
  /// payload carried none. Kept as the raw ISO 8601 string so the original
  /// value survives verbatim.
  pub timestamp:       String,
  /// Target branch, never `refs/heads/`-qualified.
  pub to_branch:       Option<String>,
  /// Source branch for pull requests and merges.
  pub from_branch:     Option<String>,
  pub commit_count:    Option<u32>,
  pub pr_number:       Option<i64>,
  pub pr_title:        Option<String>,
  /// Human sentence synthesized at write time. Authoritative: never
  /// recomputed for records that carry one. `None` only on rows written
  /// before the field existed.
  pub display_message: Option<String>,
  /// Ingestion instant; distinct from `timestamp`.
  pub received_at:     DateTime<Utc>,
}

impl Event {
  /// Action label as stored and displayed: the fixed name for the three
  /// modeled kinds, the uppercased producer kind for `Other`.
  pub fn action_label(&self) -> String { label_for(self.action, &self.event_kind) }
}

/// Input to [`crate::store::EventStore::append`]. The store assigns
/// `event_id`; it is never accepted from callers.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub action:          Action,
  pub event_kind:      String,
  pub delivery_id:     Option<String>,
  pub author:          String,
  pub repository:      String,
  pub timestamp:       String,
  pub to_branch:       Option<String>,
  pub from_branch:     Option<String>,
  pub commit_count:    Option<u32>,
  pub pr_number:       Option<i64>,
  pub pr_title:        Option<String>,
  pub display_message: Option<String>,
  pub received_at:     DateTime<Utc>,
}

impl NewEvent {
  pub fn action_label(&self) -> String { label_for(self.action, &self.event_kind) }
}

// ─── Message templates ───────────────────────────────────────────────────────

/// Fixed message templates, one per action kind.
///
/// Shared by the normalizer (synthesizing `display_message` at ingestion)
/// and the presentation mapper (rebuilding messages for rows that predate
/// the stored field), so the two paths cannot drift apart.
pub(crate) fn message_body(
  action: Action,
  event_kind: &str,
  author: &str,
  from_branch: Option<&str>,
  to_branch: Option<&str>,
  pr_number: Option<i64>,
) -> String {
  match action {
    Action::Push => {
      format!("{author} pushed to {}", to_branch.unwrap_or_default())
    }
    Action::PullRequest => format!(
      "{author} submitted pull request #{} from {} to {}",
      pr_label(pr_number),
      from_branch.unwrap_or("feature"),
      to_branch.unwrap_or("main"),
    ),
    Action::Merge => format!(
      "{author} merged pull request #{} from {} to {}",
      pr_label(pr_number),
      from_branch.unwrap_or("feature"),
      to_branch.unwrap_or("main"),
    ),
    Action::Other => format!("{author} triggered {event_kind} event"),
  }
}

/// A missing upstream PR number renders as `?`.
fn pr_label(n: Option<i64>) -> String {
  n.map_or_else(|| "?".to_string(), |v| v.to_string())
}

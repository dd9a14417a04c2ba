//! The event normalizer — collapses upstream notification payloads into
//! canonical [`NewEvent`] records.
//!
//! Dispatch is strictly on the producer's out-of-band event kind, never on
//! payload shape. Field access over the payload tree is total: a missing or
//! mistyped nested field degrades to its documented default and cannot
//! error. The only failure mode is a top-level body that is not well-formed
//! JSON, surfaced by [`parse_payload`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
  Error, Result,
  event::{Action, NewEvent, message_body},
};

/// Branch refs arrive fully qualified; stored branch fields never carry
/// this prefix.
const REF_PREFIX: &str = "refs/heads/";

/// Author/repository sentinel for fields no payload variant supplied. The
/// retention sweep also deletes events authored by this sentinel.
pub const UNKNOWN: &str = "Unknown";

// ─── Payload parsing ─────────────────────────────────────────────────────────

/// Parse a raw notification body into a JSON tree.
pub fn parse_payload(body: &[u8]) -> Result<Value> {
  serde_json::from_slice(body).map_err(|e| Error::MalformedPayload(e.to_string()))
}

// ─── Normalization ───────────────────────────────────────────────────────────

/// Normalize one notification into zero or one canonical event.
///
/// Returns `None` for payloads with no canonical mapping: `ping`
/// notifications, pull requests closed without a merge, and pull-request
/// sub-actions other than opened/reopened/closed.
pub fn normalize(
  kind: &str,
  payload: &Value,
  received_at: DateTime<Utc>,
  delivery_id: Option<&str>,
) -> Option<NewEvent> {
  match kind {
    "push" => Some(normalize_push(payload, received_at, delivery_id)),
    "pull_request" => normalize_pull_request(payload, received_at, delivery_id),
    "ping" => None,
    other => Some(normalize_other(other, payload, received_at, delivery_id)),
  }
}

fn normalize_push(
  payload: &Value,
  received_at: DateTime<Utc>,
  delivery_id: Option<&str>,
) -> NewEvent {
  let author = str_at(payload, &["pusher", "name"])
    .or_else(|| str_at(payload, &["sender", "login"]))
    .unwrap_or(UNKNOWN)
    .to_string();

  let to_branch = strip_ref_prefix(str_at(payload, &["ref"]).unwrap_or_default());

  let timestamp = str_at(payload, &["head_commit", "timestamp"])
    .map(str::to_string)
    .unwrap_or_else(|| received_at.to_rfc3339());

  let commit_count = payload
    .get("commits")
    .and_then(Value::as_array)
    .map_or(0, Vec::len) as u32;

  let display_message =
    message_body(Action::Push, "push", &author, None, Some(&to_branch), None);

  NewEvent {
    action:          Action::Push,
    event_kind:      "push".to_string(),
    delivery_id:     delivery_id.map(str::to_string),
    author,
    repository:      repository_slug(payload),
    timestamp,
    to_branch:       Some(to_branch),
    from_branch:     None,
    commit_count:    Some(commit_count),
    pr_number:       None,
    pr_title:        None,
    display_message: Some(display_message),
    received_at,
  }
}

fn normalize_pull_request(
  payload: &Value,
  received_at: DateTime<Utc>,
  delivery_id: Option<&str>,
) -> Option<NewEvent> {
  let sub_action = str_at(payload, &["action"]).unwrap_or_default();

  let from_branch =
    strip_ref_prefix(str_at(payload, &["pull_request", "head", "ref"]).unwrap_or("feature"));
  let to_branch =
    strip_ref_prefix(str_at(payload, &["pull_request", "base", "ref"]).unwrap_or("main"));
  let pr_number = i64_at(payload, &["pull_request", "number"]);
  let pr_title = str_at(payload, &["pull_request", "title"])
    .unwrap_or("No title")
    .to_string();

  let (action, author, timestamp) = match sub_action {
    "opened" | "reopened" => {
      let author = str_at(payload, &["pull_request", "user", "login"])
        .unwrap_or(UNKNOWN)
        .to_string();
      let timestamp = str_at(payload, &["pull_request", "created_at"])
        .map(str::to_string)
        .unwrap_or_else(|| received_at.to_rfc3339());
      (Action::PullRequest, author, timestamp)
    }
    "closed" if bool_at(payload, &["pull_request", "merged"]) => {
      let author = str_at(payload, &["pull_request", "merged_by", "login"])
        .or_else(|| str_at(payload, &["sender", "login"]))
        .unwrap_or(UNKNOWN)
        .to_string();
      let timestamp = str_at(payload, &["pull_request", "merged_at"])
        .map(str::to_string)
        .unwrap_or_else(|| received_at.to_rfc3339());
      (Action::Merge, author, timestamp)
    }
    // Closed without a merge, or a sub-action we don't model.
    _ => return None,
  };

  let display_message = message_body(
    action,
    "pull_request",
    &author,
    Some(&from_branch),
    Some(&to_branch),
    pr_number,
  );

  Some(NewEvent {
    action,
    event_kind:      "pull_request".to_string(),
    delivery_id:     delivery_id.map(str::to_string),
    author,
    repository:      repository_slug(payload),
    timestamp,
    to_branch:       Some(to_branch),
    from_branch:     Some(from_branch),
    commit_count:    None,
    pr_number,
    pr_title:        Some(pr_title),
    display_message: Some(display_message),
    received_at,
  })
}

fn normalize_other(
  kind: &str,
  payload: &Value,
  received_at: DateTime<Utc>,
  delivery_id: Option<&str>,
) -> NewEvent {
  let author = str_at(payload, &["sender", "login"])
    .unwrap_or(UNKNOWN)
    .to_string();

  let display_message = message_body(Action::Other, kind, &author, None, None, None);

  NewEvent {
    action:          Action::Other,
    event_kind:      kind.to_string(),
    delivery_id:     delivery_id.map(str::to_string),
    author,
    repository:      repository_slug(payload),
    timestamp:       received_at.to_rfc3339(),
    to_branch:       None,
    from_branch:     None,
    commit_count:    None,
    pr_number:       None,
    pr_title:        None,
    display_message: Some(display_message),
    received_at,
  }
}

fn repository_slug(payload: &Value) -> String {
  str_at(payload, &["repository", "full_name"])
    .unwrap_or(UNKNOWN)
    .to_string()
}

fn strip_ref_prefix(r: &str) -> String {
  r.strip_prefix(REF_PREFIX).unwrap_or(r).to_string()
}

// ─── Total field access ──────────────────────────────────────────────────────

/// Walk a path of object keys, yielding the string at the end if every hop
/// exists, the leaf is a string, and it is non-empty.
fn str_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a str> {
  value_at(payload, path)
    .and_then(Value::as_str)
    .filter(|s| !s.is_empty())
}

fn bool_at(payload: &Value, path: &[&str]) -> bool {
  value_at(payload, path)
    .and_then(Value::as_bool)
    .unwrap_or(false)
}

fn i64_at(payload: &Value, path: &[&str]) -> Option<i64> {
  value_at(payload, path).and_then(Value::as_i64)
}

fn value_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
  path.iter().try_fold(payload, |node, key| node.get(key))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  fn received() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap()
  }

  #[test]
  fn push_strips_ref_prefix_and_reads_commit_time() {
    let payload = json!({
      "ref": "refs/heads/feature-x",
      "pusher": { "name": "alice" },
      "sender": { "login": "alice-login" },
      "repository": { "full_name": "acme/widgets" },
      "head_commit": { "timestamp": "2024-03-03T11:58:00Z" },
      "commits": [{ "id": "a" }, { "id": "b" }],
    });

    let event = normalize("push", &payload, received(), Some("d-1")).unwrap();
    assert_eq!(event.action, Action::Push);
    assert_eq!(event.author, "alice");
    assert_eq!(event.to_branch.as_deref(), Some("feature-x"));
    assert_eq!(event.timestamp, "2024-03-03T11:58:00Z");
    assert_eq!(event.commit_count, Some(2));
    assert_eq!(event.repository, "acme/widgets");
    assert_eq!(event.delivery_id.as_deref(), Some("d-1"));
    assert_eq!(
      event.display_message.as_deref(),
      Some("alice pushed to feature-x")
    );
  }

  #[test]
  fn push_passes_unqualified_ref_through() {
    let payload = json!({ "ref": "main", "pusher": { "name": "alice" } });

    let event = normalize("push", &payload, received(), None).unwrap();
    assert_eq!(event.to_branch.as_deref(), Some("main"));
  }

  #[test]
  fn push_falls_back_to_sender_and_ingestion_time() {
    let payload = json!({
      "ref": "refs/heads/main",
      "pusher": { "name": "" },
      "sender": { "login": "bob" },
    });

    let event = normalize("push", &payload, received(), None).unwrap();
    assert_eq!(event.author, "bob");
    assert_eq!(event.timestamp, received().to_rfc3339());
    assert_eq!(event.commit_count, Some(0));
  }

  #[test]
  fn push_with_empty_payload_degrades_to_sentinels() {
    let event = normalize("push", &json!({}), received(), None).unwrap();
    assert_eq!(event.author, UNKNOWN);
    assert_eq!(event.repository, UNKNOWN);
    assert_eq!(event.to_branch.as_deref(), Some(""));
    assert_eq!(event.commit_count, Some(0));
  }

  #[test]
  fn opened_pull_request_maps_fields() {
    let payload = json!({
      "action": "opened",
      "pull_request": {
        "number": 7,
        "title": "Add feature",
        "user": { "login": "carol" },
        "head": { "ref": "feature-y" },
        "base": { "ref": "develop" },
        "created_at": "2024-03-02T09:30:00Z",
      },
      "repository": { "full_name": "acme/widgets" },
      "sender": { "login": "carol" },
    });

    let event = normalize("pull_request", &payload, received(), None).unwrap();
    assert_eq!(event.action, Action::PullRequest);
    assert_eq!(event.author, "carol");
    assert_eq!(event.from_branch.as_deref(), Some("feature-y"));
    assert_eq!(event.to_branch.as_deref(), Some("develop"));
    assert_eq!(event.pr_number, Some(7));
    assert_eq!(event.pr_title.as_deref(), Some("Add feature"));
    assert_eq!(event.timestamp, "2024-03-02T09:30:00Z");
    assert_eq!(
      event.display_message.as_deref(),
      Some("carol submitted pull request #7 from feature-y to develop")
    );
  }

  #[test]
  fn reopened_pull_request_is_treated_like_opened() {
    let payload = json!({
      "action": "reopened",
      "pull_request": { "number": 3, "user": { "login": "carol" } },
    });

    let event = normalize("pull_request", &payload, received(), None).unwrap();
    assert_eq!(event.action, Action::PullRequest);
    assert_eq!(event.from_branch.as_deref(), Some("feature"));
    assert_eq!(event.to_branch.as_deref(), Some("main"));
    assert_eq!(event.pr_title.as_deref(), Some("No title"));
  }

  #[test]
  fn merged_close_becomes_merge_event() {
    let payload = json!({
      "action": "closed",
      "pull_request": {
        "number": 9,
        "merged": true,
        "merged_by": { "login": "dave" },
        "merged_at": "2024-03-03T10:00:00Z",
        "head": { "ref": "hotfix" },
        "base": { "ref": "main" },
      },
      "sender": { "login": "someone-else" },
    });

    let event = normalize("pull_request", &payload, received(), None).unwrap();
    assert_eq!(event.action, Action::Merge);
    assert_eq!(event.author, "dave");
    assert_eq!(event.timestamp, "2024-03-03T10:00:00Z");
    assert_eq!(
      event.display_message.as_deref(),
      Some("dave merged pull request #9 from hotfix to main")
    );
  }

  #[test]
  fn merge_author_falls_back_to_sender() {
    let payload = json!({
      "action": "closed",
      "pull_request": { "number": 9, "merged": true },
      "sender": { "login": "erin" },
    });

    let event = normalize("pull_request", &payload, received(), None).unwrap();
    assert_eq!(event.action, Action::Merge);
    assert_eq!(event.author, "erin");
    assert_eq!(event.timestamp, received().to_rfc3339());
  }

  #[test]
  fn unmerged_close_is_dropped() {
    let payload = json!({
      "action": "closed",
      "pull_request": { "number": 4, "merged": false },
    });

    assert!(normalize("pull_request", &payload, received(), None).is_none());
  }

  #[test]
  fn unmodeled_sub_action_is_dropped() {
    let payload = json!({
      "action": "labeled",
      "pull_request": { "number": 4 },
    });

    assert!(normalize("pull_request", &payload, received(), None).is_none());
  }

  #[test]
  fn ping_has_no_canonical_mapping() {
    assert!(normalize("ping", &json!({ "zen": "Design" }), received(), None).is_none());
  }

  #[test]
  fn unmodeled_kind_becomes_other() {
    let payload = json!({
      "sender": { "login": "frank" },
      "repository": { "full_name": "acme/widgets" },
    });

    let event = normalize("issues", &payload, received(), None).unwrap();
    assert_eq!(event.action, Action::Other);
    assert_eq!(event.event_kind, "issues");
    assert_eq!(event.action_label(), "ISSUES");
    assert_eq!(event.timestamp, received().to_rfc3339());
    assert_eq!(
      event.display_message.as_deref(),
      Some("frank triggered issues event")
    );
  }

  #[test]
  fn mistyped_fields_degrade_instead_of_failing() {
    let payload = json!({
      "ref": 42,
      "pusher": "not-an-object",
      "commits": "not-an-array",
    });

    let event = normalize("push", &payload, received(), None).unwrap();
    assert_eq!(event.author, UNKNOWN);
    assert_eq!(event.to_branch.as_deref(), Some(""));
    assert_eq!(event.commit_count, Some(0));
  }

  #[test]
  fn parse_payload_rejects_non_json() {
    let err = parse_payload(b"not json at all").unwrap_err();
    assert!(matches!(err, Error::MalformedPayload(_)));
  }

  #[test]
  fn parse_payload_accepts_any_top_level_json() {
    assert!(parse_payload(b"{\"a\": 1}").is_ok());
    assert!(parse_payload(b"[]").is_ok());
  }
}

//! SQL schema for the hookline SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Events are written once and never updated.
-- The only delete path is the retention sweep.
CREATE TABLE IF NOT EXISTS events (
    event_id        TEXT PRIMARY KEY,
    action          TEXT NOT NULL,   -- 'PUSH' | 'PULL_REQUEST' | 'MERGE' | uppercased producer kind
    event_kind      TEXT NOT NULL,   -- producer kind string as received
    delivery_id     TEXT,
    author          TEXT NOT NULL,
    repository      TEXT NOT NULL,
    timestamp       TEXT NOT NULL,   -- semantic instant; raw ISO 8601 string
    to_branch       TEXT,
    from_branch     TEXT,
    commit_count    INTEGER,
    pr_number       INTEGER,
    pr_title        TEXT,
    display_message TEXT,            -- NULL only on rows predating the column
    received_at     TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS events_timestamp_idx ON events(timestamp);
CREATE INDEX IF NOT EXISTS events_author_idx    ON events(author);

PRAGMA user_version = 1;
";

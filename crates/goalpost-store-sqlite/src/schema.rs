//! SQL schema for the Goalpost SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per goal. A goal is addressed by (owner_id, goal_id); `seq` only
-- records insertion order so listings come back in storage order.
CREATE TABLE IF NOT EXISTS goals (
    seq           INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id      TEXT NOT NULL,
    goal_id       TEXT NOT NULL,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL,
    goal_type     TEXT NOT NULL,   -- 'time' | 'count' | 'simple'
    value         TEXT NOT NULL,
    current_value TEXT,
    deadline      TEXT NOT NULL,   -- ISO 8601 UTC
    status        TEXT NOT NULL DEFAULT 'active'
                  CHECK (status IN ('active', 'completed', 'expired')),
    created_by    TEXT,
    created_at    TEXT,            -- ISO 8601 UTC or NULL
    UNIQUE (owner_id, goal_id)
);

CREATE INDEX IF NOT EXISTS goals_owner_idx ON goals(owner_id, seq);

PRAGMA user_version = 1;
";

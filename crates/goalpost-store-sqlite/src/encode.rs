//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enumerations are stored as their wire names.

use chrono::{DateTime, Utc};
use goalpost_core::{
  goal::{Goal, GoalType},
  lifecycle::GoalStatus,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── GoalType ────────────────────────────────────────────────────────────────

pub fn encode_goal_type(t: GoalType) -> &'static str { t.as_str() }

pub fn decode_goal_type(s: &str) -> Result<GoalType> {
  match s {
    "time" => Ok(GoalType::Time),
    "count" => Ok(GoalType::Count),
    "simple" => Ok(GoalType::Simple),
    other => Err(Error::UnknownValue {
      column: "goal_type",
      value:  other.to_owned(),
    }),
  }
}

// ─── GoalStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: GoalStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<GoalStatus> {
  match s {
    "active" => Ok(GoalStatus::Active),
    "completed" => Ok(GoalStatus::Completed),
    "expired" => Ok(GoalStatus::Expired),
    other => Err(Error::UnknownValue {
      column: "status",
      value:  other.to_owned(),
    }),
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that produces a [`RawGoal`].
pub const GOAL_COLUMNS: &str = "goal_id, title, description, goal_type, value, \
                                current_value, deadline, status, created_by, \
                                created_at";

/// Raw strings read directly from a `goals` row.
pub struct RawGoal {
  pub goal_id:       String,
  pub title:         String,
  pub description:   String,
  pub goal_type:     String,
  pub value:         String,
  pub current_value: Option<String>,
  pub deadline:      String,
  pub status:        String,
  pub created_by:    Option<String>,
  pub created_at:    Option<String>,
}

impl RawGoal {
  /// Read a row selected with [`GOAL_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      goal_id:       row.get(0)?,
      title:         row.get(1)?,
      description:   row.get(2)?,
      goal_type:     row.get(3)?,
      value:         row.get(4)?,
      current_value: row.get(5)?,
      deadline:      row.get(6)?,
      status:        row.get(7)?,
      created_by:    row.get(8)?,
      created_at:    row.get(9)?,
    })
  }

  pub fn into_goal(self) -> Result<Goal> {
    Ok(Goal {
      id:            decode_uuid(&self.goal_id)?,
      title:         self.title,
      description:   self.description,
      goal_type:     decode_goal_type(&self.goal_type)?,
      value:         self.value,
      current_value: self.current_value,
      deadline:      decode_dt(&self.deadline)?,
      status:        decode_status(&self.status)?,
      created_by:    self.created_by,
      created_at:    self.created_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

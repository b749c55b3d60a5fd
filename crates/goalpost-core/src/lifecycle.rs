//! Goal status and the expiry rule.
//!
//! A goal starts `active`. It may be completed by its owner, or it expires on
//! its own once the deadline has passed. Both `completed` and `expired` are
//! terminal.
//!
//! Expiry is derived, not scheduled: nothing runs when a deadline passes.
//! Instead every read passes the stored goal through [`reconcile`], and the
//! reader persists the corrected status when it changed.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, goal::Goal};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
  #[default]
  Active,
  Completed,
  /// The deadline passed while the goal was still active.
  Expired,
}

impl GoalStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }

  pub fn is_terminal(&self) -> bool { !self.is_active() }

  /// Whether a goal in this status may move to `next`.
  ///
  /// Staying put is always allowed. `active -> expired` is legal here but is
  /// only taken by [`reconcile`]; patches cannot request it.
  pub fn can_transition_to(self, next: GoalStatus) -> bool {
    self == next
      || matches!(
        (self, next),
        (Self::Active, Self::Completed) | (Self::Active, Self::Expired)
      )
  }

  /// The string stored in the database and sent over the wire.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Completed => "completed",
      Self::Expired => "expired",
    }
  }
}

impl fmt::Display for GoalStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for GoalStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "active" => Ok(Self::Active),
      "completed" => Ok(Self::Completed),
      "expired" => Ok(Self::Expired),
      other => Err(Error::validation(
        "status",
        format!("unknown status {other:?}"),
      )),
    }
  }
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// Whether `goal` is still marked active although its deadline is behind
/// `now`. A deadline equal to `now` is not yet overdue.
pub fn is_overdue(goal: &Goal, now: DateTime<Utc>) -> bool {
  goal.status.is_active() && goal.deadline < now
}

/// Correct a goal's stored status against the clock.
///
/// Returns the goal, expired if it was overdue, together with whether
/// anything changed. When `changed` is `true` the caller must write the new
/// status back before handing the goal out.
pub fn reconcile(mut goal: Goal, now: DateTime<Utc>) -> (Goal, bool) {
  if is_overdue(&goal, now) {
    goal.status = GoalStatus::Expired;
    (goal, true)
  } else {
    (goal, false)
  }
}

//! Goal types: the single entity tracked by Goalpost.
//!
//! A goal is owned by exactly one user. Ownership is not a field on the goal:
//! it is the key under which the store files the record.
//!
//! Incoming payloads come in two shapes. [`GoalDraft`] is the create payload
//! and is validated into a [`NewGoal`]. [`GoalPatch`] is the partial update
//! payload; it uses the same field rules but every field is optional and
//! unknown keys are refused.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{Error, Result, lifecycle::GoalStatus};

/// Minimum title length, in characters, after trimming.
pub const TITLE_MIN_CHARS: usize = 2;
/// Inclusive description length bounds, in characters, after trimming.
pub const DESCRIPTION_MIN_CHARS: usize = 5;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

// ─── GoalType ────────────────────────────────────────────────────────────────

/// How `value` and `current_value` are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
  /// An amount of time, e.g. "50 hours".
  Time,
  /// A number of repetitions, e.g. "10 tasks".
  Count,
  /// Done or not done.
  Simple,
}

impl GoalType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Time => "time",
      Self::Count => "count",
      Self::Simple => "simple",
    }
  }
}

impl std::str::FromStr for GoalType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "time" => Ok(Self::Time),
      "count" => Ok(Self::Count),
      "simple" => Ok(Self::Simple),
      other => Err(Error::validation(
        "goalType",
        format!("unknown goal type {other:?}"),
      )),
    }
  }
}

// ─── Goal ────────────────────────────────────────────────────────────────────

/// A persisted goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
  /// Assigned by the store on insert; never changes afterwards.
  pub id:            Uuid,
  pub title:         String,
  pub description:   String,
  pub goal_type:     GoalType,
  /// Target value; its unit is implied by `goal_type`.
  pub value:         String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_value: Option<String>,
  #[serde(deserialize_with = "deadline::deserialize")]
  pub deadline:      DateTime<Utc>,
  #[serde(default)]
  pub status:        GoalStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_by:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:    Option<DateTime<Utc>>,
}

impl Goal {
  /// Merge every field present in `patch` into this goal.
  ///
  /// No validation happens here; callers validate the patch first.
  pub fn apply(&mut self, patch: GoalPatch) {
    let GoalPatch {
      title,
      description,
      goal_type,
      value,
      current_value,
      deadline,
      status,
    } = patch;

    if let Some(title) = title {
      self.title = title;
    }
    if let Some(description) = description {
      self.description = description;
    }
    if let Some(goal_type) = goal_type {
      self.goal_type = goal_type;
    }
    if let Some(value) = value {
      self.value = value;
    }
    if let Some(current_value) = current_value {
      self.current_value = current_value;
    }
    if let Some(deadline) = deadline {
      self.deadline = deadline;
    }
    if let Some(status) = status {
      self.status = status;
    }
  }
}

// ─── NewGoal ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::GoalStore::insert`].
///
/// There is no status field: every new goal starts out
/// [`GoalStatus::Active`]. The `id` is always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewGoal {
  pub title:         String,
  pub description:   String,
  pub goal_type:     GoalType,
  pub value:         String,
  pub current_value: Option<String>,
  pub deadline:      DateTime<Utc>,
  pub created_by:    Option<String>,
  pub created_at:    Option<DateTime<Utc>>,
}

impl NewGoal {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(
    title: impl Into<String>,
    description: impl Into<String>,
    goal_type: GoalType,
    value: impl Into<String>,
    deadline: DateTime<Utc>,
  ) -> Self {
    Self {
      title: title.into(),
      description: description.into(),
      goal_type,
      value: value.into(),
      current_value: None,
      deadline,
      created_by: None,
      created_at: None,
    }
  }

  /// Build the stored form of this goal under a freshly assigned `id`.
  pub fn into_goal(self, id: Uuid) -> Goal {
    Goal {
      id,
      title: self.title,
      description: self.description,
      goal_type: self.goal_type,
      value: self.value,
      current_value: self.current_value,
      deadline: self.deadline,
      status: GoalStatus::Active,
      created_by: self.created_by,
      created_at: self.created_at,
    }
  }
}

// ─── GoalDraft ───────────────────────────────────────────────────────────────

/// The create payload as a client sends it.
///
/// Every field is optional at the serde level so that a missing field is
/// reported by [`GoalDraft::into_new_goal`] under its own name. Keys outside
/// the schema (`id`, `status`, `createdBy`, ...) are ignored; the server owns
/// them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDraft {
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub title:         Option<String>,
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub description:   Option<String>,
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub goal_type:     Option<GoalType>,
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub value:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_value: Option<String>,
  #[serde(
    default,
    deserialize_with = "deadline::present",
    skip_serializing_if = "Option::is_none"
  )]
  pub deadline:      Option<DateTime<Utc>>,
}

impl GoalDraft {
  /// Validate the draft against the goal schema and stamp provenance.
  pub fn into_new_goal(
    self,
    owner: &str,
    now: DateTime<Utc>,
  ) -> Result<NewGoal> {
    let title = required("title", self.title)?;
    check_title(&title)?;
    let description = required("description", self.description)?;
    check_description(&description)?;
    let goal_type = required("goalType", self.goal_type)?;
    let value = required("value", self.value)?;
    check_value(&value)?;
    let deadline = required("deadline", self.deadline)?;

    Ok(NewGoal {
      title,
      description,
      goal_type,
      value,
      current_value: self.current_value,
      deadline,
      created_by: Some(owner.to_owned()),
      created_at: Some(now),
    })
  }
}

// ─── GoalPatch ───────────────────────────────────────────────────────────────

/// A partial update. Absent fields keep their stored values.
///
/// `currentValue: null` clears the progress value; `null` for any other
/// field is refused because those fields cannot be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GoalPatch {
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub title:         Option<String>,
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub description:   Option<String>,
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub goal_type:     Option<GoalType>,
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub value:         Option<String>,
  #[serde(
    default,
    deserialize_with = "nullable",
    skip_serializing_if = "Option::is_none"
  )]
  pub current_value: Option<Option<String>>,
  #[serde(
    default,
    deserialize_with = "deadline::present",
    skip_serializing_if = "Option::is_none"
  )]
  pub deadline:      Option<DateTime<Utc>>,
  #[serde(
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub status:        Option<GoalStatus>,
}

impl GoalPatch {
  /// A patch that only sets `status`.
  pub fn status(status: GoalStatus) -> Self {
    Self {
      status: Some(status),
      ..Self::default()
    }
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Check every present field against the same rules as creation.
  pub fn validate(&self) -> Result<()> {
    if let Some(title) = &self.title {
      check_title(title)?;
    }
    if let Some(description) = &self.description {
      check_description(description)?;
    }
    if let Some(value) = &self.value {
      check_value(value)?;
    }
    Ok(())
  }

  /// Refuse a status change the lifecycle does not allow from `current`.
  ///
  /// `expired` is only ever reached through reconciliation, so asking for it
  /// is refused unless the goal has already expired.
  pub fn check_transition(&self, current: GoalStatus) -> Result<()> {
    match self.status {
      Some(GoalStatus::Expired) if current != GoalStatus::Expired => {
        Err(Error::validation(
          "status",
          "goals expire automatically once their deadline passes",
        ))
      }
      Some(next) if !current.can_transition_to(next) => {
        Err(Error::IllegalTransition {
          from: current,
          to:   next,
        })
      }
      _ => Ok(()),
    }
  }
}

// ─── Field rules ─────────────────────────────────────────────────────────────

fn required<T>(field: &'static str, value: Option<T>) -> Result<T> {
  value.ok_or_else(|| Error::validation(field, "is required"))
}

fn check_title(title: &str) -> Result<()> {
  if title.trim().chars().count() < TITLE_MIN_CHARS {
    return Err(Error::validation(
      "title",
      format!("must be at least {TITLE_MIN_CHARS} characters"),
    ));
  }
  Ok(())
}

fn check_description(description: &str) -> Result<()> {
  let len = description.trim().chars().count();
  if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&len) {
    return Err(Error::validation(
      "description",
      format!(
        "must be between {DESCRIPTION_MIN_CHARS} and {DESCRIPTION_MAX_CHARS} \
         characters"
      ),
    ));
  }
  Ok(())
}

fn check_value(value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation("value", "must not be empty"));
  }
  Ok(())
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

/// Deserialise a field that may be absent but must not be `null`.
fn present<'de, D, T>(d: D) -> std::result::Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  T::deserialize(d).map(Some)
}

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn nullable<'de, D, T>(d: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(d).map(Some)
}

/// Parse a deadline from an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
///
/// A bare date is read as midnight UTC.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

mod deadline {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize, Deserializer, de::Error as _};

  pub fn deserialize<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw = String::deserialize(d)?;
    super::parse_deadline(&raw).ok_or_else(|| {
      D::Error::custom(format!(
        "invalid deadline {raw:?}: expected RFC 3339 or YYYY-MM-DD"
      ))
    })
  }

  pub fn present<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserialize(d).map(Some)
  }
}

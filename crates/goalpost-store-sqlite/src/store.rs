//! [`SqliteStore`]: the SQLite implementation of [`GoalStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, ToSql, types::Value};
use uuid::Uuid;

use goalpost_core::{
  goal::{Goal, GoalPatch, NewGoal},
  store::GoalStore,
};

use crate::{
  encode::{
    GOAL_COLUMNS, RawGoal, encode_dt, encode_goal_type, encode_status,
    encode_uuid,
  },
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A goal store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Owned column values for one goal row, ready to move into a
/// `Connection::call` closure.
struct GoalRow {
  goal_id:       String,
  title:         String,
  description:   String,
  goal_type:     String,
  value:         String,
  current_value: Option<String>,
  deadline:      String,
  status:        String,
  created_by:    Option<String>,
  created_at:    Option<String>,
}

impl From<&Goal> for GoalRow {
  fn from(goal: &Goal) -> Self {
    Self {
      goal_id:       encode_uuid(goal.id),
      title:         goal.title.clone(),
      description:   goal.description.clone(),
      goal_type:     encode_goal_type(goal.goal_type).to_owned(),
      value:         goal.value.clone(),
      current_value: goal.current_value.clone(),
      deadline:      encode_dt(goal.deadline),
      status:        encode_status(goal.status).to_owned(),
      created_by:    goal.created_by.clone(),
      created_at:    goal.created_at.map(encode_dt),
    }
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
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

/// `(column, value)` pairs for every field present in `patch`.
fn patch_assignments(patch: GoalPatch) -> Vec<(&'static str, Value)> {
  let GoalPatch {
    title,
    description,
    goal_type,
    value,
    current_value,
    deadline,
    status,
  } = patch;

  let mut set = Vec::new();
  if let Some(title) = title {
    set.push(("title", Value::Text(title)));
  }
  if let Some(description) = description {
    set.push(("description", Value::Text(description)));
  }
  if let Some(goal_type) = goal_type {
    set.push(("goal_type", Value::Text(encode_goal_type(goal_type).into())));
  }
  if let Some(value) = value {
    set.push(("value", Value::Text(value)));
  }
  if let Some(current_value) = current_value {
    set.push(("current_value", current_value.map_or(Value::Null, Value::Text)));
  }
  if let Some(deadline) = deadline {
    set.push(("deadline", Value::Text(encode_dt(deadline))));
  }
  if let Some(status) = status {
    set.push(("status", Value::Text(encode_status(status).into())));
  }
  set
}

// ─── GoalStore impl ──────────────────────────────────────────────────────────

impl GoalStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, owner: &str, input: NewGoal) -> Result<Goal> {
    let goal = input.into_goal(Uuid::new_v4());
    let owner_str = owner.to_owned();
    let row = GoalRow::from(&goal);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO goals (
             owner_id, goal_id, title, description, goal_type, value,
             current_value, deadline, status, created_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            owner_str,
            row.goal_id,
            row.title,
            row.description,
            row.goal_type,
            row.value,
            row.current_value,
            row.deadline,
            row.status,
            row.created_by,
            row.created_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(owner, goal_id = %goal.id, "inserted goal");
    Ok(goal)
  }

  async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Goal>> {
    let owner = owner.to_owned();
    let id_str = encode_uuid(id);

    let raw: Option<RawGoal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {GOAL_COLUMNS} FROM goals
                 WHERE owner_id = ?1 AND goal_id = ?2"
              ),
              rusqlite::params![owner, id_str],
              RawGoal::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGoal::into_goal).transpose()
  }

  /// Only the columns present in `patch` are written, and the write and the
  /// read-back share one transaction.
  async fn update(
    &self,
    owner: &str,
    id: Uuid,
    patch: GoalPatch,
  ) -> Result<Option<Goal>> {
    let owner = owner.to_owned();
    let id_str = encode_uuid(id);
    let assignments = patch_assignments(patch);

    let raw: Option<RawGoal> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !assignments.is_empty() {
          let set = assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{column} = ?{}", i + 3))
            .collect::<Vec<_>>()
            .join(", ");
          let mut params: Vec<&dyn ToSql> = vec![&owner, &id_str];
          params.extend(assignments.iter().map(|(_, v)| v as &dyn ToSql));
          tx.execute(
            &format!(
              "UPDATE goals SET {set} WHERE owner_id = ?1 AND goal_id = ?2"
            ),
            params.as_slice(),
          )?;
        }

        let raw = tx
          .query_row(
            &format!(
              "SELECT {GOAL_COLUMNS} FROM goals
               WHERE owner_id = ?1 AND goal_id = ?2"
            ),
            rusqlite::params![owner, id_str],
            RawGoal::from_row,
          )
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawGoal::into_goal).transpose()
  }

  async fn delete(&self, owner: &str, id: Uuid) -> Result<bool> {
    let owner = owner.to_owned();
    let id_str = encode_uuid(id);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM goals WHERE owner_id = ?1 AND goal_id = ?2",
          rusqlite::params![owner, id_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  async fn list_all(&self, owner: &str) -> Result<Vec<Goal>> {
    let owner = owner.to_owned();

    let raws: Vec<RawGoal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {GOAL_COLUMNS} FROM goals WHERE owner_id = ?1 ORDER BY seq"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner], RawGoal::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGoal::into_goal).collect()
  }
}

//! [`GoalService`]: the goal access operations behind the HTTP handlers.
//!
//! The service owns no state beyond the injected store. Every operation takes
//! the evaluation time explicitly so expiry can be tested without a clock.
//!
//! # Reconciliation
//!
//! Both single reads and listings pass each goal through
//! [`reconcile`](goalpost_core::lifecycle::reconcile). When a goal expires
//! this way the new status is written back before the goal is returned, so
//! every later reader sees `expired` too.
//!
//! The write-back is a status-only patch: the provided stores touch only the
//! `status` column, so concurrent edits to other fields survive it. It is not
//! guarded against a concurrent update of `status` itself. A goal completed
//! between our read and our write-back ends up `expired`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use goalpost_core::{
  goal::{Goal, GoalDraft, GoalPatch},
  lifecycle::{GoalStatus, reconcile},
  store::GoalStore,
};
use uuid::Uuid;

use crate::error::ApiError;

pub struct GoalService<S> {
  store: Arc<S>,
}

impl<S> Clone for GoalService<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}

fn require_owner(owner: &str) -> Result<&str, ApiError> {
  if owner.trim().is_empty() {
    return Err(ApiError::Unauthorized);
  }
  Ok(owner)
}

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("goal {id}")) }

impl<S: GoalStore> GoalService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Create a goal for `owner`. The new goal is always `active`, whatever the
  /// draft carried.
  pub async fn create(
    &self,
    owner: Option<&str>,
    draft: Option<GoalDraft>,
    now: DateTime<Utc>,
  ) -> Result<Goal, ApiError> {
    let owner = owner
      .filter(|o| !o.trim().is_empty())
      .ok_or_else(|| ApiError::InvalidInput("userId is required".into()))?;
    let draft =
      draft.ok_or_else(|| ApiError::InvalidInput("goal is required".into()))?;
    let input = draft.into_new_goal(owner, now)?;

    let goal = self
      .store
      .insert(owner, input)
      .await
      .map_err(ApiError::store)?;
    tracing::info!(owner, goal_id = %goal.id, "created goal");
    Ok(goal)
  }

  /// Fetch one goal, expiring it first if its deadline has passed.
  pub async fn get(
    &self,
    owner: &str,
    id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Goal, ApiError> {
    let owner = require_owner(owner)?;
    let goal = self
      .store
      .get(owner, id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| not_found(id))?;
    self.settle(owner, goal, now).await
  }

  /// All of `owner`'s goals in storage order, each reconciled like
  /// [`GoalService::get`].
  pub async fn list(
    &self,
    owner: &str,
    now: DateTime<Utc>,
  ) -> Result<Vec<Goal>, ApiError> {
    let owner = require_owner(owner)?;
    let stored = self
      .store
      .list_all(owner)
      .await
      .map_err(ApiError::store)?;

    let mut goals = Vec::with_capacity(stored.len());
    for goal in stored {
      match self.settle(owner, goal, now).await {
        Ok(goal) => goals.push(goal),
        // Deleted between the listing and the write-back.
        Err(ApiError::NotFound(_)) => {}
        Err(e) => return Err(e),
      }
    }
    Ok(goals)
  }

  /// Merge `patch` into a goal.
  ///
  /// The goal is reconciled first, so an overdue goal can no longer be
  /// completed: it is already expired, and expired is terminal.
  pub async fn update(
    &self,
    owner: &str,
    id: Uuid,
    patch: GoalPatch,
    now: DateTime<Utc>,
  ) -> Result<Goal, ApiError> {
    let owner = require_owner(owner)?;
    patch.validate()?;

    let current = self.get(owner, id, now).await?;
    patch.check_transition(current.status)?;

    let goal = self
      .store
      .update(owner, id, patch)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| not_found(id))?;
    tracing::info!(owner, goal_id = %id, status = %goal.status, "updated goal");
    Ok(goal)
  }

  /// Remove a goal. Removing a goal that does not exist succeeds.
  pub async fn delete(&self, owner: &str, id: Uuid) -> Result<(), ApiError> {
    let owner = require_owner(owner)?;
    let removed = self
      .store
      .delete(owner, id)
      .await
      .map_err(ApiError::store)?;
    tracing::info!(owner, goal_id = %id, removed, "deleted goal");
    Ok(())
  }

  /// Reconcile `goal` against `now` and persist the status if it changed.
  async fn settle(
    &self,
    owner: &str,
    goal: Goal,
    now: DateTime<Utc>,
  ) -> Result<Goal, ApiError> {
    let (goal, changed) = reconcile(goal, now);
    if !changed {
      return Ok(goal);
    }

    tracing::debug!(
      owner,
      goal_id = %goal.id,
      deadline = %goal.deadline,
      "deadline passed; marking goal expired"
    );
    self
      .store
      .update(owner, goal.id, GoalPatch::status(GoalStatus::Expired))
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| not_found(goal.id))
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};
  use goalpost_core::{
    goal::{GoalType, NewGoal},
    memory::MemoryStore,
  };

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
  }

  fn service() -> (GoalService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (GoalService::new(Arc::clone(&store)), store)
  }

  fn draft(deadline: &str) -> GoalDraft {
    serde_json::from_value(serde_json::json!({
      "title": "Run 5k",
      "description": "Morning run",
      "goalType": "simple",
      "value": "1",
      "deadline": deadline,
    }))
    .unwrap()
  }

  async fn seed(store: &MemoryStore, deadline: DateTime<Utc>) -> Goal {
    store
      .insert(
        "alice",
        NewGoal::new("Read", "Twelve books", GoalType::Count, "12", deadline),
      )
      .await
      .unwrap()
  }

  // ── Create ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_forces_active_and_stamps_provenance() {
    let (svc, _) = service();
    let mut d: GoalDraft = draft("2030-01-01");
    d.current_value = Some("0".into());

    let goal = svc.create(Some("alice"), Some(d), now()).await.unwrap();
    assert_eq!(goal.status, GoalStatus::Active);
    assert_eq!(goal.created_by.as_deref(), Some("alice"));
    assert_eq!(goal.created_at, Some(now()));
  }

  #[tokio::test]
  async fn create_ignores_supplied_status() {
    let (svc, _) = service();
    let d: GoalDraft = serde_json::from_value(serde_json::json!({
      "title": "Run 5k",
      "description": "Morning run",
      "goalType": "simple",
      "value": "1",
      "deadline": "2030-01-01",
      "status": "completed",
    }))
    .unwrap();
    let goal = svc.create(Some("alice"), Some(d), now()).await.unwrap();
    assert_eq!(goal.status, GoalStatus::Active);
  }

  #[tokio::test]
  async fn create_with_empty_title_persists_nothing() {
    let (svc, store) = service();
    let mut d = draft("2030-01-01");
    d.title = Some(String::new());

    let err = svc.create(Some("alice"), Some(d), now()).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(store.list_all("alice").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn create_without_owner_or_goal_is_invalid() {
    let (svc, _) = service();
    let err = svc
      .create(None, Some(draft("2030-01-01")), now())
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = svc.create(Some("alice"), None, now()).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = svc
      .create(Some("  "), Some(draft("2030-01-01")), now())
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
  }

  // ── Read one ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn past_deadline_goal_expires_on_read_and_is_persisted() {
    let (svc, store) = service();
    let goal = svc
      .create(Some("alice"), Some(draft("2001-01-01")), now())
      .await
      .unwrap();
    assert_eq!(goal.status, GoalStatus::Active);

    let read = svc.get("alice", goal.id, now()).await.unwrap();
    assert_eq!(read.status, GoalStatus::Expired);

    let stored = store.get("alice", goal.id).await.unwrap().unwrap();
    assert_eq!(stored.status, GoalStatus::Expired);

    // No reversion, even with a clock that has gone backwards.
    let again = svc
      .get("alice", goal.id, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
      .await
      .unwrap();
    assert_eq!(again.status, GoalStatus::Expired);
  }

  #[tokio::test]
  async fn future_deadline_goal_is_returned_unchanged() {
    let (svc, store) = service();
    let goal = seed(&store, now() + Duration::days(3)).await;

    let read = svc.get("alice", goal.id, now()).await.unwrap();
    assert_eq!(read, goal);
  }

  #[tokio::test]
  async fn never_created_goal_is_not_found() {
    let (svc, _) = service();
    let err = svc.get("alice", Uuid::new_v4(), now()).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
  }

  #[tokio::test]
  async fn other_owners_goal_is_not_found() {
    let (svc, store) = service();
    let goal = seed(&store, now() + Duration::days(3)).await;
    let err = svc.get("bob", goal.id, now()).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
  }

  #[tokio::test]
  async fn missing_owner_is_unauthorized() {
    let (svc, _) = service();
    let err = svc.get("", Uuid::new_v4(), now()).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    let err = svc.list("", now()).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    let err = svc.delete("", Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
  }

  // ── List ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_owner_lists_nothing() {
    let (svc, _) = service();
    assert!(svc.list("alice", now()).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn list_reconciles_like_get() {
    let (svc, store) = service();
    let overdue = seed(&store, now() - Duration::days(1)).await;
    let pending = seed(&store, now() + Duration::days(1)).await;

    let goals = svc.list("alice", now()).await.unwrap();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[0].id, overdue.id);
    assert_eq!(goals[0].status, GoalStatus::Expired);
    assert_eq!(goals[1].id, pending.id);
    assert_eq!(goals[1].status, GoalStatus::Active);

    let stored = store.get("alice", overdue.id).await.unwrap().unwrap();
    assert_eq!(stored.status, GoalStatus::Expired);
  }

  // ── Update ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_is_a_partial_merge() {
    let (svc, store) = service();
    let goal = seed(&store, now() + Duration::days(30)).await;

    let patch = GoalPatch {
      current_value: Some(Some("4".into())),
      ..GoalPatch::default()
    };
    let updated = svc.update("alice", goal.id, patch, now()).await.unwrap();
    assert_eq!(updated.current_value.as_deref(), Some("4"));
    assert_eq!(updated.title, goal.title);
    assert_eq!(updated.description, goal.description);
    assert_eq!(updated.deadline, goal.deadline);
  }

  #[tokio::test]
  async fn update_can_complete_an_active_goal() {
    let (svc, store) = service();
    let goal = seed(&store, now() + Duration::days(30)).await;

    let updated = svc
      .update("alice", goal.id, GoalPatch::status(GoalStatus::Completed), now())
      .await
      .unwrap();
    assert_eq!(updated.status, GoalStatus::Completed);
  }

  #[tokio::test]
  async fn update_cannot_leave_a_terminal_status() {
    let (svc, store) = service();
    let goal = seed(&store, now() + Duration::days(30)).await;
    svc
      .update("alice", goal.id, GoalPatch::status(GoalStatus::Completed), now())
      .await
      .unwrap();

    let err = svc
      .update("alice", goal.id, GoalPatch::status(GoalStatus::Active), now())
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
  }

  #[tokio::test]
  async fn status_expired_cannot_be_set_before_the_deadline() {
    let (svc, store) = service();
    let goal = seed(&store, now() + Duration::days(30)).await;

    let err = svc
      .update("alice", goal.id, GoalPatch::status(GoalStatus::Expired), now())
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let stored = store.get("alice", goal.id).await.unwrap().unwrap();
    assert_eq!(stored.status, GoalStatus::Active);
  }

  #[tokio::test]
  async fn status_expired_on_an_overdue_goal_is_a_no_op() {
    let (svc, store) = service();
    let goal = seed(&store, now() - Duration::days(1)).await;

    let updated = svc
      .update("alice", goal.id, GoalPatch::status(GoalStatus::Expired), now())
      .await
      .unwrap();
    assert_eq!(updated.status, GoalStatus::Expired);
  }

  #[tokio::test]
  async fn overdue_goal_cannot_be_completed() {
    let (svc, store) = service();
    let goal = seed(&store, now() - Duration::days(1)).await;

    let err = svc
      .update("alice", goal.id, GoalPatch::status(GoalStatus::Completed), now())
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let stored = store.get("alice", goal.id).await.unwrap().unwrap();
    assert_eq!(stored.status, GoalStatus::Expired);
  }

  #[tokio::test]
  async fn update_rejects_invalid_fields() {
    let (svc, store) = service();
    let goal = seed(&store, now() + Duration::days(30)).await;

    let patch = GoalPatch {
      title: Some("x".into()),
      ..GoalPatch::default()
    };
    let err = svc.update("alice", goal.id, patch, now()).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let stored = store.get("alice", goal.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Read");
  }

  #[tokio::test]
  async fn update_missing_goal_is_not_found() {
    let (svc, _) = service();
    let err = svc
      .update("alice", Uuid::new_v4(), GoalPatch::default(), now())
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
  }

  // ── Delete ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_is_idempotent() {
    let (svc, store) = service();
    let goal = seed(&store, now() + Duration::days(30)).await;

    svc.delete("alice", goal.id).await.unwrap();
    svc.delete("alice", goal.id).await.unwrap();
    svc.delete("alice", Uuid::new_v4()).await.unwrap();
    assert!(store.get("alice", goal.id).await.unwrap().is_none());
  }

  // ── Store failures ─────────────────────────────────────────────────────────

  /// A store whose every operation fails.
  struct BrokenStore;

  impl GoalStore for BrokenStore {
    type Error = std::io::Error;

    async fn insert(&self, _: &str, _: NewGoal) -> std::io::Result<Goal> {
      Err(std::io::Error::other("broken"))
    }
    async fn get(&self, _: &str, _: Uuid) -> std::io::Result<Option<Goal>> {
      Err(std::io::Error::other("broken"))
    }
    async fn update(
      &self,
      _: &str,
      _: Uuid,
      _: GoalPatch,
    ) -> std::io::Result<Option<Goal>> {
      Err(std::io::Error::other("broken"))
    }
    async fn delete(&self, _: &str, _: Uuid) -> std::io::Result<bool> {
      Err(std::io::Error::other("broken"))
    }
    async fn list_all(&self, _: &str) -> std::io::Result<Vec<Goal>> {
      Err(std::io::Error::other("broken"))
    }
  }

  #[tokio::test]
  async fn store_failures_are_internal() {
    let svc = GoalService::new(Arc::new(BrokenStore));
    let err = svc.list("alice", now()).await.unwrap_err();
    assert!(matches!(err, ApiError::Internal(_)));
    let err = svc.get("alice", Uuid::new_v4(), now()).await.unwrap_err();
    assert!(matches!(err, ApiError::Internal(_)));
    let err = svc
      .create(Some("alice"), Some(draft("2030-01-01")), now())
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::Internal(_)));
  }
}

//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone, Utc};
use goalpost_core::{
  goal::{GoalPatch, GoalType, NewGoal},
  lifecycle::GoalStatus,
  store::GoalStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn run_goal() -> NewGoal {
  NewGoal::new(
    "Run 5k",
    "Morning run",
    GoalType::Simple,
    "1",
    Utc.with_ymd_and_hms(2030, 5, 1, 7, 30, 0).unwrap(),
  )
}

fn read_goal() -> NewGoal {
  let mut g = NewGoal::new(
    "Read",
    "Twelve books this year",
    GoalType::Count,
    "12",
    Utc.with_ymd_and_hms(2030, 12, 31, 0, 0, 0).unwrap(),
  );
  g.current_value = Some("2".into());
  g.created_by = Some("alice".into());
  g.created_at = Some(Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap());
  g
}

// ─── Insert / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get() {
  let s = store().await;

  let goal = s.insert("alice", run_goal()).await.unwrap();
  assert_eq!(goal.status, GoalStatus::Active);

  let fetched = s.get("alice", goal.id).await.unwrap();
  assert_eq!(fetched, Some(goal));
}

#[tokio::test]
async fn optional_fields_roundtrip() {
  let s = store().await;
  let goal = s.insert("alice", read_goal()).await.unwrap();

  let fetched = s.get("alice", goal.id).await.unwrap().unwrap();
  assert_eq!(fetched.current_value.as_deref(), Some("2"));
  assert_eq!(fetched.created_by.as_deref(), Some("alice"));
  assert_eq!(fetched.created_at, goal.created_at);
  assert_eq!(fetched.goal_type, GoalType::Count);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  let result = s.get("alice", Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn get_is_scoped_by_owner() {
  let s = store().await;
  let goal = s.insert("alice", run_goal()).await.unwrap();
  assert!(s.get("bob", goal.id).await.unwrap().is_none());
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_empty_owner() {
  let s = store().await;
  assert!(s.list_all("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_owner_goals_in_insertion_order() {
  let s = store().await;
  let a = s.insert("alice", run_goal()).await.unwrap();
  s.insert("bob", run_goal()).await.unwrap();
  let b = s.insert("alice", read_goal()).await.unwrap();

  let ids: Vec<_> = s
    .list_all("alice")
    .await
    .unwrap()
    .into_iter()
    .map(|g| g.id)
    .collect();
  assert_eq!(ids, [a.id, b.id]);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_merges_fields() {
  let s = store().await;
  let goal = s.insert("alice", read_goal()).await.unwrap();

  let patch = GoalPatch {
    value: Some("20".into()),
    status: Some(GoalStatus::Completed),
    ..GoalPatch::default()
  };
  let updated = s.update("alice", goal.id, patch).await.unwrap().unwrap();
  assert_eq!(updated.value, "20");
  assert_eq!(updated.status, GoalStatus::Completed);
  assert_eq!(updated.title, goal.title);
  assert_eq!(updated.current_value, goal.current_value);

  let fetched = s.get("alice", goal.id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_can_clear_current_value() {
  let s = store().await;
  let goal = s.insert("alice", read_goal()).await.unwrap();

  let patch = GoalPatch {
    current_value: Some(None),
    ..GoalPatch::default()
  };
  s.update("alice", goal.id, patch).await.unwrap();

  let fetched = s.get("alice", goal.id).await.unwrap().unwrap();
  assert_eq!(fetched.current_value, None);
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  let res = s
    .update("alice", Uuid::new_v4(), GoalPatch::status(GoalStatus::Expired))
    .await
    .unwrap();
  assert!(res.is_none());
}

#[tokio::test]
async fn update_other_owner_is_none_and_untouched() {
  let s = store().await;
  let goal = s.insert("alice", run_goal()).await.unwrap();

  let res = s
    .update("bob", goal.id, GoalPatch::status(GoalStatus::Completed))
    .await
    .unwrap();
  assert!(res.is_none());

  let fetched = s.get("alice", goal.id).await.unwrap().unwrap();
  assert_eq!(fetched.status, GoalStatus::Active);
}

#[tokio::test]
async fn status_patch_leaves_other_columns_alone() {
  let s = store().await;
  let goal = s.insert("alice", read_goal()).await.unwrap();

  let progress = GoalPatch {
    current_value: Some(Some("5".into())),
    ..GoalPatch::default()
  };
  s.update("alice", goal.id, progress).await.unwrap();

  let expired = s
    .update("alice", goal.id, GoalPatch::status(GoalStatus::Expired))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(expired.status, GoalStatus::Expired);
  assert_eq!(expired.current_value.as_deref(), Some("5"));
  assert_eq!(expired.title, goal.title);
}

#[tokio::test]
async fn concurrent_patches_keep_each_others_fields() {
  let s = store().await;
  let goal = s.insert("alice", read_goal()).await.unwrap();

  let progress = GoalPatch {
    current_value: Some(Some("7".into())),
    ..GoalPatch::default()
  };
  let rename = GoalPatch {
    title: Some("Read more".into()),
    ..GoalPatch::default()
  };
  let (a, b, c) = tokio::join!(
    s.update("alice", goal.id, progress),
    s.update("alice", goal.id, rename),
    s.update("alice", goal.id, GoalPatch::status(GoalStatus::Expired)),
  );
  a.unwrap().unwrap();
  b.unwrap().unwrap();
  c.unwrap().unwrap();

  let fetched = s.get("alice", goal.id).await.unwrap().unwrap();
  assert_eq!(fetched.current_value.as_deref(), Some("7"));
  assert_eq!(fetched.title, "Read more");
  assert_eq!(fetched.status, GoalStatus::Expired);
  assert_eq!(fetched.value, goal.value);
}

#[tokio::test]
async fn empty_patch_returns_current_goal() {
  let s = store().await;
  let goal = s.insert("alice", read_goal()).await.unwrap();
  let same = s
    .update("alice", goal.id, GoalPatch::default())
    .await
    .unwrap();
  assert_eq!(same, Some(goal));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_is_idempotent() {
  let s = store().await;
  let goal = s.insert("alice", run_goal()).await.unwrap();

  assert!(s.delete("alice", goal.id).await.unwrap());
  assert!(!s.delete("alice", goal.id).await.unwrap());
  assert!(!s.delete("alice", Uuid::new_v4()).await.unwrap());
  assert!(s.get("alice", goal.id).await.unwrap().is_none());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopen_file_keeps_goals() {
  let path = std::env::temp_dir()
    .join(format!("goalpost-test-{}.db", Uuid::new_v4()));

  let goal = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert("alice", run_goal()).await.unwrap()
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let fetched = s.get("alice", goal.id).await.unwrap();
  assert_eq!(fetched, Some(goal));

  drop(s);
  let _ = std::fs::remove_file(&path);
}

//! The `GoalStore` trait: the persistence gateway.
//!
//! The trait is implemented by storage backends (e.g. `goalpost-store-sqlite`
//! and [`crate::memory::MemoryStore`]). Higher layers (`goalpost-api`,
//! `goalpost-server`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::goal::{Goal, GoalPatch, NewGoal};

/// Abstraction over a goal store backend.
///
/// Every operation is scoped by an opaque `owner` id. A goal id is only
/// meaningful together with its owner: asking for another owner's goal id
/// behaves exactly like asking for an id that was never created.
///
/// Backends provide no cross-request coordination. Two concurrent writes to
/// the same goal race and the last one wins.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait GoalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new goal under `owner`, assigning its id. The stored goal is
  /// always [`Active`](crate::lifecycle::GoalStatus::Active).
  fn insert<'a>(
    &'a self,
    owner: &'a str,
    input: NewGoal,
  ) -> impl Future<Output = Result<Goal, Self::Error>> + Send + 'a;

  /// Retrieve one goal. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    owner: &'a str,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Goal>, Self::Error>> + Send + 'a;

  /// Merge `patch` into a stored goal and return the result. Returns `None`
  /// if the goal does not exist; nothing is written in that case.
  fn update<'a>(
    &'a self,
    owner: &'a str,
    id: Uuid,
    patch: GoalPatch,
  ) -> impl Future<Output = Result<Option<Goal>, Self::Error>> + Send + 'a;

  /// Remove a goal. Returns whether a record was removed; removing an absent
  /// goal is not an error.
  fn delete<'a>(
    &'a self,
    owner: &'a str,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// All of `owner`'s goals, in storage (insertion) order.
  fn list_all<'a>(
    &'a self,
    owner: &'a str,
  ) -> impl Future<Output = Result<Vec<Goal>, Self::Error>> + Send + 'a;
}

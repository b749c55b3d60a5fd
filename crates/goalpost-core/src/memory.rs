//! [`MemoryStore`]: an in-process [`GoalStore`] for tests and throwaway
//! servers.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use uuid::Uuid;

use crate::{
  goal::{Goal, GoalPatch, NewGoal},
  store::GoalStore,
};

/// Goals held in a mutex-guarded map of owner id to insertion-ordered goals.
///
/// Cloning is cheap and clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
  goals: Arc<Mutex<HashMap<String, Vec<Goal>>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  // A panic while holding the lock cannot leave a half-written goal behind,
  // so a poisoned map is still consistent.
  fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Goal>>> {
    self.goals.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl GoalStore for MemoryStore {
  type Error = Infallible;

  async fn insert(&self, owner: &str, input: NewGoal) -> Result<Goal, Infallible> {
    let goal = input.into_goal(Uuid::new_v4());
    self
      .lock()
      .entry(owner.to_owned())
      .or_default()
      .push(goal.clone());
    Ok(goal)
  }

  async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Goal>, Infallible> {
    Ok(
      self
        .lock()
        .get(owner)
        .and_then(|goals| goals.iter().find(|g| g.id == id))
        .cloned(),
    )
  }

  async fn update(
    &self,
    owner: &str,
    id: Uuid,
    patch: GoalPatch,
  ) -> Result<Option<Goal>, Infallible> {
    let mut map = self.lock();
    let Some(goal) = map
      .get_mut(owner)
      .and_then(|goals| goals.iter_mut().find(|g| g.id == id))
    else {
      return Ok(None);
    };
    goal.apply(patch);
    Ok(Some(goal.clone()))
  }

  async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, Infallible> {
    let mut map = self.lock();
    let Some(goals) = map.get_mut(owner) else {
      return Ok(false);
    };
    let before = goals.len();
    goals.retain(|g| g.id != id);
    Ok(goals.len() != before)
  }

  async fn list_all(&self, owner: &str) -> Result<Vec<Goal>, Infallible> {
    Ok(self.lock().get(owner).cloned().unwrap_or_default())
  }
}

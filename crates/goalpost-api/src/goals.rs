//! Handlers for `/goals` endpoints.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `POST`   | `/goals`      | Body: `{"userId": ..., "goal": {...}}`; returns 201 + stored goal |
//! | `GET`    | `/goals`      | `?owner` required; returns `{"goals": [...]}` |
//! | `GET`    | `/goals/:id`  | `?owner` required; returns `{"goal": {...}}` |
//! | `PATCH`  | `/goals/:id`  | `?owner` required; body: partial goal |
//! | `DELETE` | `/goals/:id`  | `?owner` required; succeeds for absent goals |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use goalpost_core::{
  goal::{Goal, GoalDraft, GoalPatch},
  store::GoalStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{error::ApiError, service::GoalService};

// ─── Request / response shapes ────────────────────────────────────────────────

/// The `?owner=<id>` query parameter carried by every per-owner route.
#[derive(Debug, Default, Deserialize)]
pub struct OwnerParams {
  pub owner: Option<String>,
}

impl OwnerParams {
  fn owner(&self) -> &str { self.owner.as_deref().unwrap_or_default() }
}

/// JSON body accepted by `POST /goals`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub user_id: Option<String>,
  pub goal:    Option<GoalDraft>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalBody {
  pub goal: Goal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalsBody {
  pub goals: Vec<Goal>,
}

/// Goal ids are UUIDs; anything else names a goal that cannot exist.
fn parse_goal_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("goal {raw}")))
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
  ApiError::InvalidInput(rejection.body_text())
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /goals`: returns 201 + the stored [`Goal`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GoalStore + 'static,
{
  let Json(body) = body.map_err(invalid_body)?;
  let goal = GoalService::new(store)
    .create(body.user_id.as_deref(), body.goal, Utc::now())
    .await?;
  Ok((StatusCode::CREATED, Json(goal)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /goals?owner=<id>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<OwnerParams>,
) -> Result<Json<GoalsBody>, ApiError>
where
  S: GoalStore + 'static,
{
  let goals = GoalService::new(store)
    .list(params.owner(), Utc::now())
    .await?;
  Ok(Json(GoalsBody { goals }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /goals/:id?owner=<id>`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Query(params): Query<OwnerParams>,
) -> Result<Json<GoalBody>, ApiError>
where
  S: GoalStore + 'static,
{
  let service = GoalService::new(store);
  let owner = params.owner();
  if owner.trim().is_empty() {
    return Err(ApiError::Unauthorized);
  }
  let goal = service.get(owner, parse_goal_id(&id)?, Utc::now()).await?;
  Ok(Json(GoalBody { goal }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /goals/:id?owner=<id>`: body is a [`GoalPatch`].
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Query(params): Query<OwnerParams>,
  body: Result<Json<GoalPatch>, JsonRejection>,
) -> Result<Json<GoalBody>, ApiError>
where
  S: GoalStore + 'static,
{
  let owner = params.owner();
  if owner.trim().is_empty() {
    return Err(ApiError::Unauthorized);
  }
  let id = parse_goal_id(&id)?;
  let Json(patch) = body.map_err(invalid_body)?;
  let goal = GoalService::new(store)
    .update(owner, id, patch, Utc::now())
    .await?;
  Ok(Json(GoalBody { goal }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /goals/:id?owner=<id>`
///
/// Deleting a goal that does not exist answers exactly like deleting one that
/// does.
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Query(params): Query<OwnerParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GoalStore + 'static,
{
  let service = GoalService::new(store);
  let owner = params.owner();
  if owner.trim().is_empty() {
    return Err(ApiError::Unauthorized);
  }
  // An id that is not a UUID cannot name a stored goal, so there is nothing
  // to remove.
  if let Ok(id) = Uuid::parse_str(&id) {
    service.delete(owner, id).await?;
  }
  Ok(Json(json!({ "message": "Goal deleted successfully" })))
}

//! HTTP server assembly for Goalpost.
//!
//! Wraps the [`goalpost_api`] router with Basic authentication and an
//! ownership check, adds `/user` and `/health`, and carries the runtime
//! configuration.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Extension, Json, Router,
  body::Body,
  extract::{Query, Request, State},
  http::{Method, StatusCode},
  middleware::{self, Next},
  response::{IntoResponse, Response},
  routing::get,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use goalpost_api::{ApiError, goals::OwnerParams};
use goalpost_core::{identity::Identity, store::GoalStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, verify_auth};

/// Largest request body the ownership check will buffer.
const MAX_BODY_BYTES: usize = 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GOALPOST_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite file, or `:memory:` for a throwaway store.
  pub store_path: PathBuf,
  #[serde(default)]
  pub accounts:   Vec<AccountConfig>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

/// One `[[accounts]]` entry.
#[derive(Deserialize, Clone)]
pub struct AccountConfig {
  pub id:            String,
  pub email:         String,
  pub name:          String,
  pub created_at:    DateTime<Utc>,
  pub username:      String,
  pub password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the middleware.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      auth:  Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: GoalStore + 'static,
{
  let protected = Router::new()
    .route("/user", get(current_user))
    .merge(goalpost_api::api_router(Arc::clone(&state.store)))
    .layer(middleware::from_fn_with_state(state, require_owner::<S>));

  Router::new()
    .route("/health", get(health))
    .merge(protected)
    .layer(TraceLayer::new_for_http())
}

// ─── Middleware ───────────────────────────────────────────────────────────────

/// The `userId` a create request claims to act for.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerClaim {
  user_id: Option<String>,
}

/// Authenticate the request and refuse it when it addresses goals that
/// belong to someone other than the authenticated identity.
///
/// A request names its owner through the `owner` query parameter and, for a
/// `POST`, the `userId` field of the body. Every owner it names must be the
/// caller. A request that names no owner is passed on; the API decides what
/// a missing owner means.
async fn require_owner<S>(
  State(state): State<AppState<S>>,
  req: Request,
  next: Next,
) -> Response
where
  S: GoalStore + 'static,
{
  let identity = match verify_auth(req.headers(), &state.auth) {
    Ok(identity) => identity,
    Err(e) => {
      tracing::debug!(uri = %req.uri(), "rejected unauthenticated request");
      return e.into_response();
    }
  };

  let (mut req, claimed) = match claimed_owners(req).await {
    Ok(pair) => pair,
    Err(r) => return r,
  };

  if let Some(owner) = claimed.iter().find(|o| **o != identity.id) {
    tracing::warn!(
      identity = %identity.id,
      owner = %owner,
      "refused access to another user's goals"
    );
    return ApiError::Unauthorized.into_response();
  }

  req.extensions_mut().insert(identity);
  next.run(req).await
}

/// Every owner a request names, buffering and restoring the body when it has
/// to be inspected.
async fn claimed_owners(
  req: Request,
) -> Result<(Request, Vec<String>), Response> {
  let mut owners: Vec<String> = Query::<OwnerParams>::try_from_uri(req.uri())
    .ok()
    .and_then(|Query(p)| p.owner)
    .filter(|o| !o.is_empty())
    .into_iter()
    .collect();
  if req.method() != Method::POST {
    return Ok((req, owners));
  }

  let (parts, body) = req.into_parts();
  let bytes: Bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
    .await
    .map_err(|_| {
      (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response()
    })?;

  // A body that does not parse is left for the handler to reject.
  owners.extend(
    serde_json::from_slice::<OwnerClaim>(&bytes)
      .ok()
      .and_then(|c| c.user_id)
      .filter(|o| !o.is_empty()),
  );

  Ok((Request::from_parts(parts, Body::from(bytes)), owners))
}

// ─── Route handlers ──────────────────────────────────────────────────────────

/// `GET /user`: the authenticated identity.
async fn current_user(Extension(identity): Extension<Identity>) -> Json<Identity> {
  Json(identity)
}

/// `GET /health`: unauthenticated liveness probe.
async fn health() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────

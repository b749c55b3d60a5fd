//! Async HTTP client wrapping the goalpost JSON API.

use std::time::Duration;

use goalpost_core::{
  goal::{Goal, GoalDraft, GoalPatch},
  identity::Identity,
};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection settings for the goalpost API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Every way an API call can fail.
///
/// Server-reported failures carry the server's `error` message.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  #[error("not authorised")]
  Unauthorized,
  #[error("invalid input: {0}")]
  InvalidInput(String),
  #[error("goal not found")]
  NotFound,
  #[error("server error: {0}")]
  Internal(String),
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Deserialize)]
struct GoalEnvelope {
  goal: Goal,
}

#[derive(Deserialize)]
struct GoalsEnvelope {
  goals: Vec<Goal>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest<'a> {
  user_id: &'a str,
  goal:    &'a GoalDraft,
}

/// Async HTTP client for the goalpost JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn goal_url(&self, id: Uuid) -> String { self.url(&format!("/goals/{id}")) }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// `GET /user`
  pub async fn current_user(&self) -> Result<Identity> {
    let resp = self.auth(self.client.get(self.url("/user"))).send().await?;
    Ok(check(resp).await?.json().await?)
  }

  /// `GET /goals?owner=<id>`
  pub async fn list_goals(&self, owner: &str) -> Result<Vec<Goal>> {
    let resp = self
      .auth(self.client.get(self.url("/goals")))
      .query(&[("owner", owner)])
      .send()
      .await?;
    let body: GoalsEnvelope = check(resp).await?.json().await?;
    Ok(body.goals)
  }

  /// `GET /goals/<id>?owner=<id>`
  pub async fn get_goal(&self, owner: &str, id: Uuid) -> Result<Goal> {
    let resp = self
      .auth(self.client.get(self.goal_url(id)))
      .query(&[("owner", owner)])
      .send()
      .await?;
    let body: GoalEnvelope = check(resp).await?.json().await?;
    Ok(body.goal)
  }

  /// `POST /goals`
  pub async fn create_goal(&self, owner: &str, goal: &GoalDraft) -> Result<Goal> {
    let resp = self
      .auth(self.client.post(self.url("/goals")))
      .json(&CreateRequest {
        user_id: owner,
        goal,
      })
      .send()
      .await?;
    Ok(check(resp).await?.json().await?)
  }

  /// `PATCH /goals/<id>?owner=<id>`
  pub async fn update_goal(
    &self,
    owner: &str,
    id: Uuid,
    patch: &GoalPatch,
  ) -> Result<Goal> {
    let resp = self
      .auth(self.client.patch(self.goal_url(id)))
      .query(&[("owner", owner)])
      .json(patch)
      .send()
      .await?;
    let body: GoalEnvelope = check(resp).await?.json().await?;
    Ok(body.goal)
  }

  /// `DELETE /goals/<id>?owner=<id>`. Succeeds for goals that do not exist.
  pub async fn delete_goal(&self, owner: &str, id: Uuid) -> Result<()> {
    let resp = self
      .auth(self.client.delete(self.goal_url(id)))
      .query(&[("owner", owner)])
      .send()
      .await?;
    check(resp).await?;
    Ok(())
  }
}

/// Turn a non-success response into the matching [`ClientError`].
async fn check(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }

  let message = resp
    .json::<ErrorBody>()
    .await
    .map(|b| b.error)
    .unwrap_or_else(|_| status.to_string());
  tracing::debug!(%status, %message, "api call failed");

  Err(match status {
    StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
    StatusCode::BAD_REQUEST => ClientError::InvalidInput(message),
    StatusCode::NOT_FOUND => ClientError::NotFound,
    _ => ClientError::Internal(message),
  })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

//! HTTP Basic-auth identity provider.
//!
//! Accounts come from the server configuration. A request is authenticated
//! when its `Authorization` header names a configured username and the
//! password verifies against that account's argon2 hash.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use goalpost_api::ApiError;
use goalpost_core::identity::Identity;

use crate::AccountConfig;

/// A configured login and the identity it authenticates as.
#[derive(Clone)]
pub struct Account {
  pub identity:      Identity,
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Credentials accepted as valid for this server instance.
#[derive(Clone, Default)]
pub struct AuthConfig {
  pub accounts: Vec<Account>,
}

impl AuthConfig {
  pub fn from_accounts(accounts: &[AccountConfig]) -> Self {
    let accounts = accounts
      .iter()
      .map(|a| Account {
        identity:      Identity {
          id:         a.id.clone(),
          email:      a.email.clone(),
          name:       a.name.clone(),
          created_at: a.created_at,
        },
        username:      a.username.clone(),
        password_hash: a.password_hash.clone(),
      })
      .collect();
    Self { accounts }
  }
}

/// Resolve the identity behind a request's Basic credentials, if any.
pub fn current_identity(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Option<Identity> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())?;

  let encoded = header_val.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let creds = std::str::from_utf8(&decoded).ok()?;
  let (username, password) = creds.split_once(':')?;

  let account = config.accounts.iter().find(|a| a.username == username)?;
  let parsed_hash = PasswordHash::new(&account.password_hash).ok()?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .ok()?;

  Some(account.identity.clone())
}

/// Like [`current_identity`], but a missing identity is an error.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<Identity, ApiError> {
  current_identity(headers, config).ok_or(ApiError::Unauthorized)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;
  use chrono::{TimeZone, Utc};

  fn config(password: &str) -> AuthConfig {
    use argon2::{PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AuthConfig::from_accounts(&[AccountConfig {
      id:            "user_alice".to_string(),
      email:         "alice@example.com".to_string(),
      name:          "Alice".to_string(),
      created_at:    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
      username:      "alice".to_string(),
      password_hash: hash,
    }])
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials() {
    let cfg = config("secret");
    let identity = current_identity(&headers(&basic("alice", "secret")), &cfg)
      .expect("identity");
    assert_eq!(identity.id, "user_alice");
    assert_eq!(identity.email, "alice@example.com");
  }

  #[test]
  fn wrong_password() {
    let cfg = config("secret");
    let res = verify_auth(&headers(&basic("alice", "wrong")), &cfg);
    assert!(matches!(res, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn unknown_user() {
    let cfg = config("secret");
    assert!(current_identity(&headers(&basic("bob", "secret")), &cfg).is_none());
  }

  #[test]
  fn missing_header() {
    let cfg = config("secret");
    assert!(current_identity(&HeaderMap::new(), &cfg).is_none());
  }

  #[test]
  fn invalid_base64() {
    let cfg = config("secret");
    assert!(current_identity(&headers("Basic !!!not-base64!!!"), &cfg).is_none());
  }

  #[test]
  fn no_accounts_means_nobody() {
    let cfg = AuthConfig::default();
    assert!(current_identity(&headers(&basic("alice", "secret")), &cfg).is_none());
  }
}

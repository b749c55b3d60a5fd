//! Identity: the verified user issued by the authentication collaborator.
//!
//! Goals never store an identity; the identity's `id` is the owner key under
//! which a user's goals live in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  /// Opaque owner id; the storage key for the user's goals.
  pub id:         String,
  pub email:      String,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

//! JSON REST API for Goalpost.
//!
//! Exposes an axum [`Router`] backed by any [`goalpost_core::store::GoalStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility: the
//! router trusts the `owner` it is given.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(goalpost_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod goals;
pub mod service;

use std::sync::Arc;

use axum::{Router, routing::get};
use goalpost_core::store::GoalStore;

pub use error::ApiError;
pub use service::GoalService;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: GoalStore + 'static,
{
  Router::new()
    .route("/goals", get(goals::list::<S>).post(goals::create::<S>))
    .route(
      "/goals/{id}",
      get(goals::get_one::<S>)
        .patch(goals::update::<S>)
        .delete(goals::delete::<S>),
    )
    .with_state(store)
}

// ─── Router tests ─────────────────────────────────────────────────────────────

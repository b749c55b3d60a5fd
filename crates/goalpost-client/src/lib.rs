//! Client for the goalpost JSON API.
//!
//! [`ApiClient`] wraps every goal operation plus `current_user`. Failures are
//! reported as [`ClientError`], never as sentinel values.

pub mod client;

pub use client::{ApiClient, ApiConfig, ClientError};

//! Core types and trait definitions for the Goalpost goal tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod goal;
pub mod identity;
pub mod lifecycle;
pub mod memory;
pub mod store;

pub use error::{Error, Result};

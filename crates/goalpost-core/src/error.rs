//! Error types for `goalpost-core`.

use thiserror::Error;

use crate::lifecycle::GoalStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  /// A create or update payload broke the goal schema.
  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error("cannot change goal status from {from} to {to}")]
  IllegalTransition { from: GoalStatus, to: GoalStatus },
}

impl Error {
  pub(crate) fn validation(
    field: &'static str,
    message: impl Into<String>,
  ) -> Self {
    Self::Validation {
      field,
      message: message.into(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

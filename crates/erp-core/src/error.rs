//! Error taxonomy shared by every layer.
//!
//! Callers branch on [`ErrorKind`] rather than on message text. Validation
//! and conflict errors carry a [`FieldErrors`] map so a client can attach
//! each message to the offending form field.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Field name (wire spelling, e.g. `contactNumber`) → human-readable message.
pub type FieldErrors = BTreeMap<String, String>;

/// The category of a failure; maps one-to-one onto an HTTP status class.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  Conflict,
  NotFound,
  Forbidden,
  Authentication,
  Server,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{message}")]
  Validation {
    message: String,
    fields:  FieldErrors,
  },

  #[error("{message}")]
  Conflict {
    message: String,
    fields:  FieldErrors,
  },

  #[error("{0}")]
  NotFound(String),

  /// The identity exists but is not allowed to proceed (e.g. pending
  /// approval, or a non-admin token on an admin route).
  #[error("{0}")]
  Forbidden(String),

  /// Bad credentials, or a missing, invalid or expired token.
  #[error("{0}")]
  Authentication(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation { .. } => ErrorKind::Validation,
      Self::Conflict { .. } => ErrorKind::Conflict,
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::Forbidden(_) => ErrorKind::Forbidden,
      Self::Authentication(_) => ErrorKind::Authentication,
      Self::Store(_) | Self::Internal(_) => ErrorKind::Server,
    }
  }

  /// Field-level details, present only for validation and conflict errors.
  pub fn fields(&self) -> Option<&FieldErrors> {
    match self {
      Self::Validation { fields, .. } | Self::Conflict { fields, .. } => {
        Some(fields)
      }
      _ => None,
    }
  }

  /// A validation error pinned to a single field.
  pub fn invalid_field(
    field: impl Into<String>,
    message: impl Into<String>,
  ) -> Self {
    let message = message.into();
    let mut fields = FieldErrors::new();
    fields.insert(field.into(), message.clone());
    Self::Validation { message, fields }
  }

  /// A conflict error pinned to a single field.
  pub fn conflict_on(
    field: impl Into<String>,
    message: impl Into<String>,
  ) -> Self {
    let message = message.into();
    let mut fields = FieldErrors::new();
    fields.insert(field.into(), message.clone());
    Self::Conflict { message, fields }
  }

  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

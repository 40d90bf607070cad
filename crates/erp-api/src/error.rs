//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the API as
//! `{"error": {"kind": ..., "message": ..., "fields": {...}}}`.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use erp_core::{Error, ErrorKind, FieldErrors};
use serde::Serialize;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self(Error::Validation {
      message: rejection.body_text(),
      fields:  FieldErrors::new(),
    })
  }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::Validation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
    ErrorKind::NotFound => StatusCode::NOT_FOUND,
    ErrorKind::Forbidden => StatusCode::FORBIDDEN,
    ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
    ErrorKind::Server => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

#[derive(Serialize)]
struct Body<'a> {
  error: Detail<'a>,
}

#[derive(Serialize)]
struct Detail<'a> {
  kind:    ErrorKind,
  message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  fields:  Option<&'a FieldErrors>,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let kind = self.0.kind();
    let message = if kind == ErrorKind::Server {
      tracing::error!(error = %self.0, "request failed");
      "Internal server error".to_owned()
    } else {
      self.0.to_string()
    };
    let body = Body {
      error: Detail { kind, message, fields: self.0.fields() },
    };
    (status_for(kind), Json(body)).into_response()
  }
}

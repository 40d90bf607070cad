//! Request extractors: JSON bodies with API-shaped rejections, and bearer
//! token authentication.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
  http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use erp_core::{Error, account::Role, store::CampusStore};
use erp_service::{Campus, Claims};

use crate::error::ApiError;

/// `axum::Json`, except a malformed body (bad syntax, wrong types, unknown
/// fields) is reported as a `validation` error.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
  S: Send + Sync,
  Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state).await?;
    Ok(Self(value))
  }
}

/// The raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
  headers
    .get(AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| {
      Error::Authentication("Authentication failed. No token provided.".into())
    })
}

fn authorize<S: CampusStore>(
  parts: &Parts,
  campus: &Campus<S>,
  roles: &[Role],
) -> Result<Claims, ApiError> {
  let token = bearer_token(&parts.headers)?;
  Ok(campus.authorize(token, roles)?)
}

/// A valid token of any role.
#[derive(Debug, Clone)]
pub struct AnyUser(pub Claims);

impl<S: CampusStore> FromRequestParts<Campus<S>> for AnyUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    campus: &Campus<S>,
  ) -> Result<Self, Self::Rejection> {
    authorize(parts, campus, &[Role::Admin, Role::Faculty, Role::Student])
      .map(Self)
  }
}

/// Present in a handler means the request carried a valid admin token.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl<S: CampusStore> FromRequestParts<Campus<S>> for AdminUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    campus: &Campus<S>,
  ) -> Result<Self, Self::Rejection> {
    authorize(parts, campus, &[Role::Admin]).map(Self)
  }
}

/// A valid faculty token.
#[derive(Debug, Clone)]
pub struct FacultyUser(pub Claims);

impl<S: CampusStore> FromRequestParts<Campus<S>> for FacultyUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    campus: &Campus<S>,
  ) -> Result<Self, Self::Rejection> {
    authorize(parts, campus, &[Role::Faculty]).map(Self)
  }
}

/// A valid student token. Whether the student is still active is checked by
/// the operation itself.
#[derive(Debug, Clone)]
pub struct StudentUser(pub Claims);

impl<S: CampusStore> FromRequestParts<Campus<S>> for StudentUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    campus: &Campus<S>,
  ) -> Result<Self, Self::Rejection> {
    authorize(parts, campus, &[Role::Student]).map(Self)
  }
}

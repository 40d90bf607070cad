//! Login handlers for the three identity pools.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/admin/login`   | Body: `{"username":"…","password":"…"}` |
//! | `POST` | `/api/faculty/login` | Same body |
//! | `POST` | `/api/student/login` | Same body; account must be `active` |

use axum::{Json, extract::State};
use erp_core::{
  account::{Admin, Faculty},
  store::CampusStore,
  student::Student,
};
use erp_service::{Campus, login::Session};
use serde::Deserialize;

use crate::{error::ApiError, extract::AppJson};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

/// `POST /api/admin/login`
pub async fn admin<S: CampusStore>(
  State(campus): State<Campus<S>>,
  AppJson(body): AppJson<Credentials>,
) -> Result<Json<Session<Admin>>, ApiError> {
  let session = campus.login_admin(body.username.trim(), body.password).await?;
  Ok(Json(session))
}

/// `POST /api/faculty/login`
pub async fn faculty<S: CampusStore>(
  State(campus): State<Campus<S>>,
  AppJson(body): AppJson<Credentials>,
) -> Result<Json<Session<Faculty>>, ApiError> {
  let session = campus
    .login_faculty(body.username.trim(), body.password)
    .await?;
  Ok(Json(session))
}

/// `POST /api/student/login`
pub async fn student<S: CampusStore>(
  State(campus): State<Campus<S>>,
  AppJson(body): AppJson<Credentials>,
) -> Result<Json<Session<Student>>, ApiError> {
  let session = campus
    .login_student(body.username.trim(), body.password)
    .await?;
  Ok(Json(session))
}

//! Per-role login and bearer-token authorization.
//!
//! Admin, faculty and student accounts are separate identity pools, each with
//! its own login operation. A username is only ever resolved within the pool
//! the caller names.

use erp_core::{
  Error, Result,
  account::{Admin, Faculty, Role},
  store::CampusStore,
  student::Student,
};
use serde::Serialize;

use crate::{Campus, store_error, token::Claims};

/// A record annotated with the role it authenticated as.
#[derive(Debug, Clone, Serialize)]
pub struct Identity<T> {
  #[serde(flatten)]
  pub record: T,
  pub role:   Role,
}

/// Successful login: the identity plus a freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct Session<T> {
  pub result: Identity<T>,
  pub token:  String,
}

fn unknown(role: Role) -> Error {
  Error::NotFound(format!("{} doesn't exist.", role.label()))
}

impl<S: CampusStore> Campus<S> {
  async fn check_password(
    &self,
    role: Role,
    username: &str,
    password: String,
    stored: String,
  ) -> Result<()> {
    if self.passwords.verify(password, stored).await? {
      Ok(())
    } else {
      tracing::warn!(%role, %username, "login rejected: password mismatch");
      Err(Error::Authentication("Invalid credentials".into()))
    }
  }

  fn open_session<T>(
    &self,
    record: T,
    role: Role,
    sub: &str,
    id: uuid::Uuid,
  ) -> Result<Session<T>> {
    let token = self.tokens.issue(sub, id, role)?;
    tracing::info!(%role, %sub, "login succeeded");
    Ok(Session { result: Identity { record, role }, token })
  }

  pub async fn login_admin(
    &self,
    username: &str,
    password: String,
  ) -> Result<Session<Admin>> {
    let admin = self
      .store
      .get_admin_by_username(username)
      .await
      .map_err(store_error)?
      .ok_or_else(|| unknown(Role::Admin))?;
    self
      .check_password(Role::Admin, username, password, admin.password_hash.clone())
      .await?;
    let (sub, id) = (admin.username.clone(), admin.id);
    self.open_session(admin, Role::Admin, &sub, id)
  }

  pub async fn login_faculty(
    &self,
    username: &str,
    password: String,
  ) -> Result<Session<Faculty>> {
    let faculty = self
      .store
      .get_faculty_by_username(username)
      .await
      .map_err(store_error)?
      .ok_or_else(|| unknown(Role::Faculty))?;
    self
      .check_password(Role::Faculty, username, password, faculty.password_hash.clone())
      .await?;
    let (sub, id) = (faculty.email.clone(), faculty.id);
    self.open_session(faculty, Role::Faculty, &sub, id)
  }

  /// Students must be `active`. The status gate runs before the password
  /// check, so a pending student learns of the pending state even with a
  /// wrong password.
  pub async fn login_student(
    &self,
    username: &str,
    password: String,
  ) -> Result<Session<Student>> {
    let student = self
      .store
      .get_student_by_username(username)
      .await
      .map_err(store_error)?
      .ok_or_else(|| unknown(Role::Student))?;
    if let Some(reason) = student.status.login_denial() {
      tracing::warn!(
        username = %student.username,
        status = %student.status,
        "login rejected by account status"
      );
      return Err(Error::Forbidden(reason.into()));
    }
    self
      .check_password(Role::Student, username, password, student.password_hash.clone())
      .await?;
    let (sub, id) = (student.email.clone(), student.id);
    self.open_session(student, Role::Student, &sub, id)
  }

  /// Verify a bearer token and require one of `allowed` roles.
  pub fn authorize(&self, token: &str, allowed: &[Role]) -> Result<Claims> {
    let claims = self.tokens.verify(token)?;
    if allowed.contains(&claims.role) {
      Ok(claims)
    } else {
      Err(Error::Forbidden("Access denied.".into()))
    }
  }
}

//! Admin and faculty accounts, and the role that names each identity pool.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, FieldErrors, Result, registration::is_valid_email};

/// One of the three independent identity pools. A username is only ever
/// looked up within a single pool.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Faculty,
  Student,
}

impl Role {
  /// Capitalised label used in user-facing messages.
  pub fn label(self) -> &'static str {
    match self {
      Self::Admin => "Admin",
      Self::Faculty => "Faculty",
      Self::Student => "Student",
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
  pub id:               Uuid,
  pub username:         String,
  pub name:             String,
  pub email:            String,
  #[serde(skip_serializing)]
  pub password_hash:    String,
  pub password_updated: bool,
  pub created_at:       DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
  pub id:               Uuid,
  pub username:         String,
  pub name:             String,
  pub email:            String,
  pub department:       String,
  #[serde(skip_serializing)]
  pub password_hash:    String,
  pub password_updated: bool,
  pub created_at:       DateTime<Utc>,
  pub contact_number:   Option<String>,
  pub dob:              Option<NaiveDate>,
  pub designation:      Option<String>,
  pub avatar:           Option<String>,
}

/// Input to [`crate::store::CampusStore::add_admin`].
#[derive(Debug, Clone)]
pub struct NewAdmin {
  pub username:         String,
  pub name:             String,
  pub email:            String,
  pub password_hash:    String,
  pub password_updated: bool,
}

/// Input to [`crate::store::CampusStore::add_faculty`].
#[derive(Debug, Clone)]
pub struct NewFaculty {
  pub username:         String,
  pub name:             String,
  pub email:            String,
  pub department:       String,
  pub password_hash:    String,
  pub password_updated: bool,
}

/// Body of `POST /api/admin/addfaculty`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FacultyForm {
  pub username:   Option<String>,
  pub name:       Option<String>,
  pub email:      Option<String>,
  pub department: Option<String>,
  /// Initial password handed to the faculty member out of band.
  pub password:   Option<String>,
}

/// A faculty account request that passed boundary validation. The password is
/// still plaintext here.
#[derive(Debug, Clone)]
pub struct FacultyRegistration {
  pub username:   String,
  pub name:       String,
  pub email:      String,
  pub department: String,
  pub password:   String,
}

impl FacultyForm {
  pub fn validate(self) -> Result<FacultyRegistration> {
    let mut missing = FieldErrors::new();
    let mut take = |field: &str, v: Option<String>| match v {
      Some(v) if !v.trim().is_empty() => Some(v),
      _ => {
        missing.insert(field.to_owned(), format!("{field} is required"));
        None
      }
    };
    let username = take("username", self.username);
    let name = take("name", self.name);
    let email = take("email", self.email);
    let department = take("department", self.department);
    let password = take("password", self.password);

    let (Some(username), Some(name), Some(email), Some(department), Some(password)) =
      (username, name, email, department, password)
    else {
      return Err(Error::Validation {
        message: "All required fields must be provided".into(),
        fields:  missing,
      });
    };

    let email = email.trim().to_owned();
    if !is_valid_email(&email) {
      return Err(Error::invalid_field("email", "Invalid email format"));
    }
    let username = username.trim().to_owned();
    if username.chars().any(char::is_whitespace) {
      return Err(Error::invalid_field(
        "username",
        "Username must not contain whitespace",
      ));
    }

    Ok(FacultyRegistration {
      username,
      name: name.trim().to_owned(),
      email,
      department: department.trim().to_owned(),
      password,
    })
  }
}

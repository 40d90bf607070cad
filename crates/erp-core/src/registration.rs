//! Boundary validation for student self-registration.
//!
//! [`RegistrationForm`] is the wire shape: every field is optional so that a
//! missing field is reported as a validation error naming that field rather
//! than as an opaque decode failure. [`RegistrationForm::validate`] turns it
//! into a fully typed [`Registration`].

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{Error, FieldErrors, Result};

/// Body of `POST /api/student/register`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegistrationForm {
  pub name:           Option<String>,
  pub email:          Option<String>,
  pub password:       Option<String>,
  pub contact_number: Option<String>,
  pub dob:            Option<String>,
  pub department:     Option<String>,
  pub year:           Option<u8>,
  pub section:        Option<String>,
  pub avatar:         Option<String>,
}

/// A registration that passed every check that does not need the store.
#[derive(Debug, Clone)]
pub struct Registration {
  pub name:           String,
  pub email:          String,
  pub password:       String,
  pub contact_number: String,
  pub dob:            NaiveDate,
  pub department:     String,
  pub year:           u8,
  pub section:        String,
  /// The supplied avatar URI, or the generated default.
  pub avatar:         String,
}

impl RegistrationForm {
  pub fn validate(self) -> Result<Registration> {
    let mut missing = FieldErrors::new();
    let name = required(&mut missing, "name", self.name);
    let email = required(&mut missing, "email", self.email);
    let password = required(&mut missing, "password", self.password);
    let contact_number =
      required(&mut missing, "contactNumber", self.contact_number);
    let dob = required(&mut missing, "dob", self.dob);
    let department = required(&mut missing, "department", self.department);
    let section = required(&mut missing, "section", self.section);
    if self.year.is_none() {
      missing.insert("year".into(), "year is required".into());
    }

    let (
      Some(name),
      Some(email),
      Some(password),
      Some(contact_number),
      Some(dob),
      Some(department),
      Some(year),
      Some(section),
    ) = (
      name,
      email,
      password,
      contact_number,
      dob,
      department,
      self.year,
      section,
    )
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

    let dob = parse_date("dob", &dob)?;

    if year == 0 {
      return Err(Error::invalid_field("year", "year must be at least 1"));
    }

    let name = name.trim().to_owned();
    let avatar = self
      .avatar
      .map(|a| a.trim().to_owned())
      .filter(|a| !a.is_empty())
      .unwrap_or_else(|| default_avatar(&name));

    Ok(Registration {
      name,
      email,
      password,
      contact_number: contact_number.trim().to_owned(),
      dob,
      department: department.trim().to_owned(),
      year,
      section: section.trim().to_owned(),
      avatar,
    })
  }
}

/// Record `field` as missing when the value is absent or blank.
pub(crate) fn required(
  missing: &mut FieldErrors,
  field: &str,
  value: Option<String>,
) -> Option<String> {
  match value {
    Some(v) if !v.trim().is_empty() => Some(v),
    _ => {
      missing.insert(field.to_owned(), format!("{field} is required"));
      None
    }
  }
}

/// Parse a `YYYY-MM-DD` calendar date supplied in `field`.
pub(crate) fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
    Error::invalid_field(field, format!("{field} must be formatted YYYY-MM-DD"))
  })
}

/// Accepts `local@domain.tld`: no whitespace, exactly one `@`, and a dot in
/// the domain with at least one character on each side of it.
pub fn is_valid_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  domain
    .char_indices()
    .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Placeholder avatar rendered from the student's initials.
pub fn default_avatar(name: &str) -> String {
  format!(
    "https://ui-avatars.com/api/?name={}&background=random",
    urlencoding::encode(name)
  )
}

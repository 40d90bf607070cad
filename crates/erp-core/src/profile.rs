//! Self-service profile edits for students and faculty.
//!
//! Every field is optional; an absent or blank field leaves the stored value
//! alone. The caller's identity comes from their token, never from the body,
//! and neither form can touch a username, email, password or status.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{Error, Result, registration::parse_date};

/// Body of `POST /api/student/updateprofile`.
///
/// The department is fixed at registration because it is baked into the
/// username, so it is not accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudentProfileForm {
  pub name:                  Option<String>,
  pub dob:                   Option<String>,
  pub contact_number:        Option<String>,
  pub avatar:                Option<String>,
  pub year:                  Option<u8>,
  pub section:               Option<String>,
  pub batch:                 Option<String>,
  pub father_name:           Option<String>,
  pub mother_name:           Option<String>,
  pub father_contact_number: Option<String>,
}

/// A validated student profile change. `None` means "keep".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentProfileUpdate {
  pub name:                  Option<String>,
  pub dob:                   Option<NaiveDate>,
  pub contact_number:        Option<String>,
  pub avatar:                Option<String>,
  pub year:                  Option<u8>,
  pub section:               Option<String>,
  pub batch:                 Option<String>,
  pub father_name:           Option<String>,
  pub mother_name:           Option<String>,
  pub father_contact_number: Option<String>,
}

impl StudentProfileForm {
  pub fn validate(self) -> Result<StudentProfileUpdate> {
    if self.year == Some(0) {
      return Err(Error::invalid_field("year", "year must be at least 1"));
    }
    Ok(StudentProfileUpdate {
      name:                  present(self.name),
      dob:                   present(self.dob)
        .map(|d| parse_date("dob", &d))
        .transpose()?,
      contact_number:        present(self.contact_number),
      avatar:                present(self.avatar),
      year:                  self.year,
      section:               present(self.section),
      batch:                 present(self.batch),
      father_name:           present(self.father_name),
      mother_name:           present(self.mother_name),
      father_contact_number: present(self.father_contact_number),
    })
  }
}

/// Body of `POST /api/faculty/updateprofile`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FacultyProfileForm {
  pub name:           Option<String>,
  pub dob:            Option<String>,
  pub department:     Option<String>,
  pub contact_number: Option<String>,
  pub designation:    Option<String>,
  pub avatar:         Option<String>,
}

/// A validated faculty profile change. `None` means "keep".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacultyProfileUpdate {
  pub name:           Option<String>,
  pub dob:            Option<NaiveDate>,
  /// Must name an existing department; the service checks this.
  pub department:     Option<String>,
  pub contact_number: Option<String>,
  pub designation:    Option<String>,
  pub avatar:         Option<String>,
}

impl FacultyProfileForm {
  pub fn validate(self) -> Result<FacultyProfileUpdate> {
    Ok(FacultyProfileUpdate {
      name:           present(self.name),
      dob:            present(self.dob)
        .map(|d| parse_date("dob", &d))
        .transpose()?,
      department:     present(self.department),
      contact_number: present(self.contact_number),
      designation:    present(self.designation),
      avatar:         present(self.avatar),
    })
  }
}

/// Trimmed value, or `None` when absent or blank.
fn present(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

//! The department directory: names and the short codes used to namespace
//! generated usernames.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Longest accepted department code.
pub const MAX_CODE_LEN: usize = 8;

/// The directory installed by `erp-server --seed-departments`.
pub const DEFAULT_DEPARTMENTS: &[(&str, &str)] = &[
  ("Computer Science", "CS"),
  ("Electronics", "EC"),
  ("Mechanical", "ME"),
  ("Civil", "CE"),
  ("Electrical", "EE"),
  ("Information Technology", "IT"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
  pub department:      String,
  pub department_code: String,
}

/// Body of `POST /api/admin/adddepartment`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DepartmentForm {
  pub department:      Option<String>,
  pub department_code: Option<String>,
}

impl DepartmentForm {
  pub fn validate(self) -> Result<Department> {
    let name = self
      .department
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty())
      .ok_or_else(|| Error::invalid_field("department", "Department name is required"))?;
    let code = self
      .department_code
      .ok_or_else(|| {
        Error::invalid_field("departmentCode", "Department code is required")
      })
      .and_then(|c| normalize_code(&c))?;
    Ok(Department { department: name, department_code: code })
  }
}

/// Trim and upper-case a department code, rejecting anything that is not 1 to
/// [`MAX_CODE_LEN`] ASCII letters.
///
/// Codes sit between the year and the digit sequence in a username, so a
/// trailing digit would let `CS1` + `000` collide with `CS` + `1000`.
pub fn normalize_code(raw: &str) -> Result<String> {
  let code = raw.trim();
  if code.is_empty()
    || code.len() > MAX_CODE_LEN
    || !code.chars().all(|c| c.is_ascii_alphabetic())
  {
    return Err(Error::invalid_field(
      "departmentCode",
      format!("Department code must be 1-{MAX_CODE_LEN} letters"),
    ));
  }
  Ok(code.to_ascii_uppercase())
}

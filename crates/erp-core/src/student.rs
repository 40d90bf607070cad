//! Student records and their approval lifecycle.
//!
//! A student is created `pending` by self-registration and only the approval
//! operation moves it between states:
//!
//! ```text
//!  pending --approve--> active
//!  pending --reject---> inactive
//!  active  <---------> inactive
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Account lifecycle flag. Only `active` students may log in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StudentStatus {
  #[default]
  Pending,
  Active,
  Inactive,
}

impl StudentStatus {
  /// The reason a student in this state is refused a login, or `None` if the
  /// state permits one.
  pub fn login_denial(self) -> Option<&'static str> {
    match self {
      Self::Pending => {
        Some("Your account is pending approval by the administrator.")
      }
      Self::Inactive => Some(
        "Your account has been deactivated. Please contact the administrator.",
      ),
      Self::Active => None,
    }
  }
}

/// The two outcomes an administrator can choose. `pending` is never a valid
/// target, so it is not representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
  Active,
  Inactive,
}

impl From<ApprovalDecision> for StudentStatus {
  fn from(d: ApprovalDecision) -> Self {
    match d {
      ApprovalDecision::Active => Self::Active,
      ApprovalDecision::Inactive => Self::Inactive,
    }
  }
}

// ─── Student ─────────────────────────────────────────────────────────────────

/// A persisted student. `password_hash` is never serialised.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub id:                    Uuid,
  pub username:              String,
  pub email:                 String,
  #[serde(skip_serializing)]
  pub password_hash:         String,
  pub name:                  String,
  pub contact_number:        String,
  pub dob:                   NaiveDate,
  pub department:            String,
  pub year:                  u8,
  pub section:               String,
  pub avatar:                String,
  pub status:                StudentStatus,
  pub password_updated:      bool,
  pub created_at:            DateTime<Utc>,

  // Filled in later through the profile update.
  pub batch:                 Option<String>,
  pub father_name:           Option<String>,
  pub mother_name:           Option<String>,
  pub father_contact_number: Option<String>,
}

/// Input to [`crate::store::CampusStore::register_student`].
///
/// The store assigns `id`, `username` and `created_at`, and always writes
/// `status = pending`.
#[derive(Debug, Clone)]
pub struct NewStudent {
  pub email:            String,
  pub password_hash:    String,
  pub name:             String,
  pub contact_number:   String,
  pub dob:              NaiveDate,
  pub department:       String,
  pub year:             u8,
  pub section:          String,
  pub avatar:           String,
  pub password_updated: bool,
  /// Calendar year embedded in the generated username.
  pub issued_in:        i32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_text_roundtrips_through_strum() {
    for s in [
      StudentStatus::Pending,
      StudentStatus::Active,
      StudentStatus::Inactive,
    ] {
      assert_eq!(s.to_string().parse::<StudentStatus>().unwrap(), s);
    }
    assert_eq!(StudentStatus::Inactive.to_string(), "inactive");
  }

  #[test]
  fn only_active_may_log_in() {
    assert!(StudentStatus::Active.login_denial().is_none());
    assert!(StudentStatus::Pending.login_denial().unwrap().contains("pending"));
    assert!(
      StudentStatus::Inactive
        .login_denial()
        .unwrap()
        .contains("deactivated")
    );
  }

  #[test]
  fn decision_rejects_pending() {
    let d: ApprovalDecision = serde_json::from_str("\"active\"").unwrap();
    assert_eq!(StudentStatus::from(d), StudentStatus::Active);
    assert!(serde_json::from_str::<ApprovalDecision>("\"pending\"").is_err());
  }
}

//! Handlers for `/api/student/*`. Registration is public; the rest take a
//! [`StudentUser`] and act on the caller's own record.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/register` | Creates a `pending` account |
//! | `POST` | `/updateprofile` | Department and email are fixed |
//! | `POST` | `/testresult` | Marks for the caller's class |
//! | `POST` | `/attendance` | Per-subject totals |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use erp_core::{
  academic::{AttendanceSummary, TestResult},
  profile::StudentProfileForm,
  registration::RegistrationForm,
  store::CampusStore,
  student::{Student, StudentStatus},
};
use erp_service::Campus;
use serde::Serialize;

use crate::{
  error::ApiError,
  extract::{AppJson, StudentUser},
  reply::Listing,
};

#[derive(Debug, Serialize)]
pub struct Registered {
  pub success: bool,
  pub message: &'static str,
  pub student: RegisteredStudent,
}

/// The slice of the new record echoed back to the registrant.
#[derive(Debug, Serialize)]
pub struct RegisteredStudent {
  pub name:     String,
  pub email:    String,
  pub username: String,
  pub status:   StudentStatus,
}

impl From<Student> for RegisteredStudent {
  fn from(s: Student) -> Self {
    Self {
      name:     s.name,
      email:    s.email,
      username: s.username,
      status:   s.status,
    }
  }
}

/// `POST /api/student/register` → 201
pub async fn register<S: CampusStore>(
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<RegistrationForm>,
) -> Result<impl IntoResponse, ApiError> {
  let student = campus.register_student(form).await?;
  Ok((
    StatusCode::CREATED,
    Json(Registered {
      success: true,
      message: "Registration successful. Your account is pending approval by \
                the administrator.",
      student: student.into(),
    }),
  ))
}

/// `POST /api/student/updateprofile`
pub async fn update_profile<S: CampusStore>(
  StudentUser(claims): StudentUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<StudentProfileForm>,
) -> Result<Json<Student>, ApiError> {
  Ok(Json(campus.update_student_profile(&claims, form).await?))
}

/// `POST /api/student/testresult`
pub async fn test_results<S: CampusStore>(
  StudentUser(claims): StudentUser,
  State(campus): State<Campus<S>>,
) -> Result<Json<Listing<TestResult>>, ApiError> {
  Ok(Json(campus.test_results(&claims).await?.into()))
}

/// `POST /api/student/attendance`
pub async fn attendance<S: CampusStore>(
  StudentUser(claims): StudentUser,
  State(campus): State<Campus<S>>,
) -> Result<Json<Listing<AttendanceSummary>>, ApiError> {
  Ok(Json(campus.attendance(&claims).await?.into()))
}

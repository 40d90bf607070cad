//! Handlers for the faculty-only `/api/faculty/*` endpoints. Each takes a
//! [`FacultyUser`], so only a valid faculty token reaches the service layer.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/updateprofile` | Changes the caller's own record |
//! | `POST` | `/createtest` | One test per class, subject and name |
//! | `POST` | `/gettest` | Body: `{"department","year","section"}` |
//! | `POST` | `/getstudent` | Active students of a class |
//! | `POST` | `/uploadmarks` | Once per test |
//! | `POST` | `/markattendance` | One lecture for the whole class |

use axum::{Json, extract::State, http::StatusCode};
use erp_core::{
  academic::{AttendanceForm, ClassForm, MarksForm, Test, TestForm},
  account::Faculty,
  profile::FacultyProfileForm,
  store::CampusStore,
  student::Student,
};
use erp_service::Campus;
use serde::Serialize;

use crate::{
  error::ApiError,
  extract::{AppJson, FacultyUser},
  reply::{Listing, Message},
};

/// `POST /api/faculty/updateprofile`
pub async fn update_profile<S: CampusStore>(
  FacultyUser(claims): FacultyUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<FacultyProfileForm>,
) -> Result<Json<Faculty>, ApiError> {
  Ok(Json(campus.update_faculty_profile(&claims, form).await?))
}

#[derive(Debug, Serialize)]
pub struct TestCreated {
  pub success:  bool,
  pub message:  &'static str,
  pub response: Test,
}

/// `POST /api/faculty/createtest` → 201
pub async fn create_test<S: CampusStore>(
  FacultyUser(claims): FacultyUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<TestForm>,
) -> Result<(StatusCode, Json<TestCreated>), ApiError> {
  let test = campus.create_test(form).await?;
  tracing::debug!(faculty = %claims.sub, test = %test.id, "test created");
  Ok((
    StatusCode::CREATED,
    Json(TestCreated {
      success:  true,
      message:  "Test added successfully",
      response: test,
    }),
  ))
}

/// `POST /api/faculty/gettest`
pub async fn tests<S: CampusStore>(
  _faculty: FacultyUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<ClassForm>,
) -> Result<Json<Listing<Test>>, ApiError> {
  Ok(Json(campus.class_tests(form).await?.into()))
}

/// `POST /api/faculty/getstudent`
pub async fn students<S: CampusStore>(
  _faculty: FacultyUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<ClassForm>,
) -> Result<Json<Listing<Student>>, ApiError> {
  Ok(Json(campus.class_students(form).await?.into()))
}

/// `POST /api/faculty/uploadmarks`
pub async fn upload_marks<S: CampusStore>(
  _faculty: FacultyUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<MarksForm>,
) -> Result<Json<Message>, ApiError> {
  campus.upload_marks(form).await?;
  Ok(Json(Message { message: "Marks uploaded successfully" }))
}

/// `POST /api/faculty/markattendance`
pub async fn mark_attendance<S: CampusStore>(
  _faculty: FacultyUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<AttendanceForm>,
) -> Result<Json<Message>, ApiError> {
  campus.mark_attendance(form).await?;
  Ok(Json(Message { message: "Attendance marked successfully" }))
}

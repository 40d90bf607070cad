//! Handlers for the admin-only `/api/admin/*` endpoints. Every handler here
//! takes an [`AdminUser`], so a request without a valid admin token never
//! reaches the service layer.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/pendingstudents` | Oldest registration first |
//! | `POST` | `/updatestudentregistration` | Body: `{"studentId","status","message"?}` |
//! | `GET`  | `/getalldepartment` | Ordered by name |
//! | `POST` | `/adddepartment` | Body: `{"department","departmentCode"}` |
//! | `POST` | `/addfaculty` | Body: `{"username","name","email","department","password"}` |
//! | `POST` | `/addsubject` | Body: `{"subjectCode","subjectName","department","year"}` |
//! | `GET`  | `/getallsubject` | Ordered by code |
//! | `POST` | `/createnotice` | Body: `{"topic","date","content","from","noticeFor"}` |
//!
//! `POST /getnotice` lives here too but accepts any signed-in role.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use erp_core::{
  Error,
  academic::{Subject, SubjectForm},
  account::{Faculty, FacultyForm},
  department::{Department, DepartmentForm},
  notice::{Notice, NoticeForm},
  store::CampusStore,
  student::{ApprovalDecision, Student},
};
use erp_service::Campus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{AdminUser, AnyUser, AppJson},
};

// ─── Review queue ─────────────────────────────────────────────────────────────

/// `GET /api/admin/pendingstudents`
pub async fn pending_students<S: CampusStore>(
  _admin: AdminUser,
  State(campus): State<Campus<S>>,
) -> Result<Json<Vec<Student>>, ApiError> {
  Ok(Json(campus.pending_students().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApprovalRequest {
  /// Kept as text: an id that is not a UUID names no student.
  pub student_id: String,
  pub status:     ApprovalDecision,
  #[serde(default)]
  pub message:    Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
  pub success: bool,
  pub message: String,
  pub student: Student,
}

/// `POST /api/admin/updatestudentregistration`
pub async fn update_registration<S: CampusStore>(
  AdminUser(claims): AdminUser,
  State(campus): State<Campus<S>>,
  AppJson(body): AppJson<ApprovalRequest>,
) -> Result<Json<ApprovalResponse>, ApiError> {
  tracing::debug!(admin = %claims.sub, student = %body.student_id, "reviewing registration");
  let student_id = Uuid::parse_str(body.student_id.trim())
    .map_err(|_| Error::NotFound("Student not found".into()))?;
  let student = campus
    .update_registration(student_id, body.status, body.message)
    .await?;
  Ok(Json(ApprovalResponse {
    success: true,
    message: format!("Student status updated to {}", student.status),
    student,
  }))
}

// ─── Directory ────────────────────────────────────────────────────────────────

/// `GET /api/admin/getalldepartment`
pub async fn departments<S: CampusStore>(
  _admin: AdminUser,
  State(campus): State<Campus<S>>,
) -> Result<Json<Vec<Department>>, ApiError> {
  Ok(Json(campus.list_departments().await?))
}

/// `POST /api/admin/adddepartment` → 201
pub async fn add_department<S: CampusStore>(
  _admin: AdminUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<DepartmentForm>,
) -> Result<impl IntoResponse, ApiError> {
  let department = campus.add_department(form).await?;
  Ok((StatusCode::CREATED, Json(department)))
}

/// `POST /api/admin/addfaculty` → 201
pub async fn add_faculty<S: CampusStore>(
  _admin: AdminUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<FacultyForm>,
) -> Result<(StatusCode, Json<Faculty>), ApiError> {
  let faculty = campus.provision_faculty(form).await?;
  Ok((StatusCode::CREATED, Json(faculty)))
}

// ─── Subjects ─────────────────────────────────────────────────────────────────

/// `POST /api/admin/addsubject` → 201
pub async fn add_subject<S: CampusStore>(
  _admin: AdminUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<SubjectForm>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
  let subject = campus.add_subject(form).await?;
  Ok((StatusCode::CREATED, Json(subject)))
}

/// `GET /api/admin/getallsubject`
pub async fn subjects<S: CampusStore>(
  _admin: AdminUser,
  State(campus): State<Campus<S>>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  Ok(Json(campus.list_subjects().await?))
}

// ─── Notices ──────────────────────────────────────────────────────────────────

/// `POST /api/admin/createnotice` → 201
pub async fn create_notice<S: CampusStore>(
  _admin: AdminUser,
  State(campus): State<Campus<S>>,
  AppJson(form): AppJson<NoticeForm>,
) -> Result<(StatusCode, Json<Notice>), ApiError> {
  let notice = campus.create_notice(form).await?;
  Ok((StatusCode::CREATED, Json(notice)))
}

/// `POST /api/admin/getnotice`: notices addressed to the caller's role.
pub async fn notices<S: CampusStore>(
  AnyUser(claims): AnyUser,
  State(campus): State<Campus<S>>,
) -> Result<Json<Vec<Notice>>, ApiError> {
  Ok(Json(campus.notices(&claims).await?))
}

//! JSON REST API for the college ERP.
//!
//! Exposes an axum [`Router`] backed by a [`Campus`] over any
//! [`erp_core::store::CampusStore`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let limit = RateLimit::new(100, Duration::from_secs(15 * 60));
//! let app = erp_api::api_router(campus, limit);
//! axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
//!   .await?;
//! ```

pub mod admin;
pub mod error;
pub mod extract;
pub mod faculty;
pub mod login;
pub mod rate_limit;
pub mod reply;
pub mod student;

use axum::{
  Json, Router,
  extract::Request,
  http::{StatusCode, Uri},
  middleware::{self, Next},
  response::IntoResponse,
  routing::{get, post},
};
use erp_core::store::CampusStore;
use erp_service::Campus;
use serde_json::json;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use rate_limit::RateLimit;

/// Build the complete HTTP router for `campus`. With `limit`, every `/api`
/// route spends from the caller's budget.
pub fn api_router<S>(campus: Campus<S>, limit: Option<RateLimit>) -> Router<()>
where
  S: CampusStore + 'static,
{
  let api = Router::new()
    .route("/health", get(health))
    // Student
    .route("/student/register", post(student::register::<S>))
    .route("/student/login", post(login::student::<S>))
    .route("/student/updateprofile", post(student::update_profile::<S>))
    .route("/student/testresult", post(student::test_results::<S>))
    .route("/student/attendance", post(student::attendance::<S>))
    // Faculty
    .route("/faculty/login", post(login::faculty::<S>))
    .route("/faculty/updateprofile", post(faculty::update_profile::<S>))
    .route("/faculty/createtest", post(faculty::create_test::<S>))
    .route("/faculty/gettest", post(faculty::tests::<S>))
    .route("/faculty/getstudent", post(faculty::students::<S>))
    .route("/faculty/uploadmarks", post(faculty::upload_marks::<S>))
    .route("/faculty/markattendance", post(faculty::mark_attendance::<S>))
    // Admin
    .route("/admin/login", post(login::admin::<S>))
    .route("/admin/pendingstudents", get(admin::pending_students::<S>))
    .route(
      "/admin/updatestudentregistration",
      post(admin::update_registration::<S>),
    )
    .route("/admin/getalldepartment", get(admin::departments::<S>))
    .route("/admin/adddepartment", post(admin::add_department::<S>))
    .route("/admin/addfaculty", post(admin::add_faculty::<S>))
    .route("/admin/addsubject", post(admin::add_subject::<S>))
    .route("/admin/getallsubject", get(admin::subjects::<S>))
    .route("/admin/createnotice", post(admin::create_notice::<S>))
    .route("/admin/getnotice", post(admin::notices::<S>));

  let api = match limit {
    Some(rate) => api.route_layer(middleware::from_fn(move |req: Request, next: Next| {
      rate_limit::enforce(rate.clone(), req, next)
    })),
    None => api,
  };

  Router::new()
    .route("/", get(welcome))
    .nest("/api", api)
    .fallback(not_found)
    .layer(TraceLayer::new_for_http())
    .with_state(campus)
}

async fn welcome() -> &'static str { "Welcome to College ERP API" }

async fn health() -> Json<serde_json::Value> {
  Json(json!({ "status": "ok", "message": "API is healthy" }))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
  tracing::debug!(path = %uri.path(), "route not found");
  (StatusCode::NOT_FOUND, Json(json!({ "message": "Route not found" })))
}

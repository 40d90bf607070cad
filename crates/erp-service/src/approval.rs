//! The administrator's review queue.

use erp_core::{
  Error, Result,
  store::CampusStore,
  student::{ApprovalDecision, Student, StudentStatus},
};
use uuid::Uuid;

use crate::{Campus, store_error};

impl<S: CampusStore> Campus<S> {
  /// Students awaiting review, oldest registration first.
  pub async fn pending_students(&self) -> Result<Vec<Student>> {
    self
      .store
      .list_students(Some(StudentStatus::Pending))
      .await
      .map_err(store_error)
  }

  /// Move a student to `active` or `inactive`. Re-applying the current status
  /// is a no-op in effect; concurrent decisions are last-write-wins.
  ///
  /// `message` is recorded in the log only.
  pub async fn update_registration(
    &self,
    student_id: Uuid,
    decision: ApprovalDecision,
    message: Option<String>,
  ) -> Result<Student> {
    let status = StudentStatus::from(decision);
    let student = self
      .store
      .set_student_status(student_id, status)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound("Student not found".into()))?;

    tracing::info!(
      username = %student.username,
      %status,
      message = message.as_deref().unwrap_or(""),
      "registration status updated"
    );
    Ok(student)
  }
}

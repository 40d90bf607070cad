//! Self-service operations resolved from the caller's token.

use erp_core::{
  Error, Result,
  account::{Faculty, Role},
  profile::{FacultyProfileForm, StudentProfileForm},
  store::CampusStore,
  student::Student,
};

use crate::{Campus, store_error, token::Claims};

fn require_role(claims: &Claims, role: Role) -> Result<()> {
  if claims.role == role {
    Ok(())
  } else {
    Err(Error::Forbidden("Access denied.".into()))
  }
}

impl<S: CampusStore> Campus<S> {
  /// The student a token was issued to. A student deactivated after login is
  /// refused with the same message login would give.
  pub async fn current_student(&self, claims: &Claims) -> Result<Student> {
    require_role(claims, Role::Student)?;
    let student = self
      .store
      .get_student(claims.id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound("Student doesn't exist.".into()))?;
    if let Some(reason) = student.status.login_denial() {
      tracing::warn!(username = %student.username, status = %student.status, "token refused");
      return Err(Error::Forbidden(reason.into()));
    }
    Ok(student)
  }

  pub async fn current_faculty(&self, claims: &Claims) -> Result<Faculty> {
    require_role(claims, Role::Faculty)?;
    self
      .store
      .get_faculty(claims.id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound("Faculty doesn't exist.".into()))
  }

  pub async fn update_student_profile(
    &self,
    claims: &Claims,
    form: StudentProfileForm,
  ) -> Result<Student> {
    let update = form.validate()?;
    let student = self.current_student(claims).await?;
    let updated = self
      .store
      .update_student_profile(student.id, update)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound("Student doesn't exist.".into()))?;
    tracing::info!(username = %updated.username, "student profile updated");
    Ok(updated)
  }

  pub async fn update_faculty_profile(
    &self,
    claims: &Claims,
    form: FacultyProfileForm,
  ) -> Result<Faculty> {
    let update = form.validate()?;
    let faculty = self.current_faculty(claims).await?;
    if let Some(department) = &update.department
      && self
        .store
        .get_department(department)
        .await
        .map_err(store_error)?
        .is_none()
    {
      return Err(Error::NotFound("Department not found".into()));
    }
    let updated = self
      .store
      .update_faculty_profile(faculty.id, update)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound("Faculty doesn't exist.".into()))?;
    tracing::info!(username = %updated.username, "faculty profile updated");
    Ok(updated)
  }
}

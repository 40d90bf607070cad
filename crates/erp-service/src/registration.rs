//! Student self-registration.

use chrono::{Datelike as _, Utc};
use erp_core::{
  Error, Result,
  registration::RegistrationForm,
  store::CampusStore,
  student::{NewStudent, Student},
};

use crate::{Campus, store_error};

impl<S: CampusStore> Campus<S> {
  /// Validate a registration form and store the student as `pending`.
  ///
  /// Duplicate email and unknown department are checked before the password
  /// is hashed, and again inside the store's write transaction.
  pub async fn register_student(&self, form: RegistrationForm) -> Result<Student> {
    let reg = form.validate()?;

    if self
      .store
      .get_student_by_email(&reg.email)
      .await
      .map_err(store_error)?
      .is_some()
    {
      return Err(Error::conflict_on(
        "email",
        "A student with this email already exists",
      ));
    }

    if self
      .store
      .get_department(&reg.department)
      .await
      .map_err(store_error)?
      .is_none()
    {
      return Err(Error::NotFound("Department not found".into()));
    }

    let password_hash = self.passwords.hash(reg.password).await?;

    let student = self
      .store
      .register_student(NewStudent {
        email: reg.email,
        password_hash,
        name: reg.name,
        contact_number: reg.contact_number,
        dob: reg.dob,
        department: reg.department,
        year: reg.year,
        section: reg.section,
        avatar: reg.avatar,
        password_updated: self.policy.self_registered_password_updated,
        issued_in: Utc::now().year(),
      })
      .await
      .map_err(store_error)?;

    tracing::info!(
      username = %student.username,
      department = %student.department,
      "student registered; awaiting approval"
    );
    Ok(student)
  }
}

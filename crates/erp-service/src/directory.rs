//! Administrator-managed reference data: departments, faculty accounts and
//! the bootstrap admin.

use erp_core::{
  Error, Result,
  account::{Faculty, FacultyForm, NewAdmin, NewFaculty},
  department::{DEFAULT_DEPARTMENTS, Department, DepartmentForm},
  store::CampusStore,
};

use crate::{Campus, store_error};

impl<S: CampusStore> Campus<S> {
  pub async fn list_departments(&self) -> Result<Vec<Department>> {
    self.store.list_departments().await.map_err(store_error)
  }

  pub async fn add_department(&self, form: DepartmentForm) -> Result<Department> {
    let department = form.validate()?;
    let added = self
      .store
      .add_department(department)
      .await
      .map_err(store_error)?;
    tracing::info!(
      department = %added.department,
      code = %added.department_code,
      "department added"
    );
    Ok(added)
  }

  /// Insert every entry of [`DEFAULT_DEPARTMENTS`] whose name is not already
  /// present. Returns how many were inserted.
  pub async fn seed_departments(&self) -> Result<usize> {
    let mut inserted = 0;
    for (name, code) in DEFAULT_DEPARTMENTS {
      if self
        .store
        .get_department(name)
        .await
        .map_err(store_error)?
        .is_some()
      {
        continue;
      }
      self
        .store
        .add_department(Department {
          department:      (*name).to_owned(),
          department_code: (*code).to_owned(),
        })
        .await
        .map_err(store_error)?;
      inserted += 1;
    }
    tracing::info!(inserted, "default departments seeded");
    Ok(inserted)
  }

  /// Create a faculty account with an administrator-chosen username and
  /// initial password.
  pub async fn provision_faculty(&self, form: FacultyForm) -> Result<Faculty> {
    let reg = form.validate()?;
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
    let faculty = self
      .store
      .add_faculty(NewFaculty {
        username: reg.username,
        name: reg.name,
        email: reg.email,
        department: reg.department,
        password_hash,
        password_updated: self.policy.provisioned_password_updated,
      })
      .await
      .map_err(store_error)?;
    tracing::info!(username = %faculty.username, "faculty account created");
    Ok(faculty)
  }

  /// Insert `admin` unless an admin with that username exists. Returns whether
  /// a row was written.
  pub async fn ensure_admin(&self, admin: NewAdmin) -> Result<bool> {
    if self
      .store
      .get_admin_by_username(&admin.username)
      .await
      .map_err(store_error)?
      .is_some()
    {
      return Ok(false);
    }
    let added = self.store.add_admin(admin).await.map_err(store_error)?;
    tracing::info!(username = %added.username, "bootstrap admin created");
    Ok(true)
  }
}

//! Error type for `erp-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column could not be decoded into its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("department not found: {0}")]
  DepartmentNotFound(String),

  #[error("department already exists: {0}")]
  DuplicateDepartment(String),

  #[error("username already taken: {0}")]
  DuplicateUsername(String),

  #[error("subject already exists: {0}")]
  DuplicateSubject(String),

  #[error("test already exists: {0}")]
  DuplicateTest(String),

  #[error("marks already recorded for test {0}")]
  MarksAlreadyUploaded(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for erp_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::EmailTaken(_) => erp_core::Error::conflict_on(
        "email",
        "A student with this email already exists",
      ),
      Error::DepartmentNotFound(_) => {
        erp_core::Error::NotFound("Department not found".into())
      }
      Error::DuplicateDepartment(_) => erp_core::Error::conflict_on(
        "department",
        "Department name or code already exists",
      ),
      Error::DuplicateUsername(_) => {
        erp_core::Error::conflict_on("username", "Username already taken")
      }
      Error::DuplicateSubject(_) => {
        erp_core::Error::conflict_on("subjectCode", "Subject already exists")
      }
      Error::DuplicateTest(_) => {
        erp_core::Error::conflict_on("test", "Given Test is already created")
      }
      Error::MarksAlreadyUploaded(_) => erp_core::Error::conflict_on(
        "marks",
        "You have already uploaded marks of given exam",
      ),
      other => erp_core::Error::store(other),
    }
  }
}

//! The `CampusStore` trait.
//!
//! Implemented by storage backends (e.g. `erp-store-sqlite`). The service and
//! API layers depend on this abstraction, never on a concrete backend. The
//! store handle is built once by the process entry point and injected.

use std::future::Future;

use uuid::Uuid;

use crate::{
  academic::{
    AttendanceSheet, AttendanceSummary, ClassRef, MarkEntry, NewTest, Subject,
    Test, TestResult,
  },
  account::{Admin, Faculty, NewAdmin, NewFaculty},
  department::Department,
  notice::{NewNotice, Notice},
  profile::{FacultyProfileUpdate, StudentProfileUpdate},
  student::{NewStudent, Student, StudentStatus},
};

/// Abstraction over a persistence backend.
///
/// Backend errors must convert into [`crate::Error`] so that conditions the
/// backend detects (a duplicate email, an unknown department) keep their
/// [`crate::ErrorKind`] on the way out.
pub trait CampusStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Departments ───────────────────────────────────────────────────────

  /// Insert a department. Fails if the name or the code is already taken.
  fn add_department(
    &self,
    department: Department,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  /// Look up a department by its exact name.
  fn get_department<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + 'a;

  /// All departments, ordered by name.
  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  // ── Students ──────────────────────────────────────────────────────────

  /// Atomically check email uniqueness, resolve the department, allocate the
  /// next username sequence for `(department, issued_in)`, and insert the
  /// student with `status = pending`.
  ///
  /// Fails if the email is taken or the department does not exist; in either
  /// case nothing is written.
  fn register_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  fn get_student_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + 'a;

  fn get_student_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + 'a;

  /// Students with the given status (or all), oldest `created_at` first.
  fn list_students(
    &self,
    status: Option<StudentStatus>,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Overwrite a student's status. Returns `None` if `id` is unknown.
  fn set_student_status(
    &self,
    id: Uuid,
    status: StudentStatus,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Apply the `Some` fields of `update`. Returns `None` if `id` is unknown.
  fn update_student_profile(
    &self,
    id: Uuid,
    update: StudentProfileUpdate,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Active students of one class, ordered by username.
  fn list_class_students(
    &self,
    class: ClassRef,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  // ── Admins and faculty ────────────────────────────────────────────────

  fn add_admin(
    &self,
    input: NewAdmin,
  ) -> impl Future<Output = Result<Admin, Self::Error>> + Send + '_;

  fn get_admin_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + 'a;

  fn add_faculty(
    &self,
    input: NewFaculty,
  ) -> impl Future<Output = Result<Faculty, Self::Error>> + Send + '_;

  fn get_faculty_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Faculty>, Self::Error>> + Send + 'a;

  fn get_faculty(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Faculty>, Self::Error>> + Send + '_;

  /// Apply the `Some` fields of `update`. Returns `None` if `id` is unknown.
  fn update_faculty_profile(
    &self,
    id: Uuid,
    update: FacultyProfileUpdate,
  ) -> impl Future<Output = Result<Option<Faculty>, Self::Error>> + Send + '_;

  // ── Subjects and tests ────────────────────────────────────────────────

  /// Insert a subject. Fails if the code is already taken.
  fn add_subject(
    &self,
    subject: Subject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// All subjects, ordered by code.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Insert a test. Fails if the class already has a test with this name for
  /// this subject.
  fn add_test(
    &self,
    input: NewTest,
  ) -> impl Future<Output = Result<Test, Self::Error>> + Send + '_;

  /// Tests of one class, ordered by date then name.
  fn list_tests(
    &self,
    class: ClassRef,
  ) -> impl Future<Output = Result<Vec<Test>, Self::Error>> + Send + '_;

  fn find_test<'a>(
    &'a self,
    class: ClassRef,
    subject_code: &'a str,
    test: &'a str,
  ) -> impl Future<Output = Result<Option<Test>, Self::Error>> + Send + 'a;

  // ── Marks and attendance ──────────────────────────────────────────────

  /// Store the marks sheet for `test_id`. Fails, writing nothing, if any
  /// marks were already recorded for that test.
  fn record_marks(
    &self,
    test_id: Uuid,
    marks: Vec<MarkEntry>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Marks of `student_id` for every test of `class` that has them.
  fn results_for_student(
    &self,
    student_id: Uuid,
    class: ClassRef,
  ) -> impl Future<Output = Result<Vec<TestResult>, Self::Error>> + Send + '_;

  /// Count one lecture for every active student of the sheet's class and one
  /// attendance for each present student, atomically. Returns the number of
  /// students counted.
  fn mark_attendance(
    &self,
    sheet: AttendanceSheet,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Per-subject attendance of one student, ordered by subject code.
  fn attendance_for_student(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AttendanceSummary>, Self::Error>> + Send + '_;

  // ── Notices ───────────────────────────────────────────────────────────

  fn add_notice(
    &self,
    input: NewNotice,
  ) -> impl Future<Output = Result<Notice, Self::Error>> + Send + '_;

  /// Every notice, newest `date` first.
  fn list_notices(
    &self,
  ) -> impl Future<Output = Result<Vec<Notice>, Self::Error>> + Send + '_;
}

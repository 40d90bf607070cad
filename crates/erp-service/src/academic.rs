//! Subjects, tests, marks and attendance.
//!
//! Administrators maintain the subject catalogue. Faculty work on one class at
//! a time; students only ever see their own rows.

use std::collections::HashSet;

use erp_core::{
  Error, Result,
  academic::{
    AttendanceForm, AttendanceSummary, ClassForm, ClassRef, MarksForm, Subject,
    SubjectForm, Test, TestForm, TestResult,
  },
  store::CampusStore,
  student::Student,
};
use uuid::Uuid;

use crate::{Campus, store_error, token::Claims};

impl<S: CampusStore> Campus<S> {
  async fn require_department(&self, name: &str) -> Result<()> {
    match self.store.get_department(name).await.map_err(store_error)? {
      Some(_) => Ok(()),
      None => Err(Error::NotFound("Department not found".into())),
    }
  }

  async fn require_subject(&self, code: &str) -> Result<Subject> {
    self
      .store
      .get_subject(code)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound("Subject not found".into()))
  }

  async fn roster_ids(&self, class: &ClassRef) -> Result<HashSet<Uuid>> {
    let roster = self
      .store
      .list_class_students(class.clone())
      .await
      .map_err(store_error)?;
    Ok(roster.into_iter().map(|s| s.id).collect())
  }

  // ── Catalogue ─────────────────────────────────────────────────────────

  pub async fn add_subject(&self, form: SubjectForm) -> Result<Subject> {
    let subject = form.validate()?;
    self.require_department(&subject.department).await?;
    let added = self.store.add_subject(subject).await.map_err(store_error)?;
    tracing::info!(code = %added.subject_code, "subject added");
    Ok(added)
  }

  pub async fn list_subjects(&self) -> Result<Vec<Subject>> {
    self.store.list_subjects().await.map_err(store_error)
  }

  // ── Faculty ───────────────────────────────────────────────────────────

  pub async fn create_test(&self, form: TestForm) -> Result<Test> {
    let input = form.validate()?;
    self.require_department(&input.class.department).await?;
    self.require_subject(&input.subject_code).await?;
    let test = self.store.add_test(input).await.map_err(store_error)?;
    tracing::info!(
      subject = %test.subject_code,
      test = %test.test,
      department = %test.department,
      year = test.year,
      section = %test.section,
      "test created"
    );
    Ok(test)
  }

  pub async fn class_tests(&self, form: ClassForm) -> Result<Vec<Test>> {
    let class = form.validate()?;
    self.store.list_tests(class).await.map_err(store_error)
  }

  /// Active students of a class. An empty class is reported as not found.
  pub async fn class_students(&self, form: ClassForm) -> Result<Vec<Student>> {
    let class = form.validate()?;
    let students = self
      .store
      .list_class_students(class)
      .await
      .map_err(store_error)?;
    if students.is_empty() {
      return Err(Error::NotFound("No Student Found".into()));
    }
    Ok(students)
  }

  /// Record the one marks sheet a test may have. Every entry must name an
  /// active student of the test's class and stay within its total.
  pub async fn upload_marks(&self, form: MarksForm) -> Result<usize> {
    let upload = form.validate()?;
    let test = self
      .store
      .find_test(upload.class.clone(), &upload.subject_code, &upload.test)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound("Test not found".into()))?;

    let roster = self.roster_ids(&upload.class).await?;
    for entry in &upload.marks {
      if !roster.contains(&entry.student_id) {
        return Err(Error::invalid_field(
          "marks",
          format!("Student {} is not in this class", entry.student_id),
        ));
      }
      if entry.value > test.total_marks {
        return Err(Error::invalid_field(
          "marks",
          format!(
            "Marks for {} exceed the test total of {}",
            entry.student_id, test.total_marks
          ),
        ));
      }
    }

    let written = self
      .store
      .record_marks(test.id, upload.marks)
      .await
      .map_err(store_error)?;
    tracing::info!(test = %test.test, subject = %test.subject_code, written, "marks uploaded");
    Ok(written)
  }

  /// Take one lecture's roll call. Returns how many students were counted.
  pub async fn mark_attendance(&self, form: AttendanceForm) -> Result<usize> {
    let sheet = form.validate()?;
    self.require_subject(&sheet.subject_code).await?;

    let roster = self.roster_ids(&sheet.class).await?;
    if let Some(stranger) = sheet.present.iter().find(|id| !roster.contains(*id)) {
      return Err(Error::invalid_field(
        "selectedStudents",
        format!("Student {stranger} is not in this class"),
      ));
    }

    let subject = sheet.subject_code.clone();
    let present = sheet.present.len();
    let counted = self.store.mark_attendance(sheet).await.map_err(store_error)?;
    tracing::info!(%subject, counted, present, "attendance marked");
    Ok(counted)
  }

  // ── Student ───────────────────────────────────────────────────────────

  /// Marks of the calling student across their class's tests.
  pub async fn test_results(&self, claims: &Claims) -> Result<Vec<TestResult>> {
    let student = self.current_student(claims).await?;
    let class = ClassRef {
      department: student.department,
      year:       student.year,
      section:    student.section,
    };
    let tests = self
      .store
      .list_tests(class.clone())
      .await
      .map_err(store_error)?;
    if tests.is_empty() {
      return Err(Error::NotFound("No Test Found".into()));
    }
    self
      .store
      .results_for_student(student.id, class)
      .await
      .map_err(store_error)
  }

  /// Per-subject attendance of the calling student.
  pub async fn attendance(&self, claims: &Claims) -> Result<Vec<AttendanceSummary>> {
    let student = self.current_student(claims).await?;
    self
      .store
      .attendance_for_student(student.id)
      .await
      .map_err(store_error)
  }
}

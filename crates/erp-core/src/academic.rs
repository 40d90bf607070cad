//! Subjects, tests, marks and attendance.
//!
//! A class is a `(department, year, section)` triple. Faculty create tests for
//! a class, upload one set of marks per test, and take attendance per subject;
//! students read back their own results and attendance.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, FieldErrors, Result,
  registration::{parse_date, required},
};

/// Longest accepted subject code.
pub const MAX_SUBJECT_CODE_LEN: usize = 16;

// ─── Classes and subjects ────────────────────────────────────────────────────

/// A `(department, year, section)` cohort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRef {
  pub department: String,
  pub year:       u8,
  pub section:    String,
}

/// Body of `POST /api/faculty/gettest` and `POST /api/faculty/getstudent`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassForm {
  pub department: Option<String>,
  pub year:       Option<u8>,
  pub section:    Option<String>,
}

impl ClassForm {
  pub fn validate(self) -> Result<ClassRef> {
    let mut missing = FieldErrors::new();
    let class = class(&mut missing, self.department, self.year, self.section);
    finish(missing, class)?
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub subject_code: String,
  pub subject_name: String,
  pub department:   String,
  pub year:         u8,
}

/// Body of `POST /api/admin/addsubject`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubjectForm {
  pub subject_code: Option<String>,
  pub subject_name: Option<String>,
  pub department:   Option<String>,
  pub year:         Option<u8>,
}

impl SubjectForm {
  pub fn validate(self) -> Result<Subject> {
    let mut missing = FieldErrors::new();
    let code = required(&mut missing, "subjectCode", self.subject_code);
    let name = required(&mut missing, "subjectName", self.subject_name);
    let department = required(&mut missing, "department", self.department);
    let year = required_year(&mut missing, self.year);

    let (Some(code), Some(name), Some(department), Some(year)) =
      (code, name, department, year)
    else {
      return Err(missing_fields(missing));
    };
    check_year(year)?;
    Ok(Subject {
      subject_code: normalize_subject_code(&code)?,
      subject_name: name.trim().to_owned(),
      department:   department.trim().to_owned(),
      year,
    })
  }
}

/// Trim and upper-case a subject code such as `cs101`.
pub fn normalize_subject_code(raw: &str) -> Result<String> {
  let code = raw.trim();
  if code.is_empty()
    || code.len() > MAX_SUBJECT_CODE_LEN
    || !code.chars().all(|c| c.is_ascii_alphanumeric())
  {
    return Err(Error::invalid_field(
      "subjectCode",
      format!("Subject code must be 1-{MAX_SUBJECT_CODE_LEN} letters or digits"),
    ));
  }
  Ok(code.to_ascii_uppercase())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

/// A named assessment (e.g. "Mid Term") for one subject in one class.
///
/// `(subject_code, department, year, section, test)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
  pub id:           Uuid,
  pub subject_code: String,
  pub department:   String,
  pub year:         u8,
  pub section:      String,
  pub test:         String,
  pub date:         NaiveDate,
  pub total_marks:  u32,
  pub created_at:   DateTime<Utc>,
}

impl Test {
  pub fn class(&self) -> ClassRef {
    ClassRef {
      department: self.department.clone(),
      year:       self.year,
      section:    self.section.clone(),
    }
  }
}

/// Input to [`crate::store::CampusStore::add_test`].
#[derive(Debug, Clone)]
pub struct NewTest {
  pub subject_code: String,
  pub class:        ClassRef,
  pub test:         String,
  pub date:         NaiveDate,
  pub total_marks:  u32,
}

/// Body of `POST /api/faculty/createtest`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestForm {
  pub subject_code: Option<String>,
  pub department:   Option<String>,
  pub year:         Option<u8>,
  pub section:      Option<String>,
  pub test:         Option<String>,
  pub date:         Option<String>,
  pub total_marks:  Option<u32>,
}

impl TestForm {
  pub fn validate(self) -> Result<NewTest> {
    let mut missing = FieldErrors::new();
    let code = required(&mut missing, "subjectCode", self.subject_code);
    let class = class(&mut missing, self.department, self.year, self.section);
    let test = required(&mut missing, "test", self.test);
    let date = required(&mut missing, "date", self.date);
    if self.total_marks.is_none() {
      missing.insert("totalMarks".into(), "totalMarks is required".into());
    }

    let (Some(code), Some(class), Some(test), Some(date), Some(total_marks)) =
      (code, class, test, date, self.total_marks)
    else {
      return Err(missing_fields(missing));
    };
    let class = class?;
    if total_marks == 0 {
      return Err(Error::invalid_field(
        "totalMarks",
        "totalMarks must be at least 1",
      ));
    }
    Ok(NewTest {
      subject_code: normalize_subject_code(&code)?,
      class,
      test: test.trim().to_owned(),
      date: parse_date("date", &date)?,
      total_marks,
    })
  }
}

// ─── Marks ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkEntry {
  pub student_id: Uuid,
  pub value:      u32,
}

/// Body of `POST /api/faculty/uploadmarks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarksForm {
  pub subject_code: Option<String>,
  pub department:   Option<String>,
  pub year:         Option<u8>,
  pub section:      Option<String>,
  pub test:         Option<String>,
  pub marks:        Option<Vec<MarkEntry>>,
}

/// A marks sheet that passed boundary validation. Whether the students belong
/// to the class and the values fit the test's total is checked against the
/// store.
#[derive(Debug, Clone)]
pub struct MarksUpload {
  pub subject_code: String,
  pub class:        ClassRef,
  pub test:         String,
  pub marks:        Vec<MarkEntry>,
}

impl MarksForm {
  pub fn validate(self) -> Result<MarksUpload> {
    let mut missing = FieldErrors::new();
    let code = required(&mut missing, "subjectCode", self.subject_code);
    let class = class(&mut missing, self.department, self.year, self.section);
    let test = required(&mut missing, "test", self.test);
    let marks = match self.marks {
      Some(m) if !m.is_empty() => Some(m),
      _ => {
        missing.insert("marks".into(), "marks is required".into());
        None
      }
    };

    let (Some(code), Some(class), Some(test), Some(marks)) =
      (code, class, test, marks)
    else {
      return Err(missing_fields(missing));
    };
    let class = class?;

    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = marks.iter().find(|m| !seen.insert(m.student_id)) {
      return Err(Error::invalid_field(
        "marks",
        format!("Student {} appears more than once", dup.student_id),
      ));
    }
    Ok(MarksUpload {
      subject_code: normalize_subject_code(&code)?,
      class,
      test: test.trim().to_owned(),
      marks,
    })
  }
}

/// One row of a student's `testresult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
  pub subject_code: String,
  pub subject_name: String,
  pub test:         String,
  pub marks:        u32,
  pub total_marks:  u32,
}

// ─── Attendance ──────────────────────────────────────────────────────────────

/// Body of `POST /api/faculty/markattendance`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttendanceForm {
  pub subject_code:      Option<String>,
  pub department:        Option<String>,
  pub year:              Option<u8>,
  pub section:           Option<String>,
  /// Students present at this lecture. May be empty.
  pub selected_students: Option<Vec<Uuid>>,
}

/// One lecture's roll call. Every active student in `class` is counted; those
/// in `present` are marked as attending.
#[derive(Debug, Clone)]
pub struct AttendanceSheet {
  pub subject_code: String,
  pub class:        ClassRef,
  pub present:      Vec<Uuid>,
}

impl AttendanceForm {
  pub fn validate(self) -> Result<AttendanceSheet> {
    let mut missing = FieldErrors::new();
    let code = required(&mut missing, "subjectCode", self.subject_code);
    let class = class(&mut missing, self.department, self.year, self.section);
    let (Some(code), Some(class)) = (code, class) else {
      return Err(missing_fields(missing));
    };
    let mut present = self.selected_students.unwrap_or_default();
    present.sort_unstable();
    present.dedup();
    Ok(AttendanceSheet {
      subject_code: normalize_subject_code(&code)?,
      class: class?,
      present,
    })
  }
}

/// Running attendance for one student in one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
  pub subject_code: String,
  pub subject_name: String,
  pub attended:     u32,
  pub total:        u32,
  /// `attended / total` as a percentage with two decimals, e.g. `"66.67"`.
  pub percentage:   String,
}

impl AttendanceSummary {
  pub fn new(
    subject_code: String,
    subject_name: String,
    attended: u32,
    total: u32,
  ) -> Self {
    let percentage = if total == 0 {
      0.0
    } else {
      f64::from(attended) / f64::from(total) * 100.0
    };
    Self {
      subject_code,
      subject_name,
      attended,
      total,
      percentage: format!("{percentage:.2}"),
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn required_year(missing: &mut FieldErrors, year: Option<u8>) -> Option<u8> {
  if year.is_none() {
    missing.insert("year".into(), "year is required".into());
  }
  year
}

fn check_year(year: u8) -> Result<()> {
  if year == 0 {
    return Err(Error::invalid_field("year", "year must be at least 1"));
  }
  Ok(())
}

/// Collect the class triple, recording missing parts. The inner `Result`
/// carries checks that only run once every part is present.
fn class(
  missing: &mut FieldErrors,
  department: Option<String>,
  year: Option<u8>,
  section: Option<String>,
) -> Option<Result<ClassRef>> {
  let department = required(missing, "department", department);
  let year = required_year(missing, year);
  let section = required(missing, "section", section);
  let (department, year, section) = (department?, year?, section?);
  Some(check_year(year).map(|()| ClassRef {
    department: department.trim().to_owned(),
    year,
    section: section.trim().to_owned(),
  }))
}

fn finish<T>(missing: FieldErrors, value: Option<T>) -> Result<T> {
  value.ok_or_else(|| missing_fields(missing))
}

pub(crate) fn missing_fields(fields: FieldErrors) -> Error {
  Error::Validation {
    message: "All required fields must be provided".into(),
    fields,
  }
}

//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed nanosecond width so
//! that lexical order matches chronological order. Dates are `YYYY-MM-DD`.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use erp_core::{
  academic::{Subject, Test},
  account::{Admin, Faculty},
  notice::{Audience, Notice},
  student::{Student, StudentStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── StudentStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: StudentStatus) -> String { s.to_string() }

pub fn decode_status(s: &str) -> Result<StudentStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown student status: {s:?}")))
}

// ─── Audience ─────────────────────────────────────────────────────────────────

pub fn decode_audience(s: &str) -> Result<Audience> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown notice audience: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawStudent::from_row`].
pub const STUDENT_COLUMNS: &str = "id, username, email, password_hash, name, \
  contact_number, dob, department, year, section, avatar, status, \
  password_updated, created_at, batch, father_name, mother_name, \
  father_contact_number";

/// Raw values read directly from a `students` row.
pub struct RawStudent {
  pub id:               String,
  pub username:         String,
  pub email:            String,
  pub password_hash:    String,
  pub name:             String,
  pub contact_number:   String,
  pub dob:              String,
  pub department:       String,
  pub year:             i64,
  pub section:          String,
  pub avatar:           String,
  pub status:           String,
  pub password_updated: bool,
  pub created_at:       String,
  pub batch:            Option<String>,
  pub father_name:      Option<String>,
  pub mother_name:      Option<String>,
  pub father_contact:   Option<String>,
}

impl RawStudent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      username:         row.get(1)?,
      email:            row.get(2)?,
      password_hash:    row.get(3)?,
      name:             row.get(4)?,
      contact_number:   row.get(5)?,
      dob:              row.get(6)?,
      department:       row.get(7)?,
      year:             row.get(8)?,
      section:          row.get(9)?,
      avatar:           row.get(10)?,
      status:           row.get(11)?,
      password_updated: row.get(12)?,
      created_at:       row.get(13)?,
      batch:            row.get(14)?,
      father_name:      row.get(15)?,
      mother_name:      row.get(16)?,
      father_contact:   row.get(17)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    let year = decode_year(self.year)?;
    Ok(Student {
      id: decode_uuid(&self.id)?,
      username: self.username,
      email: self.email,
      password_hash: self.password_hash,
      name: self.name,
      contact_number: self.contact_number,
      dob: decode_date(&self.dob)?,
      department: self.department,
      year,
      section: self.section,
      avatar: self.avatar,
      status: decode_status(&self.status)?,
      password_updated: self.password_updated,
      created_at: decode_dt(&self.created_at)?,
      batch: self.batch,
      father_name: self.father_name,
      mother_name: self.mother_name,
      father_contact_number: self.father_contact,
    })
  }
}

/// Column list matching [`RawAdmin::from_row`].
pub const ADMIN_COLUMNS: &str =
  "id, username, name, email, password_hash, password_updated, created_at";

/// Raw values read directly from an `admins` row.
pub struct RawAdmin {
  pub id:               String,
  pub username:         String,
  pub name:             String,
  pub email:            String,
  pub password_hash:    String,
  pub password_updated: bool,
  pub created_at:       String,
}

impl RawAdmin {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      username:         row.get(1)?,
      name:             row.get(2)?,
      email:            row.get(3)?,
      password_hash:    row.get(4)?,
      password_updated: row.get(5)?,
      created_at:       row.get(6)?,
    })
  }

  pub fn into_admin(self) -> Result<Admin> {
    Ok(Admin {
      id:               decode_uuid(&self.id)?,
      username:         self.username,
      name:             self.name,
      email:            self.email,
      password_hash:    self.password_hash,
      password_updated: self.password_updated,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawFaculty::from_row`].
pub const FACULTY_COLUMNS: &str = "id, username, name, email, department, \
  password_hash, password_updated, created_at, contact_number, dob, \
  designation, avatar";

/// Raw values read directly from a `faculty` row.
pub struct RawFaculty {
  pub id:               String,
  pub username:         String,
  pub name:             String,
  pub email:            String,
  pub department:       String,
  pub password_hash:    String,
  pub password_updated: bool,
  pub created_at:       String,
  pub contact_number:   Option<String>,
  pub dob:              Option<String>,
  pub designation:      Option<String>,
  pub avatar:           Option<String>,
}

impl RawFaculty {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      username:         row.get(1)?,
      name:             row.get(2)?,
      email:            row.get(3)?,
      department:       row.get(4)?,
      password_hash:    row.get(5)?,
      password_updated: row.get(6)?,
      created_at:       row.get(7)?,
      contact_number:   row.get(8)?,
      dob:              row.get(9)?,
      designation:      row.get(10)?,
      avatar:           row.get(11)?,
    })
  }

  pub fn into_faculty(self) -> Result<Faculty> {
    Ok(Faculty {
      id:               decode_uuid(&self.id)?,
      username:         self.username,
      name:             self.name,
      email:            self.email,
      department:       self.department,
      password_hash:    self.password_hash,
      password_updated: self.password_updated,
      created_at:       decode_dt(&self.created_at)?,
      contact_number:   self.contact_number,
      dob:              self.dob.as_deref().map(decode_date).transpose()?,
      designation:      self.designation,
      avatar:           self.avatar,
    })
  }
}

/// Column list matching [`RawSubject::from_row`].
pub const SUBJECT_COLUMNS: &str = "subject_code, subject_name, department, year";

pub struct RawSubject {
  pub subject_code: String,
  pub subject_name: String,
  pub department:   String,
  pub year:         i64,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_code: row.get(0)?,
      subject_name: row.get(1)?,
      department:   row.get(2)?,
      year:         row.get(3)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_code: self.subject_code,
      subject_name: self.subject_name,
      department:   self.department,
      year:         decode_year(self.year)?,
    })
  }
}

/// Column list matching [`RawTest::from_row`].
pub const TEST_COLUMNS: &str = "id, subject_code, department, year, section, \
  test, date, total_marks, created_at";

/// Raw values read directly from a `tests` row.
pub struct RawTest {
  pub id:           String,
  pub subject_code: String,
  pub department:   String,
  pub year:         i64,
  pub section:      String,
  pub test:         String,
  pub date:         String,
  pub total_marks:  i64,
  pub created_at:   String,
}

impl RawTest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      subject_code: row.get(1)?,
      department:   row.get(2)?,
      year:         row.get(3)?,
      section:      row.get(4)?,
      test:         row.get(5)?,
      date:         row.get(6)?,
      total_marks:  row.get(7)?,
      created_at:   row.get(8)?,
    })
  }

  pub fn into_test(self) -> Result<Test> {
    Ok(Test {
      id:           decode_uuid(&self.id)?,
      subject_code: self.subject_code,
      department:   self.department,
      year:         decode_year(self.year)?,
      section:      self.section,
      test:         self.test,
      date:         decode_date(&self.date)?,
      total_marks:  decode_count(self.total_marks)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub fn decode_year(year: i64) -> Result<u8> {
  u8::try_from(year).map_err(|_| Error::Decode(format!("year out of range: {year}")))
}

/// Marks and attendance counters are non-negative `u32`s.
pub fn decode_count(n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode(format!("count out of range: {n}")))
}

/// Column list matching [`RawNotice::from_row`].
pub const NOTICE_COLUMNS: &str =
  "id, topic, date, content, sender, notice_for, created_at";

/// Raw values read directly from a `notices` row.
pub struct RawNotice {
  pub id:         String,
  pub topic:      String,
  pub date:       String,
  pub content:    String,
  pub sender:     String,
  pub notice_for: String,
  pub created_at: String,
}

impl RawNotice {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      topic:      row.get(1)?,
      date:       row.get(2)?,
      content:    row.get(3)?,
      sender:     row.get(4)?,
      notice_for: row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_notice(self) -> Result<Notice> {
    Ok(Notice {
      id:         decode_uuid(&self.id)?,
      topic:      self.topic,
      date:       decode_date(&self.date)?,
      content:    self.content,
      from:       self.sender,
      notice_for: decode_audience(&self.notice_for)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

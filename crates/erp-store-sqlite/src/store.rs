//! [`SqliteStore`], the SQLite implementation of [`CampusStore`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use erp_core::{
  academic::{
    AttendanceSheet, AttendanceSummary, ClassRef, MarkEntry, NewTest, Subject,
    Test, TestResult,
  },
  account::{Admin, Faculty, NewAdmin, NewFaculty},
  department::Department,
  notice::{NewNotice, Notice},
  profile::{FacultyProfileUpdate, StudentProfileUpdate},
  store::CampusStore,
  student::{NewStudent, Student, StudentStatus},
  username::student_username,
};

use crate::{
  encode::{
    ADMIN_COLUMNS, FACULTY_COLUMNS, NOTICE_COLUMNS, RawAdmin, RawFaculty,
    RawNotice, RawStudent, RawSubject, RawTest, STUDENT_COLUMNS,
    SUBJECT_COLUMNS, TEST_COLUMNS,
    decode_count, encode_date, encode_dt, encode_status, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An ERP store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What happened inside the registration transaction.
enum Registered {
  Inserted { username: String },
  EmailTaken,
  DepartmentMissing,
  UsernameTaken(String),
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one student by an arbitrary unique column.
  async fn student_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<Student>> {
    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE {column} = ?1"),
              rusqlite::params![value],
              RawStudent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  /// Fetch one faculty member by an arbitrary unique column.
  async fn faculty_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<Faculty>> {
    let raw: Option<RawFaculty> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {FACULTY_COLUMNS} FROM faculty WHERE {column} = ?1"),
              rusqlite::params![value],
              RawFaculty::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFaculty::into_faculty).transpose()
  }
}

fn select_student(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawStudent>> {
  conn
    .query_row(
      &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
      rusqlite::params![id],
      RawStudent::from_row,
    )
    .optional()
}

/// Bind order shared by every query filtering on a class.
fn class_params(class: &ClassRef) -> (String, u8, String) {
  (class.department.clone(), class.year, class.section.clone())
}

// ─── CampusStore impl ────────────────────────────────────────────────────────

impl CampusStore for SqliteStore {
  type Error = Error;

  // ── Departments ───────────────────────────────────────────────────────────

  async fn add_department(&self, department: Department) -> Result<Department> {
    let name = department.department.clone();
    let code = department.department_code.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO departments (department, department_code) VALUES (?1, ?2)",
          rusqlite::params![name, code],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateDepartment(department.department));
    }
    Ok(department)
  }

  async fn get_department(&self, name: &str) -> Result<Option<Department>> {
    let name = name.to_owned();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT department, department_code FROM departments WHERE department = ?1",
              rusqlite::params![name],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(row.map(|(department, department_code)| Department {
      department,
      department_code,
    }))
  }

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT department, department_code FROM departments ORDER BY department",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(department, department_code)| Department {
          department,
          department_code,
        })
        .collect(),
    )
  }

  // ── Students ──────────────────────────────────────────────────────────────

  async fn register_student(&self, input: NewStudent) -> Result<Student> {
    let id         = Uuid::new_v4();
    let created_at = Utc::now();
    let status     = StudentStatus::Pending;

    let id_str     = encode_uuid(id);
    let at_str     = encode_dt(created_at);
    let dob_str    = encode_date(input.dob);
    let status_str = encode_status(status);
    let row        = input.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        // Write lock is held from the email check through the insert.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let email_taken = tx
          .query_row(
            "SELECT 1 FROM students WHERE email = ?1",
            rusqlite::params![row.email],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if email_taken {
          return Ok(Registered::EmailTaken);
        }

        let code: Option<String> = tx
          .query_row(
            "SELECT department_code FROM departments WHERE department = ?1",
            rusqlite::params![row.department],
            |r| r.get(0),
          )
          .optional()?;
        let Some(code) = code else {
          return Ok(Registered::DepartmentMissing);
        };

        // A fresh counter starts from the department's current head-count.
        // Sequences whose username is already held are skipped, so the
        // counter always moves past them.
        let username = loop {
          let sequence: i64 = tx.query_row(
            "INSERT INTO username_counters (department, year, issued)
             VALUES (?1, ?2, (SELECT COUNT(*) FROM students WHERE department = ?1) + 1)
             ON CONFLICT (department, year) DO UPDATE SET issued = issued + 1
             RETURNING issued - 1",
            rusqlite::params![row.department, row.issued_in],
            |r| r.get(0),
          )?;
          let sequence = u32::try_from(sequence)
            .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, sequence))?;
          let candidate = student_username(row.issued_in, &code, sequence);

          let held = tx
            .query_row(
              "SELECT 1 FROM students WHERE username = ?1",
              rusqlite::params![candidate],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if !held {
            break candidate;
          }
          tracing::debug!(username = %candidate, "username held, advancing sequence");
        };

        let inserted = tx.execute(
          &format!(
            "INSERT INTO students ({STUDENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                     NULL, NULL, NULL, NULL)"
          ),
          rusqlite::params![
            id_str,
            username,
            row.email,
            row.password_hash,
            row.name,
            row.contact_number,
            dob_str,
            row.department,
            row.year,
            row.section,
            row.avatar,
            status_str,
            row.password_updated,
            at_str,
          ],
        );
        match inserted {
          Ok(_) => {}
          Err(e) if is_constraint_violation(&e) => {
            return Ok(Registered::UsernameTaken(username));
          }
          Err(e) => return Err(e.into()),
        }

        tx.commit()?;
        Ok(Registered::Inserted { username })
      })
      .await?;

    match outcome {
      Registered::Inserted { username } => {
        tracing::debug!(%username, department = %input.department, "student row inserted");
        Ok(Student {
          id,
          username,
          email: input.email,
          password_hash: input.password_hash,
          name: input.name,
          contact_number: input.contact_number,
          dob: input.dob,
          department: input.department,
          year: input.year,
          section: input.section,
          avatar: input.avatar,
          status,
          password_updated: input.password_updated,
          created_at,
          batch: None,
          father_name: None,
          mother_name: None,
          father_contact_number: None,
        })
      }
      Registered::EmailTaken => Err(Error::EmailTaken(input.email)),
      Registered::DepartmentMissing => {
        Err(Error::DepartmentNotFound(input.department))
      }
      Registered::UsernameTaken(username) => Err(Error::DuplicateUsername(username)),
    }
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
    self.student_where("id", encode_uuid(id)).await
  }

  async fn get_student_by_username(&self, username: &str) -> Result<Option<Student>> {
    self.student_where("username", username.to_owned()).await
  }

  async fn get_student_by_email(&self, email: &str) -> Result<Option<Student>> {
    self.student_where("email", email.to_owned()).await
  }

  async fn list_students(&self, status: Option<StudentStatus>) -> Result<Vec<Student>> {
    let status_str = status.map(encode_status);

    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STUDENT_COLUMNS} FROM students
           WHERE (?1 IS NULL OR status = ?1)
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status_str], RawStudent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }

  async fn set_student_status(
    &self,
    id:     Uuid,
    status: StudentStatus,
  ) -> Result<Option<Student>> {
    let id_str     = encode_uuid(id);
    let status_str = encode_status(status);

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE students SET status = ?2 WHERE id = ?1",
          rusqlite::params![id_str, status_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_student(conn, &id_str)?)
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn update_student_profile(
    &self,
    id:     Uuid,
    update: StudentProfileUpdate,
  ) -> Result<Option<Student>> {
    let id_str  = encode_uuid(id);
    let dob_str = update.dob.map(encode_date);

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE students SET
             name                  = COALESCE(?2, name),
             dob                   = COALESCE(?3, dob),
             contact_number        = COALESCE(?4, contact_number),
             avatar                = COALESCE(?5, avatar),
             year                  = COALESCE(?6, year),
             section               = COALESCE(?7, section),
             batch                 = COALESCE(?8, batch),
             father_name           = COALESCE(?9, father_name),
             mother_name           = COALESCE(?10, mother_name),
             father_contact_number = COALESCE(?11, father_contact_number)
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            update.name,
            dob_str,
            update.contact_number,
            update.avatar,
            update.year,
            update.section,
            update.batch,
            update.father_name,
            update.mother_name,
            update.father_contact_number,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_student(conn, &id_str)?)
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn list_class_students(&self, class: ClassRef) -> Result<Vec<Student>> {
    let (department, year, section) = class_params(&class);
    let active = encode_status(StudentStatus::Active);

    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STUDENT_COLUMNS} FROM students
           WHERE department = ?1 AND year = ?2 AND section = ?3 AND status = ?4
           ORDER BY username"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![department, year, section, active],
            RawStudent::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }

  // ── Admins and faculty ────────────────────────────────────────────────────

  async fn add_admin(&self, input: NewAdmin) -> Result<Admin> {
    let admin = Admin {
      id:               Uuid::new_v4(),
      username:         input.username,
      name:             input.name,
      email:            input.email,
      password_hash:    input.password_hash,
      password_updated: input.password_updated,
      created_at:       Utc::now(),
    };

    let id_str   = encode_uuid(admin.id);
    let at_str   = encode_dt(admin.created_at);
    let username = admin.username.clone();
    let name     = admin.name.clone();
    let email    = admin.email.clone();
    let hash     = admin.password_hash.clone();
    let updated  = admin.password_updated;

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          &format!("INSERT INTO admins ({ADMIN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          rusqlite::params![id_str, username, name, email, hash, updated, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateUsername(admin.username));
    }
    Ok(admin)
  }

  async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
    let username = username.to_owned();

    let raw: Option<RawAdmin> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE username = ?1"),
              rusqlite::params![username],
              RawAdmin::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAdmin::into_admin).transpose()
  }

  async fn add_faculty(&self, input: NewFaculty) -> Result<Faculty> {
    let faculty = Faculty {
      id:               Uuid::new_v4(),
      username:         input.username,
      name:             input.name,
      email:            input.email,
      department:       input.department,
      password_hash:    input.password_hash,
      password_updated: input.password_updated,
      created_at:       Utc::now(),
      contact_number:   None,
      dob:              None,
      designation:      None,
      avatar:           None,
    };

    let id_str     = encode_uuid(faculty.id);
    let at_str     = encode_dt(faculty.created_at);
    let username   = faculty.username.clone();
    let name       = faculty.name.clone();
    let email      = faculty.email.clone();
    let department = faculty.department.clone();
    let hash       = faculty.password_hash.clone();
    let updated    = faculty.password_updated;

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          &format!(
            "INSERT INTO faculty ({FACULTY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, NULL, NULL, NULL)"
          ),
          rusqlite::params![id_str, username, name, email, department, hash, updated, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateUsername(faculty.username));
    }
    Ok(faculty)
  }

  async fn get_faculty_by_username(&self, username: &str) -> Result<Option<Faculty>> {
    self.faculty_where("username", username.to_owned()).await
  }

  async fn get_faculty(&self, id: Uuid) -> Result<Option<Faculty>> {
    self.faculty_where("id", encode_uuid(id)).await
  }

  async fn update_faculty_profile(
    &self,
    id:     Uuid,
    update: FacultyProfileUpdate,
  ) -> Result<Option<Faculty>> {
    let id_str  = encode_uuid(id);
    let dob_str = update.dob.map(encode_date);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE faculty SET
             name           = COALESCE(?2, name),
             dob            = COALESCE(?3, dob),
             department     = COALESCE(?4, department),
             contact_number = COALESCE(?5, contact_number),
             designation    = COALESCE(?6, designation),
             avatar         = COALESCE(?7, avatar)
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            update.name,
            dob_str,
            update.department,
            update.contact_number,
            update.designation,
            update.avatar,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_faculty(id).await
  }

  // ── Subjects and tests ────────────────────────────────────────────────────

  async fn add_subject(&self, subject: Subject) -> Result<Subject> {
    let row = subject.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          &format!("INSERT INTO subjects ({SUBJECT_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
          rusqlite::params![row.subject_code, row.subject_name, row.department, row.year],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateSubject(subject.subject_code));
    }
    Ok(subject)
  }

  async fn get_subject(&self, code: &str) -> Result<Option<Subject>> {
    let code = code.to_owned();

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE subject_code = ?1"),
              rusqlite::params![code],
              RawSubject::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY subject_code"
        ))?;
        let rows = stmt
          .query_map([], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn add_test(&self, input: NewTest) -> Result<Test> {
    let test = Test {
      id:           Uuid::new_v4(),
      subject_code: input.subject_code,
      department:   input.class.department,
      year:         input.class.year,
      section:      input.class.section,
      test:         input.test,
      date:         input.date,
      total_marks:  input.total_marks,
      created_at:   Utc::now(),
    };

    let row      = test.clone();
    let id_str   = encode_uuid(test.id);
    let date_str = encode_date(test.date);
    let at_str   = encode_dt(test.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          &format!(
            "INSERT INTO tests ({TEST_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
          ),
          rusqlite::params![
            id_str,
            row.subject_code,
            row.department,
            row.year,
            row.section,
            row.test,
            date_str,
            row.total_marks,
            at_str,
          ],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateTest(test.test));
    }
    Ok(test)
  }

  async fn list_tests(&self, class: ClassRef) -> Result<Vec<Test>> {
    let (department, year, section) = class_params(&class);

    let raws: Vec<RawTest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TEST_COLUMNS} FROM tests
           WHERE department = ?1 AND year = ?2 AND section = ?3
           ORDER BY date, test"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![department, year, section], RawTest::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTest::into_test).collect()
  }

  async fn find_test(
    &self,
    class:        ClassRef,
    subject_code: &str,
    test:         &str,
  ) -> Result<Option<Test>> {
    let (department, year, section) = class_params(&class);
    let subject_code = subject_code.to_owned();
    let test = test.to_owned();

    let raw: Option<RawTest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {TEST_COLUMNS} FROM tests
                 WHERE department = ?1 AND year = ?2 AND section = ?3
                   AND subject_code = ?4 AND test = ?5"
              ),
              rusqlite::params![department, year, section, subject_code, test],
              RawTest::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTest::into_test).transpose()
  }

  // ── Marks and attendance ──────────────────────────────────────────────────

  async fn record_marks(&self, test_id: Uuid, marks: Vec<MarkEntry>) -> Result<usize> {
    let test_str = encode_uuid(test_id);

    let written: Option<usize> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let already = tx
          .query_row(
            "SELECT 1 FROM marks WHERE test_id = ?1 LIMIT 1",
            rusqlite::params![test_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if already {
          return Ok(None);
        }

        {
          let mut stmt = tx.prepare(
            "INSERT INTO marks (test_id, student_id, marks) VALUES (?1, ?2, ?3)",
          )?;
          for entry in &marks {
            stmt.execute(rusqlite::params![
              test_str,
              encode_uuid(entry.student_id),
              entry.value,
            ])?;
          }
        }

        tx.commit()?;
        Ok(Some(marks.len()))
      })
      .await?;

    let written = written.ok_or(Error::MarksAlreadyUploaded(test_id))?;
    tracing::debug!(%test_id, written, "marks recorded");
    Ok(written)
  }

  async fn results_for_student(
    &self,
    student_id: Uuid,
    class:      ClassRef,
  ) -> Result<Vec<TestResult>> {
    let id_str = encode_uuid(student_id);
    let (department, year, section) = class_params(&class);

    let rows: Vec<(String, String, String, i64, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT t.subject_code, s.subject_name, t.test, m.marks, t.total_marks
           FROM marks m
           JOIN tests t    ON t.id = m.test_id
           JOIN subjects s ON s.subject_code = t.subject_code
           WHERE m.student_id = ?1
             AND t.department = ?2 AND t.year = ?3 AND t.section = ?4
           ORDER BY t.date, t.subject_code, t.test",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![id_str, department, year, section],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(subject_code, subject_name, test, marks, total)| {
        Ok(TestResult {
          subject_code,
          subject_name,
          test,
          marks: decode_count(marks)?,
          total_marks: decode_count(total)?,
        })
      })
      .collect()
  }

  async fn mark_attendance(&self, sheet: AttendanceSheet) -> Result<usize> {
    let (department, year, section) = class_params(&sheet.class);
    let active  = encode_status(StudentStatus::Active);
    let code    = sheet.subject_code;
    let present: HashSet<String> = sheet.present.into_iter().map(encode_uuid).collect();

    let counted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let ids = {
          let mut stmt = tx.prepare(
            "SELECT id FROM students
             WHERE department = ?1 AND year = ?2 AND section = ?3 AND status = ?4",
          )?;
          let ids = stmt
            .query_map(rusqlite::params![department, year, section, active], |r| {
              r.get::<_, String>(0)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          ids
        };

        {
          let mut stmt = tx.prepare(
            "INSERT INTO attendance (student_id, subject_code, attended, total)
             VALUES (?1, ?2, ?3, 1)
             ON CONFLICT (student_id, subject_code) DO UPDATE SET
               attended = attended + excluded.attended,
               total    = total + 1",
          )?;
          for id in &ids {
            stmt.execute(rusqlite::params![id, code, i64::from(present.contains(id))])?;
          }
        }

        tx.commit()?;
        Ok(ids.len())
      })
      .await?;

    Ok(counted)
  }

  async fn attendance_for_student(&self, student_id: Uuid) -> Result<Vec<AttendanceSummary>> {
    let id_str = encode_uuid(student_id);

    let rows: Vec<(String, String, i64, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT a.subject_code, s.subject_name, a.attended, a.total
           FROM attendance a
           JOIN subjects s ON s.subject_code = a.subject_code
           WHERE a.student_id = ?1
           ORDER BY a.subject_code",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(code, name, attended, total)| {
        Ok(AttendanceSummary::new(
          code,
          name,
          decode_count(attended)?,
          decode_count(total)?,
        ))
      })
      .collect()
  }

  // ── Notices ───────────────────────────────────────────────────────────────

  async fn add_notice(&self, input: NewNotice) -> Result<Notice> {
    let notice = Notice {
      id:         Uuid::new_v4(),
      topic:      input.topic,
      date:       input.date,
      content:    input.content,
      from:       input.from,
      notice_for: input.notice_for,
      created_at: Utc::now(),
    };

    let row      = notice.clone();
    let id_str   = encode_uuid(notice.id);
    let date_str = encode_date(notice.date);
    let at_str   = encode_dt(notice.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO notices ({NOTICE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
          ),
          rusqlite::params![
            id_str,
            row.topic,
            date_str,
            row.content,
            row.from,
            row.notice_for.to_string(),
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(notice)
  }

  async fn list_notices(&self) -> Result<Vec<Notice>> {
    let raws: Vec<RawNotice> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTICE_COLUMNS} FROM notices ORDER BY date DESC, created_at DESC"
        ))?;
        let rows = stmt
          .query_map([], RawNotice::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotice::into_notice).collect()
  }
}

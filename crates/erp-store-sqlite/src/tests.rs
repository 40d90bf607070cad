//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use erp_core::{
  academic::{AttendanceSheet, ClassRef, MarkEntry, NewTest, Subject},
  account::{NewAdmin, NewFaculty},
  department::Department,
  notice::{Audience, NewNotice},
  profile::{FacultyProfileUpdate, StudentProfileUpdate},
  store::CampusStore,
  student::{NewStudent, Student, StudentStatus},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  s.add_department(dept("Computer Science", "CS")).await.unwrap();
  s.add_department(dept("Civil", "CE")).await.unwrap();
  s
}

fn dept(name: &str, code: &str) -> Department {
  Department {
    department:      name.into(),
    department_code: code.into(),
  }
}

fn new_student(email: &str, department: &str) -> NewStudent {
  NewStudent {
    email:            email.into(),
    password_hash:    "$argon2id$v=19$m=16,t=1,p=1$c2FsdHNhbHQ$aGFzaA".into(),
    name:             "Grace Hopper".into(),
    contact_number:   "5550199".into(),
    dob:              NaiveDate::from_ymd_opt(2005, 1, 9).unwrap(),
    department:       department.into(),
    year:             2,
    section:          "B".into(),
    avatar:           "https://example.com/a.png".into(),
    password_updated: true,
    issued_in:        2024,
  }
}

// ─── Departments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn departments_list_sorted_by_name() {
  let s = store().await;
  let all = s.list_departments().await.unwrap();
  let names: Vec<_> = all.iter().map(|d| d.department.as_str()).collect();
  assert_eq!(names, ["Civil", "Computer Science"]);
}

#[tokio::test]
async fn get_department_by_exact_name() {
  let s = store().await;
  let cs = s.get_department("Computer Science").await.unwrap().unwrap();
  assert_eq!(cs.department_code, "CS");
  assert!(s.get_department("computer science").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_department_name_or_code_is_rejected() {
  let s = store().await;
  let err = s.add_department(dept("Computer Science", "XX")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateDepartment(_)));
  let err = s.add_department(dept("Computing", "CS")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateDepartment(_)));
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn registered_student_is_pending_with_generated_username() {
  let s = store().await;
  let st = s
    .register_student(new_student("a@b.com", "Computer Science"))
    .await
    .unwrap();
  assert_eq!(st.status, StudentStatus::Pending);
  assert_eq!(st.username, "STU2024CS000");

  let fetched = s.get_student(st.id).await.unwrap().unwrap();
  assert_eq!(fetched.username, st.username);
  assert_eq!(fetched.dob, st.dob);
  assert_eq!(fetched.created_at, st.created_at);
  assert!(fetched.password_updated);
}

#[tokio::test]
async fn sequence_counts_up_per_department() {
  let s = store().await;
  for i in 0..3 {
    s.register_student(new_student(&format!("cs{i}@b.com"), "Computer Science"))
      .await
      .unwrap();
  }
  let civil = s
    .register_student(new_student("ce@b.com", "Civil"))
    .await
    .unwrap();
  assert_eq!(civil.username, "STU2024CE000");

  let fourth = s
    .register_student(new_student("cs3@b.com", "Computer Science"))
    .await
    .unwrap();
  assert_eq!(fourth.username, "STU2024CS003");
}

#[tokio::test]
async fn new_year_counter_starts_from_department_headcount() {
  let s = store().await;
  s.register_student(new_student("x@b.com", "Computer Science"))
    .await
    .unwrap();

  let mut next_year = new_student("y@b.com", "Computer Science");
  next_year.issued_in = 2025;
  let st = s.register_student(next_year).await.unwrap();
  assert_eq!(st.username, "STU2025CS001");
}

#[tokio::test]
async fn duplicate_email_is_rejected_and_original_untouched() {
  let s = store().await;
  let first = s
    .register_student(new_student("dup@b.com", "Computer Science"))
    .await
    .unwrap();

  let mut again = new_student("dup@b.com", "Civil");
  again.name = "Someone Else".into();
  let err = s.register_student(again).await.unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));

  let kept = s.get_student_by_email("dup@b.com").await.unwrap().unwrap();
  assert_eq!(kept.id, first.id);
  assert_eq!(kept.name, "Grace Hopper");
  assert_eq!(s.list_students(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_department_writes_nothing() {
  let s = store().await;
  let err = s
    .register_student(new_student("a@b.com", "Astrology"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DepartmentNotFound(_)));
  assert!(s.list_students(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_registration_does_not_consume_a_sequence() {
  let s = store().await;
  s.register_student(new_student("one@b.com", "Computer Science"))
    .await
    .unwrap();
  s.register_student(new_student("one@b.com", "Computer Science"))
    .await
    .unwrap_err();
  let two = s
    .register_student(new_student("two@b.com", "Computer Science"))
    .await
    .unwrap();
  assert_eq!(two.username, "STU2024CS001");
}

#[tokio::test]
async fn held_usernames_are_skipped_not_fatal() {
  let s = store().await;
  // The store does not police codes, so a digit-bearing one can reach it.
  s.add_department(dept("CS Lab", "CS1")).await.unwrap();
  for i in 0..=1000 {
    s.register_student(new_student(&format!("cs{i}@b.com"), "Computer Science"))
      .await
      .unwrap();
  }

  // Sequence 0 in CS1 would be STU2024CS1000, already issued to CS.
  let lab = s
    .register_student(new_student("lab0@b.com", "CS Lab"))
    .await
    .unwrap();
  assert_eq!(lab.username, "STU2024CS1001");
  let lab = s
    .register_student(new_student("lab1@b.com", "CS Lab"))
    .await
    .unwrap();
  assert_eq!(lab.username, "STU2024CS1002");

  // CS moves past the names CS1 took.
  let cs = s
    .register_student(new_student("cs-next@b.com", "Computer Science"))
    .await
    .unwrap();
  assert_eq!(cs.username, "STU2024CS1003");
}

#[tokio::test]
async fn concurrent_registrations_get_distinct_usernames() {
  let s = store().await;
  let mut handles = Vec::new();
  for i in 0..8 {
    let s = s.clone();
    handles.push(tokio::spawn(async move {
      s.register_student(new_student(&format!("c{i}@b.com"), "Computer Science"))
        .await
        .unwrap()
        .username
    }));
  }
  let mut names = Vec::new();
  for h in handles {
    names.push(h.await.unwrap());
  }
  names.sort();
  names.dedup();
  assert_eq!(names.len(), 8);
}

#[tokio::test]
async fn lookups_by_username_and_email() {
  let s = store().await;
  let st = s
    .register_student(new_student("look@b.com", "Civil"))
    .await
    .unwrap();
  let by_name = s.get_student_by_username(&st.username).await.unwrap().unwrap();
  assert_eq!(by_name.id, st.id);
  assert!(s.get_student_by_username("STU0000XX000").await.unwrap().is_none());
  assert!(s.get_student_by_email("nobody@b.com").await.unwrap().is_none());
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pending_list_is_oldest_first_and_filtered() {
  let s = store().await;
  let a = s.register_student(new_student("a@b.com", "Civil")).await.unwrap();
  let b = s.register_student(new_student("b@b.com", "Civil")).await.unwrap();
  let c = s.register_student(new_student("c@b.com", "Civil")).await.unwrap();

  s.set_student_status(b.id, StudentStatus::Active).await.unwrap();

  let pending = s.list_students(Some(StudentStatus::Pending)).await.unwrap();
  let ids: Vec<Uuid> = pending.iter().map(|p| p.id).collect();
  assert_eq!(ids, [a.id, c.id]);

  let active = s.list_students(Some(StudentStatus::Active)).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].id, b.id);
}

#[tokio::test]
async fn set_status_returns_updated_record() {
  let s = store().await;
  let st = s.register_student(new_student("s@b.com", "Civil")).await.unwrap();

  let updated = s
    .set_student_status(st.id, StudentStatus::Inactive)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, StudentStatus::Inactive);

  let reread = s.get_student(st.id).await.unwrap().unwrap();
  assert_eq!(reread.status, StudentStatus::Inactive);
}

#[tokio::test]
async fn set_status_on_missing_student_is_none() {
  let s = store().await;
  let r = s
    .set_student_status(Uuid::new_v4(), StudentStatus::Active)
    .await
    .unwrap();
  assert!(r.is_none());
}

// ─── Admins and faculty ──────────────────────────────────────────────────────

#[tokio::test]
async fn admin_roundtrip_and_duplicate_username() {
  let s = store().await;
  let input = NewAdmin {
    username:         "ADM001".into(),
    name:             "Root".into(),
    email:            "root@college.edu".into(),
    password_hash:    "hash".into(),
    password_updated: false,
  };
  let admin = s.add_admin(input.clone()).await.unwrap();
  let fetched = s.get_admin_by_username("ADM001").await.unwrap().unwrap();
  assert_eq!(fetched.id, admin.id);
  assert!(!fetched.password_updated);

  let err = s.add_admin(input).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateUsername(_)));
}

#[tokio::test]
async fn faculty_roundtrip() {
  let s = store().await;
  let f = s
    .add_faculty(NewFaculty {
      username:         "FAC2024CS001".into(),
      name:             "Alan Turing".into(),
      email:            "alan@college.edu".into(),
      department:       "Computer Science".into(),
      password_hash:    "hash".into(),
      password_updated: false,
    })
    .await
    .unwrap();
  let fetched = s.get_faculty_by_username("FAC2024CS001").await.unwrap().unwrap();
  assert_eq!(fetched.id, f.id);
  assert_eq!(fetched.department, "Computer Science");
  assert!(s.get_faculty_by_username("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn faculty_profile_update_keeps_unset_fields() {
  let s = store().await;
  let f = s
    .add_faculty(NewFaculty {
      username:         "FAC001".into(),
      name:             "Alan Turing".into(),
      email:            "alan@college.edu".into(),
      department:       "Computer Science".into(),
      password_hash:    "hash".into(),
      password_updated: false,
    })
    .await
    .unwrap();
  assert!(f.designation.is_none());

  let updated = s
    .update_faculty_profile(f.id, FacultyProfileUpdate {
      designation: Some("Professor".into()),
      dob: NaiveDate::from_ymd_opt(1912, 6, 23),
      department: Some("Civil".into()),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.name, "Alan Turing");
  assert_eq!(updated.department, "Civil");
  assert_eq!(updated.designation.as_deref(), Some("Professor"));
  assert_eq!(updated.dob, NaiveDate::from_ymd_opt(1912, 6, 23));
  assert_eq!(s.get_faculty(f.id).await.unwrap().unwrap().department, "Civil");

  let missing = s
    .update_faculty_profile(Uuid::new_v4(), FacultyProfileUpdate::default())
    .await
    .unwrap();
  assert!(missing.is_none());
}

// ─── Profiles and classes ────────────────────────────────────────────────────

async fn active_student(s: &SqliteStore, email: &str) -> Student {
  let st = s
    .register_student(new_student(email, "Computer Science"))
    .await
    .unwrap();
  s.set_student_status(st.id, StudentStatus::Active)
    .await
    .unwrap()
    .unwrap()
}

fn class_2b() -> ClassRef {
  ClassRef {
    department: "Computer Science".into(),
    year:       2,
    section:    "B".into(),
  }
}

#[tokio::test]
async fn student_profile_update_touches_only_given_fields() {
  let s = store().await;
  let st = active_student(&s, "p@b.com").await;

  let updated = s
    .update_student_profile(st.id, StudentProfileUpdate {
      section: Some("C".into()),
      father_name: Some("Walter".into()),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.section, "C");
  assert_eq!(updated.father_name.as_deref(), Some("Walter"));
  assert_eq!(updated.name, st.name);
  assert_eq!(updated.dob, st.dob);
  assert_eq!(updated.username, st.username);
  assert_eq!(updated.status, StudentStatus::Active);
  assert!(updated.batch.is_none());
}

#[tokio::test]
async fn class_roster_lists_active_students_only() {
  let s = store().await;
  let a = active_student(&s, "a@b.com").await;
  let b = active_student(&s, "b@b.com").await;
  s.register_student(new_student("pending@b.com", "Computer Science"))
    .await
    .unwrap();
  s.set_student_status(b.id, StudentStatus::Inactive).await.unwrap();

  let roster = s.list_class_students(class_2b()).await.unwrap();
  let ids: Vec<_> = roster.iter().map(|st| st.id).collect();
  assert_eq!(ids, [a.id]);

  let mut other = class_2b();
  other.section = "A".into();
  assert!(s.list_class_students(other).await.unwrap().is_empty());
}

// ─── Subjects, tests and marks ───────────────────────────────────────────────

fn algorithms() -> Subject {
  Subject {
    subject_code: "CS201".into(),
    subject_name: "Algorithms".into(),
    department:   "Computer Science".into(),
    year:         2,
  }
}

fn mid_term() -> NewTest {
  NewTest {
    subject_code: "CS201".into(),
    class:        class_2b(),
    test:         "Mid Term".into(),
    date:         NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
    total_marks:  50,
  }
}

#[tokio::test]
async fn subjects_are_unique_by_code() {
  let s = store().await;
  s.add_subject(algorithms()).await.unwrap();
  let err = s.add_subject(algorithms()).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateSubject(_)));
  assert_eq!(s.get_subject("CS201").await.unwrap().unwrap().year, 2);
  assert_eq!(s.list_subjects().await.unwrap().len(), 1);
  assert!(s.get_subject("CS999").await.unwrap().is_none());
}

#[tokio::test]
async fn tests_are_unique_per_class_subject_and_name() {
  let s = store().await;
  s.add_subject(algorithms()).await.unwrap();
  let t = s.add_test(mid_term()).await.unwrap();
  let err = s.add_test(mid_term()).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateTest(_)));

  let mut other_section = mid_term();
  other_section.class.section = "A".into();
  s.add_test(other_section).await.unwrap();

  let listed = s.list_tests(class_2b()).await.unwrap();
  assert_eq!(listed, [t.clone()]);
  let found = s
    .find_test(class_2b(), "CS201", "Mid Term")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.id, t.id);
  assert!(s.find_test(class_2b(), "CS201", "Final").await.unwrap().is_none());
}

#[tokio::test]
async fn marks_are_uploaded_once_per_test() {
  let s = store().await;
  s.add_subject(algorithms()).await.unwrap();
  let t = s.add_test(mid_term()).await.unwrap();
  let a = active_student(&s, "a@b.com").await;
  let b = active_student(&s, "b@b.com").await;

  let sheet = vec![
    MarkEntry { student_id: a.id, value: 41 },
    MarkEntry { student_id: b.id, value: 17 },
  ];
  assert_eq!(s.record_marks(t.id, sheet.clone()).await.unwrap(), 2);
  let err = s.record_marks(t.id, sheet).await.unwrap_err();
  assert!(matches!(err, Error::MarksAlreadyUploaded(id) if id == t.id));

  let results = s.results_for_student(a.id, class_2b()).await.unwrap();
  assert_eq!(results.len(), 1);
  assert_eq!(results[0].subject_name, "Algorithms");
  assert_eq!(results[0].marks, 41);
  assert_eq!(results[0].total_marks, 50);

  let mut elsewhere = class_2b();
  elsewhere.year = 3;
  assert!(s.results_for_student(a.id, elsewhere).await.unwrap().is_empty());
}

#[tokio::test]
async fn attendance_accumulates_per_subject() {
  let s = store().await;
  s.add_subject(algorithms()).await.unwrap();
  let a = active_student(&s, "a@b.com").await;
  let b = active_student(&s, "b@b.com").await;

  let roll = |present: Vec<Uuid>| AttendanceSheet {
    subject_code: "CS201".into(),
    class: class_2b(),
    present,
  };
  assert_eq!(s.mark_attendance(roll(vec![a.id, b.id])).await.unwrap(), 2);
  s.mark_attendance(roll(vec![a.id])).await.unwrap();
  s.mark_attendance(roll(Vec::new())).await.unwrap();

  let a_summary = s.attendance_for_student(a.id).await.unwrap();
  assert_eq!(a_summary.len(), 1);
  assert_eq!((a_summary[0].attended, a_summary[0].total), (2, 3));
  assert_eq!(a_summary[0].percentage, "66.67");

  let b_summary = s.attendance_for_student(b.id).await.unwrap();
  assert_eq!((b_summary[0].attended, b_summary[0].total), (1, 3));
  assert_eq!(b_summary[0].subject_name, "Algorithms");
}

#[test]
fn store_errors_keep_their_kind() {
  use erp_core::ErrorKind;

  let core: erp_core::Error = Error::EmailTaken("a@b.com".into()).into();
  assert_eq!(core.kind(), ErrorKind::Conflict);
  assert!(core.fields().unwrap().contains_key("email"));

  let core: erp_core::Error = Error::DepartmentNotFound("X".into()).into();
  assert_eq!(core.kind(), ErrorKind::NotFound);

  let core: erp_core::Error = Error::Decode("bad".into()).into();
  assert_eq!(core.kind(), ErrorKind::Server);

  let core: erp_core::Error = Error::DuplicateTest("Mid Term".into()).into();
  assert_eq!(core.kind(), ErrorKind::Conflict);
  assert_eq!(core.to_string(), "Given Test is already created");

  let core: erp_core::Error = Error::MarksAlreadyUploaded(Uuid::nil()).into();
  assert!(core.fields().unwrap().contains_key("marks"));
}

// ─── Notices ─────────────────────────────────────────────────────────────────

fn notice(topic: &str, date: (i32, u32, u32), notice_for: Audience) -> NewNotice {
  NewNotice {
    topic: topic.into(),
    date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
    content: "See the board outside the library.".into(),
    from: "Registrar".into(),
    notice_for,
  }
}

#[tokio::test]
async fn notices_list_newest_first() {
  let s = store().await;
  s.add_notice(notice("Fees due", (2024, 9, 1), Audience::Student))
    .await
    .unwrap();
  let holiday = s
    .add_notice(notice("Holiday", (2024, 10, 2), Audience::All))
    .await
    .unwrap();

  let listed = s.list_notices().await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0], holiday);
  assert_eq!(listed[1].topic, "Fees due");
  assert_eq!(listed[1].notice_for, Audience::Student);
  assert_eq!(listed[1].from, "Registrar");
}

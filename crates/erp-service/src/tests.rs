//! Service tests against an in-memory SQLite store.

use std::sync::Arc;

use argon2::Params;
use chrono::{Datelike as _, Utc};
use erp_core::{
  ErrorKind,
  academic::{AttendanceForm, ClassForm, MarkEntry, MarksForm, SubjectForm, TestForm},
  account::{FacultyForm, NewAdmin, Role},
  department::DepartmentForm,
  notice::{Audience, NoticeForm},
  profile::{FacultyProfileForm, StudentProfileForm},
  registration::RegistrationForm,
  store::CampusStore,
  student::{ApprovalDecision, Student, StudentStatus},
};
use erp_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{Campus, Claims, Passwords, Policy, TokenKeys, TokenTtl};

fn cheap() -> Passwords {
  Passwords::with_params(Params::new(1024, 1, 1, None).unwrap())
}

async fn campus() -> Campus<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let campus = Campus::new(
    Arc::new(store),
    TokenKeys::new("service-test-secret", TokenTtl::default()),
    Policy::default(),
  )
  .with_passwords(cheap());
  campus.seed_departments().await.unwrap();
  campus
}

fn form(email: &str) -> RegistrationForm {
  RegistrationForm {
    name:           Some("Ada Lovelace".into()),
    email:          Some(email.into()),
    password:       Some("analytical".into()),
    contact_number: Some("5550100".into()),
    dob:            Some("2004-12-10".into()),
    department:     Some("Computer Science".into()),
    year:           Some(1),
    section:        Some("A".into()),
    avatar:         None,
  }
}

fn this_year() -> i32 { Utc::now().year() }

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn registration_creates_pending_student() {
  let c = campus().await;
  let s = c.register_student(form("ada@college.edu")).await.unwrap();
  assert_eq!(s.status, StudentStatus::Pending);
  assert_eq!(s.username, format!("STU{}CS000", this_year()));
  assert!(s.password_updated);
  assert!(s.password_hash.starts_with("$argon2id$"));
  assert!(s.avatar.contains("ui-avatars.com"));
}

#[tokio::test]
async fn usernames_follow_department_headcount() {
  let c = campus().await;
  for i in 0..3 {
    c.register_student(form(&format!("s{i}@college.edu")))
      .await
      .unwrap();
  }
  let fourth = c.register_student(form("s3@college.edu")).await.unwrap();
  assert_eq!(fourth.username, format!("STU{}CS003", this_year()));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let c = campus().await;
  c.register_student(form("dup@college.edu")).await.unwrap();
  let err = c
    .register_student(form("dup@college.edu"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert!(err.fields().unwrap().contains_key("email"));
  assert_eq!(c.store.list_students(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_department_is_not_found() {
  let c = campus().await;
  let mut f = form("x@college.edu");
  f.department = Some("Astrology".into());
  let err = c.register_student(f).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert!(c.store.list_students(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_form_never_reaches_the_store() {
  let c = campus().await;
  let mut f = form("not-an-email");
  f.section = None;
  let err = c.register_student(f).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(c.store.list_students(None).await.unwrap().is_empty());
}

// ─── Approval ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn approval_moves_student_out_of_pending_queue() {
  let c = campus().await;
  let a = c.register_student(form("a@college.edu")).await.unwrap();
  let b = c.register_student(form("b@college.edu")).await.unwrap();

  let pending = c.pending_students().await.unwrap();
  assert_eq!(
    pending.iter().map(|s| s.id).collect::<Vec<_>>(),
    [a.id, b.id]
  );

  let updated = c
    .update_registration(a.id, ApprovalDecision::Active, Some("welcome".into()))
    .await
    .unwrap();
  assert_eq!(updated.status, StudentStatus::Active);

  let pending = c.pending_students().await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].id, b.id);
}

#[tokio::test]
async fn approval_is_repeatable_and_reversible() {
  let c = campus().await;
  let s = c.register_student(form("a@college.edu")).await.unwrap();
  for decision in [
    ApprovalDecision::Active,
    ApprovalDecision::Active,
    ApprovalDecision::Inactive,
    ApprovalDecision::Active,
  ] {
    let updated = c.update_registration(s.id, decision, None).await.unwrap();
    assert_eq!(updated.status, StudentStatus::from(decision));
  }
}

#[tokio::test]
async fn approval_of_unknown_student_is_not_found() {
  let c = campus().await;
  let err = c
    .update_registration(Uuid::new_v4(), ApprovalDecision::Active, None)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn student_login_is_gated_on_status() {
  let c = campus().await;
  let s = c.register_student(form("a@college.edu")).await.unwrap();

  let err = c
    .login_student(&s.username, "analytical".into())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  assert!(err.to_string().contains("pending approval"));

  // The status gate wins over a wrong password.
  let err = c
    .login_student(&s.username, "wrong".into())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  c.update_registration(s.id, ApprovalDecision::Active, None)
    .await
    .unwrap();
  let session = c
    .login_student(&s.username, "analytical".into())
    .await
    .unwrap();
  assert_eq!(session.result.role, Role::Student);
  let claims = c.tokens.verify(&session.token).unwrap();
  assert_eq!(claims.role, Role::Student);
  assert_eq!(claims.id, s.id);
  assert_eq!(claims.sub, "a@college.edu");

  c.update_registration(s.id, ApprovalDecision::Inactive, None)
    .await
    .unwrap();
  let err = c
    .login_student(&s.username, "analytical".into())
    .await
    .unwrap_err();
  assert!(err.to_string().contains("deactivated"));
}

#[tokio::test]
async fn wrong_password_and_unknown_user() {
  let c = campus().await;
  let s = c.register_student(form("a@college.edu")).await.unwrap();
  c.update_registration(s.id, ApprovalDecision::Active, None)
    .await
    .unwrap();

  let err = c.login_student(&s.username, "nope".into()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Authentication);
  assert_eq!(err.to_string(), "Invalid credentials");

  let err = c.login_student("STU0000XX000", "x".into()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert_eq!(err.to_string(), "Student doesn't exist.");
}

#[tokio::test]
async fn pools_are_independent() {
  let c = campus().await;
  let hash = c.passwords.hash("root".into()).await.unwrap();
  c.ensure_admin(NewAdmin {
    username:         "ADMIN".into(),
    name:             "Registrar".into(),
    email:            "registrar@college.edu".into(),
    password_hash:    hash,
    password_updated: true,
  })
  .await
  .unwrap();

  let session = c.login_admin("ADMIN", "root".into()).await.unwrap();
  let claims = c.tokens.verify(&session.token).unwrap();
  assert_eq!(claims.role, Role::Admin);
  assert_eq!(claims.sub, "ADMIN");
  assert_eq!(claims.exp - claims.iat, 3600);

  let err = c.login_faculty("ADMIN", "root".into()).await.unwrap_err();
  assert_eq!(err.to_string(), "Faculty doesn't exist.");
}

#[tokio::test]
async fn authorize_checks_role() {
  let c = campus().await;
  let token = c
    .tokens
    .issue("a@college.edu", Uuid::new_v4(), Role::Student)
    .unwrap();
  assert!(c.authorize(&token, &[Role::Student]).is_ok());
  let err = c.authorize(&token, &[Role::Admin]).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  let err = c.authorize("junk", &[Role::Admin]).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Authentication);
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn seeding_is_idempotent() {
  let c = campus().await;
  assert_eq!(c.seed_departments().await.unwrap(), 0);
  assert_eq!(c.list_departments().await.unwrap().len(), 6);
}

#[tokio::test]
async fn added_department_accepts_registrations() {
  let c = campus().await;
  let d = c
    .add_department(DepartmentForm {
      department:      Some("Physics".into()),
      department_code: Some("ph".into()),
    })
    .await
    .unwrap();
  assert_eq!(d.department_code, "PH");

  let mut f = form("p@college.edu");
  f.department = Some("Physics".into());
  let s = c.register_student(f).await.unwrap();
  assert!(s.username.ends_with("PH000"));

  let err = c
    .add_department(DepartmentForm {
      department:      Some("Physics".into()),
      department_code: Some("PX".into()),
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn provisioned_faculty_can_log_in() {
  let c = campus().await;
  let f = c
    .provision_faculty(FacultyForm {
      username:   Some("FAC001".into()),
      name:       Some("Alan Turing".into()),
      email:      Some("alan@college.edu".into()),
      department: Some("Computer Science".into()),
      password:   Some("enigma".into()),
    })
    .await
    .unwrap();
  assert!(!f.password_updated);

  let session = c.login_faculty("FAC001", "enigma".into()).await.unwrap();
  assert_eq!(session.result.record.email, "alan@college.edu");
  assert_eq!(c.tokens.verify(&session.token).unwrap().role, Role::Faculty);
}

#[tokio::test]
async fn ensure_admin_skips_existing() {
  let c = campus().await;
  let admin = NewAdmin {
    username:         "ADMIN".into(),
    name:             "Registrar".into(),
    email:            "registrar@college.edu".into(),
    password_hash:    c.passwords.hash("root".into()).await.unwrap(),
    password_updated: true,
  };
  assert!(c.ensure_admin(admin.clone()).await.unwrap());
  assert!(!c.ensure_admin(admin).await.unwrap());
}

// ─── Profiles ────────────────────────────────────────────────────────────────

async fn approved(c: &Campus<SqliteStore>, email: &str) -> (Student, Claims) {
  let s = c.register_student(form(email)).await.unwrap();
  c.update_registration(s.id, ApprovalDecision::Active, None)
    .await
    .unwrap();
  let session = c.login_student(&s.username, "analytical".into()).await.unwrap();
  let claims = c.tokens.verify(&session.token).unwrap();
  (s, claims)
}

fn claims_for(c: &Campus<SqliteStore>, id: Uuid, role: Role) -> Claims {
  let token = c.tokens.issue("someone", id, role).unwrap();
  c.tokens.verify(&token).unwrap()
}

#[tokio::test]
async fn student_profile_follows_the_token() {
  let c = campus().await;
  let (s, claims) = approved(&c, "a@college.edu").await;

  let updated = c
    .update_student_profile(&claims, StudentProfileForm {
      contact_number: Some("5550111".into()),
      mother_name: Some("Anne".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.id, s.id);
  assert_eq!(updated.contact_number, "5550111");
  assert_eq!(updated.mother_name.as_deref(), Some("Anne"));
  assert_eq!(updated.email, s.email);

  c.update_registration(s.id, ApprovalDecision::Inactive, None)
    .await
    .unwrap();
  let err = c
    .update_student_profile(&claims, StudentProfileForm::default())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
  assert!(err.to_string().contains("deactivated"));

  let faculty_claims = claims_for(&c, s.id, Role::Faculty);
  let err = c.current_student(&faculty_claims).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn faculty_profile_checks_department() {
  let c = campus().await;
  let f = c
    .provision_faculty(FacultyForm {
      username:   Some("FAC001".into()),
      name:       Some("Alan Turing".into()),
      email:      Some("alan@college.edu".into()),
      department: Some("Computer Science".into()),
      password:   Some("enigma".into()),
    })
    .await
    .unwrap();
  let claims = claims_for(&c, f.id, Role::Faculty);

  let err = c
    .update_faculty_profile(&claims, FacultyProfileForm {
      department: Some("Astrology".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let updated = c
    .update_faculty_profile(&claims, FacultyProfileForm {
      department: Some("Civil".into()),
      designation: Some("Reader".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.department, "Civil");
  assert_eq!(updated.designation.as_deref(), Some("Reader"));

  let ghost = claims_for(&c, Uuid::new_v4(), Role::Faculty);
  let err = c.current_faculty(&ghost).await.unwrap_err();
  assert_eq!(err.to_string(), "Faculty doesn't exist.");
}

// ─── Academic records ────────────────────────────────────────────────────────

fn class_1a() -> ClassForm {
  ClassForm {
    department: Some("Computer Science".into()),
    year:       Some(1),
    section:    Some("A".into()),
  }
}

fn subject() -> SubjectForm {
  SubjectForm {
    subject_code: Some("cs101".into()),
    subject_name: Some("Programming".into()),
    department:   Some("Computer Science".into()),
    year:         Some(1),
  }
}

fn mid_term() -> TestForm {
  TestForm {
    subject_code: Some("CS101".into()),
    department:   Some("Computer Science".into()),
    year:         Some(1),
    section:      Some("A".into()),
    test:         Some("Mid Term".into()),
    date:         Some("2024-10-01".into()),
    total_marks:  Some(50),
  }
}

fn marks(entries: Vec<MarkEntry>) -> MarksForm {
  MarksForm {
    subject_code: Some("CS101".into()),
    department:   Some("Computer Science".into()),
    year:         Some(1),
    section:      Some("A".into()),
    test:         Some("Mid Term".into()),
    marks:        Some(entries),
  }
}

#[tokio::test]
async fn subjects_need_a_known_department() {
  let c = campus().await;
  let mut bad = subject();
  bad.department = Some("Astrology".into());
  assert_eq!(c.add_subject(bad).await.unwrap_err().kind(), ErrorKind::NotFound);

  assert_eq!(c.add_subject(subject()).await.unwrap().subject_code, "CS101");
  let err = c.add_subject(subject()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert_eq!(c.list_subjects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn tests_are_created_once_per_class() {
  let c = campus().await;
  let err = c.create_test(mid_term()).await.unwrap_err();
  assert_eq!(err.to_string(), "Subject not found");

  c.add_subject(subject()).await.unwrap();
  let t = c.create_test(mid_term()).await.unwrap();
  assert_eq!(t.total_marks, 50);
  let err = c.create_test(mid_term()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert_eq!(err.to_string(), "Given Test is already created");

  let listed = c.class_tests(class_1a()).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].id, t.id);
}

#[tokio::test]
async fn class_roster_is_not_found_until_someone_is_approved() {
  let c = campus().await;
  c.register_student(form("pending@college.edu")).await.unwrap();
  let err = c.class_students(class_1a()).await.unwrap_err();
  assert_eq!(err.to_string(), "No Student Found");

  let (s, _) = approved(&c, "a@college.edu").await;
  let roster = c.class_students(class_1a()).await.unwrap();
  assert_eq!(roster.len(), 1);
  assert_eq!(roster[0].id, s.id);
}

#[tokio::test]
async fn marks_are_checked_then_stored_once() {
  let c = campus().await;
  c.add_subject(subject()).await.unwrap();
  let err = c
    .upload_marks(marks(vec![MarkEntry { student_id: Uuid::new_v4(), value: 1 }]))
    .await
    .unwrap_err();
  assert_eq!(err.to_string(), "Test not found");

  c.create_test(mid_term()).await.unwrap();
  let (s, claims) = approved(&c, "a@college.edu").await;

  let outsider = MarkEntry { student_id: Uuid::new_v4(), value: 10 };
  let err = c.upload_marks(marks(vec![outsider])).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(err.to_string().contains("not in this class"));

  let too_many = MarkEntry { student_id: s.id, value: 51 };
  let err = c.upload_marks(marks(vec![too_many])).await.unwrap_err();
  assert!(err.to_string().contains("exceed"));

  let good = MarkEntry { student_id: s.id, value: 42 };
  assert_eq!(c.upload_marks(marks(vec![good])).await.unwrap(), 1);
  let err = c.upload_marks(marks(vec![good])).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert_eq!(err.to_string(), "You have already uploaded marks of given exam");

  let results = c.test_results(&claims).await.unwrap();
  assert_eq!(results.len(), 1);
  assert_eq!(results[0].marks, 42);
  assert_eq!(results[0].subject_name, "Programming");
}

#[tokio::test]
async fn results_without_tests_are_not_found() {
  let c = campus().await;
  let (_, claims) = approved(&c, "a@college.edu").await;
  let err = c.test_results(&claims).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert_eq!(err.to_string(), "No Test Found");
}

#[tokio::test]
async fn attendance_counts_every_lecture() {
  let c = campus().await;
  c.add_subject(subject()).await.unwrap();
  let (a, a_claims) = approved(&c, "a@college.edu").await;
  let (_, b_claims) = approved(&c, "b@college.edu").await;

  let roll = |present: Vec<Uuid>| AttendanceForm {
    subject_code:      Some("CS101".into()),
    department:        Some("Computer Science".into()),
    year:              Some(1),
    section:           Some("A".into()),
    selected_students: Some(present),
  };
  assert_eq!(c.mark_attendance(roll(vec![a.id])).await.unwrap(), 2);
  assert_eq!(c.mark_attendance(roll(Vec::new())).await.unwrap(), 2);
  let err = c.mark_attendance(roll(vec![Uuid::new_v4()])).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let mine = c.attendance(&a_claims).await.unwrap();
  assert_eq!((mine[0].attended, mine[0].total), (1, 2));
  assert_eq!(mine[0].percentage, "50.00");
  let theirs = c.attendance(&b_claims).await.unwrap();
  assert_eq!(theirs[0].percentage, "0.00");
}

// ─── Notices ─────────────────────────────────────────────────────────────────

fn notice(topic: &str, notice_for: &str) -> NoticeForm {
  NoticeForm {
    topic:      Some(topic.into()),
    date:       Some("2024-11-04".into()),
    content:    Some("Details on the notice board.".into()),
    from:       Some("Registrar".into()),
    notice_for: Some(notice_for.into()),
  }
}

#[tokio::test]
async fn notices_are_filtered_by_role() {
  let c = campus().await;
  c.create_notice(notice("Holiday", "all")).await.unwrap();
  c.create_notice(notice("Staff meeting", "faculty")).await.unwrap();
  c.create_notice(notice("Fees due", "student")).await.unwrap();
  let err = c.create_notice(notice("Picnic", "parents")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let topics = |role| {
    let claims = claims_for(&c, Uuid::new_v4(), role);
    let c = c.clone();
    async move {
      let mut t: Vec<_> = c
        .notices(&claims)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.topic)
        .collect();
      t.sort();
      t
    }
  };
  assert_eq!(topics(Role::Admin).await.len(), 3);
  assert_eq!(topics(Role::Faculty).await, ["Holiday", "Staff meeting"]);
  assert_eq!(topics(Role::Student).await, ["Fees due", "Holiday"]);

  let listed = c
    .notices(&claims_for(&c, Uuid::new_v4(), Role::Student))
    .await
    .unwrap();
  assert!(listed.iter().all(|n| n.notice_for != Audience::Faculty));
}

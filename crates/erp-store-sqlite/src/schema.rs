//! SQL schema for the ERP SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    department      TEXT PRIMARY KEY,
    department_code TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS students (
    id               TEXT PRIMARY KEY,
    username         TEXT NOT NULL UNIQUE,
    email            TEXT NOT NULL UNIQUE,
    password_hash    TEXT NOT NULL,
    name             TEXT NOT NULL,
    contact_number   TEXT NOT NULL,
    dob              TEXT NOT NULL,   -- YYYY-MM-DD
    department       TEXT NOT NULL REFERENCES departments(department),
    year             INTEGER NOT NULL,
    section          TEXT NOT NULL,
    avatar           TEXT NOT NULL,
    status           TEXT NOT NULL DEFAULT 'pending',  -- 'pending' | 'active' | 'inactive'
    password_updated INTEGER NOT NULL,
    created_at       TEXT NOT NULL,   -- RFC 3339 UTC, fixed nanosecond width
    batch                 TEXT,
    father_name           TEXT,
    mother_name           TEXT,
    father_contact_number TEXT
);

-- Usernames already issued per (department, year). Only ever incremented,
-- so a sequence number is never handed out twice.
CREATE TABLE IF NOT EXISTS username_counters (
    department TEXT NOT NULL REFERENCES departments(department),
    year       INTEGER NOT NULL,
    issued     INTEGER NOT NULL,
    PRIMARY KEY (department, year)
);

CREATE TABLE IF NOT EXISTS admins (
    id               TEXT PRIMARY KEY,
    username         TEXT NOT NULL UNIQUE,
    name             TEXT NOT NULL,
    email            TEXT NOT NULL,
    password_hash    TEXT NOT NULL,
    password_updated INTEGER NOT NULL,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS faculty (
    id               TEXT PRIMARY KEY,
    username         TEXT NOT NULL UNIQUE,
    name             TEXT NOT NULL,
    email            TEXT NOT NULL,
    department       TEXT NOT NULL,
    password_hash    TEXT NOT NULL,
    password_updated INTEGER NOT NULL,
    created_at       TEXT NOT NULL,
    contact_number   TEXT,
    dob              TEXT,
    designation      TEXT,
    avatar           TEXT
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_code TEXT PRIMARY KEY,
    subject_name TEXT NOT NULL,
    department   TEXT NOT NULL REFERENCES departments(department),
    year         INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tests (
    id           TEXT PRIMARY KEY,
    subject_code TEXT NOT NULL REFERENCES subjects(subject_code),
    department   TEXT NOT NULL,
    year         INTEGER NOT NULL,
    section      TEXT NOT NULL,
    test         TEXT NOT NULL,
    date         TEXT NOT NULL,   -- YYYY-MM-DD
    total_marks  INTEGER NOT NULL,
    created_at   TEXT NOT NULL,
    UNIQUE (subject_code, department, year, section, test)
);

CREATE TABLE IF NOT EXISTS marks (
    test_id    TEXT NOT NULL REFERENCES tests(id),
    student_id TEXT NOT NULL REFERENCES students(id),
    marks      INTEGER NOT NULL,
    PRIMARY KEY (test_id, student_id)
);

-- Running totals per (student, subject); each roll call bumps `total` for
-- the whole class and `attended` for those present.
CREATE TABLE IF NOT EXISTS attendance (
    student_id   TEXT NOT NULL REFERENCES students(id),
    subject_code TEXT NOT NULL REFERENCES subjects(subject_code),
    attended     INTEGER NOT NULL DEFAULT 0,
    total        INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (student_id, subject_code)
);

CREATE TABLE IF NOT EXISTS notices (
    id         TEXT PRIMARY KEY,
    topic      TEXT NOT NULL,
    date       TEXT NOT NULL,   -- YYYY-MM-DD
    content    TEXT NOT NULL,
    sender     TEXT NOT NULL,
    notice_for TEXT NOT NULL,   -- 'all' | 'faculty' | 'student'
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS students_status_idx     ON students(status, created_at);
CREATE INDEX IF NOT EXISTS students_department_idx ON students(department);
CREATE INDEX IF NOT EXISTS students_class_idx      ON students(department, year, section);
CREATE INDEX IF NOT EXISTS tests_class_idx         ON tests(department, year, section);
CREATE INDEX IF NOT EXISTS marks_student_idx       ON marks(student_id);

PRAGMA user_version = 1;
";

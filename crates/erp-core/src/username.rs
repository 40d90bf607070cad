//! Generated student usernames.
//!
//! A username is `STU` + four-digit year + department code + sequence. The
//! sequence is padded to three digits and printed in full once it outgrows
//! them. Allocation of the sequence itself is the store's job.

pub const STUDENT_PREFIX: &str = "STU";

pub fn student_username(year: i32, department_code: &str, sequence: u32) -> String {
  format!("{STUDENT_PREFIX}{year:04}{department_code}{sequence:03}")
}

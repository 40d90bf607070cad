//! Core types and trait definitions for the college ERP backend.
//!
//! Free of HTTP and database dependencies; every other crate depends on it.

pub mod academic;
pub mod account;
pub mod department;
pub mod notice;
pub mod error;
pub mod profile;
pub mod registration;
pub mod store;
pub mod student;
pub mod username;

pub use error::{Error, ErrorKind, FieldErrors, Result};

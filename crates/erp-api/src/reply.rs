//! Response envelopes shared by the faculty and student handlers.

use serde::Serialize;

/// `{"result": [...]}`
#[derive(Debug, Serialize)]
pub struct Listing<T> {
  pub result: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
  fn from(result: Vec<T>) -> Self { Self { result } }
}

/// `{"message": "..."}`
#[derive(Debug, Serialize)]
pub struct Message {
  pub message: &'static str,
}

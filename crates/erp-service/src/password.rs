//! Argon2 password hashing. The async entry points run on the blocking pool.

use argon2::{
  Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use erp_core::{Error, Result};
use rand_core::OsRng;

/// Salted one-way hashing of account passwords into PHC strings.
#[derive(Clone, Default)]
pub struct Passwords {
  argon2: Argon2<'static>,
}

impl Passwords {
  /// Argon2id with explicit cost parameters. The default is the argon2 crate's
  /// recommended setting; tests use much cheaper ones.
  pub fn with_params(params: Params) -> Self {
    Self {
      argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
    }
  }

  /// Hash on the current thread. Used by the server's `--hash-password` mode.
  pub fn hash_blocking(&self, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    self
      .argon2
      .hash_password(password.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
  }

  pub async fn hash(&self, password: String) -> Result<String> {
    let this = self.clone();
    tokio::task::spawn_blocking(move || this.hash_blocking(&password))
      .await
      .map_err(|e| Error::Internal(format!("hashing task failed: {e}")))?
  }

  /// `Ok(false)` on a mismatch; `Err` only if the stored hash is unreadable.
  pub async fn verify(&self, password: String, stored: String) -> Result<bool> {
    let this = self.clone();
    tokio::task::spawn_blocking(move || {
      let parsed = PasswordHash::new(&stored)
        .map_err(|e| Error::Internal(format!("stored password hash is invalid: {e}")))?;
      Ok(
        this
          .argon2
          .verify_password(password.as_bytes(), &parsed)
          .is_ok(),
      )
    })
    .await
    .map_err(|e| Error::Internal(format!("verification task failed: {e}")))?
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cheap() -> Passwords {
    Passwords::with_params(Params::new(1024, 1, 1, None).unwrap())
  }

  #[tokio::test]
  async fn hash_then_verify() {
    let p = cheap();
    let hash = p.hash("hunter2".into()).await.unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(!hash.contains("hunter2"));
    assert!(p.verify("hunter2".into(), hash.clone()).await.unwrap());
    assert!(!p.verify("hunter3".into(), hash).await.unwrap());
  }

  #[tokio::test]
  async fn same_password_gets_distinct_salts() {
    let p = cheap();
    let a = p.hash("same".into()).await.unwrap();
    let b = p.hash("same".into()).await.unwrap();
    assert_ne!(a, b);
  }

  #[tokio::test]
  async fn corrupt_stored_hash_is_an_error() {
    let err = cheap()
      .verify("x".into(), "not-a-phc-string".into())
      .await
      .unwrap_err();
    assert_eq!(err.kind(), erp_core::ErrorKind::Server);
  }
}

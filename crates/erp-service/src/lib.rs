//! Business operations for the college ERP: student self-registration,
//! administrator approval, per-role login, the department directory, and the
//! academic records faculty keep for each class.
//!
//! Every operation lives on [`Campus`], which owns an injected
//! [`CampusStore`] handle plus the password hasher, token keys and account
//! policy. Nothing here knows about HTTP.

pub mod academic;
pub mod approval;
pub mod directory;
pub mod login;
pub mod notice;
pub mod password;
pub mod profile;
pub mod registration;
pub mod token;

use std::sync::Arc;

use erp_core::store::CampusStore;

pub use password::Passwords;
pub use token::{Claims, TokenKeys, TokenTtl};

/// Account policy knobs whose "right" value the college has not settled.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
  /// `passwordUpdated` written for self-registered students. `true` means no
  /// forced password change at first login.
  pub self_registered_password_updated: bool,
  /// `passwordUpdated` written for faculty provisioned by an administrator.
  pub provisioned_password_updated:     bool,
}

impl Default for Policy {
  fn default() -> Self {
    Self {
      self_registered_password_updated: true,
      provisioned_password_updated:     false,
    }
  }
}

/// Service handle shared by all request handlers.
///
/// Cloning is cheap; the store and token keys are reference-counted.
pub struct Campus<S> {
  pub store:     Arc<S>,
  pub passwords: Passwords,
  pub tokens:    Arc<TokenKeys>,
  pub policy:    Policy,
}

impl<S> Clone for Campus<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      passwords: self.passwords.clone(),
      tokens:    Arc::clone(&self.tokens),
      policy:    self.policy,
    }
  }
}

impl<S: CampusStore> Campus<S> {
  pub fn new(store: Arc<S>, tokens: TokenKeys, policy: Policy) -> Self {
    Self {
      store,
      passwords: Passwords::default(),
      tokens: Arc::new(tokens),
      policy,
    }
  }

  /// Replace the password hasher, e.g. with cheaper parameters in tests.
  pub fn with_passwords(mut self, passwords: Passwords) -> Self {
    self.passwords = passwords;
    self
  }
}

/// Lift a backend error into the shared taxonomy, keeping its kind.
pub(crate) fn store_error<E: Into<erp_core::Error>>(e: E) -> erp_core::Error {
  e.into()
}

#[cfg(test)]
mod tests;

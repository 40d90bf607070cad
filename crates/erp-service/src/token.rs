//! Signed, time-limited bearer tokens (HS256 JWT).
//!
//! There is no session store and no revocation list: a token is valid until
//! its `exp` passes.

use chrono::{Duration, Utc};
use erp_core::{Error, Result, account::Role};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  errors::ErrorKind as JwtErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  /// Identity subject: the username for admins, the email otherwise.
  pub sub:  String,
  /// Record id within the role's identity pool.
  pub id:   Uuid,
  pub role: Role,
  pub iat:  i64,
  pub exp:  i64,
}

/// Token lifetime per role.
#[derive(Debug, Clone, Copy)]
pub struct TokenTtl {
  pub admin:   Duration,
  pub faculty: Duration,
  pub student: Duration,
}

impl Default for TokenTtl {
  fn default() -> Self {
    Self {
      admin:   Duration::hours(1),
      faculty: Duration::hours(24),
      student: Duration::hours(24),
    }
  }
}

impl TokenTtl {
  pub fn for_role(&self, role: Role) -> Duration {
    match role {
      Role::Admin => self.admin,
      Role::Faculty => self.faculty,
      Role::Student => self.student,
    }
  }
}

/// Signing and verification keys derived from one shared secret.
pub struct TokenKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        TokenTtl,
}

impl TokenKeys {
  pub fn new(secret: &str, ttl: TokenTtl) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
      ttl,
    }
  }

  pub fn ttl(&self) -> &TokenTtl { &self.ttl }

  /// Issue a token for `role` with that role's configured lifetime.
  pub fn issue(&self, sub: &str, id: Uuid, role: Role) -> Result<String> {
    let now = Utc::now();
    let exp = now
      .checked_add_signed(self.ttl.for_role(role))
      .ok_or_else(|| {
        tracing::error!(%role, "token lifetime overflows the calendar");
        Error::Internal("failed to generate token".into())
      })?;
    let claims = Claims {
      sub: sub.to_owned(),
      id,
      role,
      iat: now.timestamp(),
      exp: exp.timestamp(),
    };
    self.sign(&claims)
  }

  pub(crate) fn sign(&self, claims: &Claims) -> Result<String> {
    encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| {
      tracing::error!("failed to encode JWT: {e}");
      Error::Internal("failed to generate token".into())
    })
  }

  /// Check signature and expiry and return the claims.
  pub fn verify(&self, token: &str) -> Result<Claims> {
    decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| match e.kind() {
        JwtErrorKind::ExpiredSignature => {
          Error::Authentication("Authentication failed. Token expired.".into())
        }
        _ => {
          tracing::debug!("JWT validation failed: {e}");
          Error::Authentication("Authentication failed. Invalid token.".into())
        }
      })
  }
}

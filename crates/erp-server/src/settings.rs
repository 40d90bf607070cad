//! Server configuration, deserialised from `config.toml` layered under
//! `ERP_`-prefixed environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration as StdDuration,
};

use anyhow::{Context as _, bail};
use chrono::Duration;
use erp_api::RateLimit;
use erp_core::account::NewAdmin;
use erp_service::{Policy, TokenTtl};
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  pub database_path:   PathBuf,
  pub jwt_secret:      String,
  #[serde(default)]
  pub tokens:          TokenConfig,
  #[serde(default)]
  pub policy:          PolicyConfig,
  #[serde(default)]
  pub rate_limit:      RateLimitConfig,
  pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Longest token lifetime accepted, in seconds.
const MAX_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Token lifetimes in seconds.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct TokenConfig {
  pub admin_ttl_secs:   i64,
  pub faculty_ttl_secs: i64,
  pub student_ttl_secs: i64,
}

impl Default for TokenConfig {
  fn default() -> Self {
    let ttl = TokenTtl::default();
    Self {
      admin_ttl_secs:   ttl.admin.num_seconds(),
      faculty_ttl_secs: ttl.faculty.num_seconds(),
      student_ttl_secs: ttl.student.num_seconds(),
    }
  }
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct PolicyConfig {
  pub self_registered_password_updated: bool,
  pub provisioned_password_updated:     bool,
}

impl Default for PolicyConfig {
  fn default() -> Self {
    let p = Policy::default();
    Self {
      self_registered_password_updated: p.self_registered_password_updated,
      provisioned_password_updated:     p.provisioned_password_updated,
    }
  }
}

/// Per-client request budget for `/api`.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
  pub enabled:     bool,
  pub requests:    u32,
  pub window_secs: u64,
}

impl Default for RateLimitConfig {
  fn default() -> Self {
    Self { enabled: true, requests: 100, window_secs: 15 * 60 }
  }
}

/// Administrator inserted at startup if its username is free.
#[derive(Deserialize, Clone)]
pub struct BootstrapAdmin {
  pub username:      String,
  pub name:          String,
  pub email:         String,
  /// PHC string produced by `erp-server --hash-password`.
  pub password_hash: String,
}

impl From<BootstrapAdmin> for NewAdmin {
  fn from(b: BootstrapAdmin) -> Self {
    Self {
      username:         b.username,
      name:             b.name,
      email:            b.email,
      password_hash:    b.password_hash,
      password_updated: true,
    }
  }
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 5001 }

impl ServerConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("ERP")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read configuration")?;

    let cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn validate(&self) -> anyhow::Result<()> {
    if self.jwt_secret.trim().is_empty() {
      bail!("jwt_secret must not be empty");
    }
    if self.database_path.as_os_str().is_empty() {
      bail!("database_path must not be empty");
    }
    let t = &self.tokens;
    if [t.admin_ttl_secs, t.faculty_ttl_secs, t.student_ttl_secs]
      .iter()
      .any(|&s| s <= 0)
    {
      bail!("token lifetimes must be positive");
    }
    if [t.admin_ttl_secs, t.faculty_ttl_secs, t.student_ttl_secs]
      .iter()
      .any(|&s| s > MAX_TTL_SECS)
    {
      bail!("token lifetimes must not exceed {MAX_TTL_SECS} seconds (30 days)");
    }
    let r = &self.rate_limit;
    if r.enabled && (r.requests == 0 || r.window_secs == 0) {
      bail!("rate_limit.requests and rate_limit.window_secs must be positive");
    }
    Ok(())
  }

  /// `None` when rate limiting is switched off.
  pub fn rate_limit(&self) -> anyhow::Result<Option<RateLimit>> {
    let r = &self.rate_limit;
    if !r.enabled {
      return Ok(None);
    }
    RateLimit::new(r.requests, StdDuration::from_secs(r.window_secs))
      .map(Some)
      .context("invalid rate_limit settings")
  }

  pub fn token_ttl(&self) -> TokenTtl {
    TokenTtl {
      admin:   Duration::seconds(self.tokens.admin_ttl_secs),
      faculty: Duration::seconds(self.tokens.faculty_ttl_secs),
      student: Duration::seconds(self.tokens.student_ttl_secs),
    }
  }

  pub fn policy(&self) -> Policy {
    Policy {
      self_registered_password_updated: self
        .policy
        .self_registered_password_updated,
      provisioned_password_updated:     self.policy.provisioned_password_updated,
    }
  }
}

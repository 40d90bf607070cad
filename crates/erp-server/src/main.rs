//! erp-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the ERP JSON API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `[bootstrap_admin] password_hash`:
//!
//! ```text
//! cargo run -p erp-server -- --hash-password
//! ```

mod settings;

use std::{
  net::SocketAddr,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use erp_service::{Campus, Passwords, TokenKeys};
use erp_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "College ERP API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Insert the default department directory before serving.
  #[arg(long)]
  seed_departments: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    println!("{}", Passwords::default().hash_blocking(&password)?);
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config)?;

  let db_path = expand_tilde(&cfg.database_path);
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  let campus = Campus::new(
    Arc::new(store),
    TokenKeys::new(&cfg.jwt_secret, cfg.token_ttl()),
    cfg.policy(),
  );

  if cli.seed_departments {
    campus
      .seed_departments()
      .await
      .context("failed to seed departments")?;
  }
  if let Some(admin) = cfg.bootstrap_admin.clone() {
    campus
      .ensure_admin(admin.into())
      .await
      .context("failed to create bootstrap admin")?;
  }

  let app = erp_api::api_router(campus, cfg.rate_limit()?);
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .await
  .context("server error")?;

  Ok(())
}

/// Read one line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_owned();
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  Ok(password)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

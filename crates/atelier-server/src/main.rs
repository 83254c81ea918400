//! Atelier server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and the media root, and serves pages + JSON API + uploaded files.
//!
//! # Granting admin
//!
//! Set `admin_email` in config.toml (the account must exist); the flag is
//! applied idempotently at startup.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use atelier_api::AppState;
use atelier_core::store::CommunityStore;
use atelier_media::LocalObjectStore;
use atelier_server::ServerConfig;
use atelier_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Atelier community server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
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

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ATELIER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent() {
    tokio::fs::create_dir_all(parent).await.ok();
  }
  let media_root = expand_tilde(&server_cfg.media_root);
  tokio::fs::create_dir_all(&media_root)
    .await
    .with_context(|| format!("failed to create media root {media_root:?}"))?;

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let objects = LocalObjectStore::new(media_root, server_cfg.base_url.clone());
  let state = AppState::new(store, objects);

  if let Some(email) = &server_cfg.admin_email {
    seed_admin(&state, email).await?;
  }

  let app = atelier_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Grant the admin flag to the configured account's profile. Idempotent;
/// logs and continues if the account does not exist yet.
async fn seed_admin(
  state: &AppState<SqliteStore>,
  email: &str,
) -> anyhow::Result<()> {
  let Some(creds) = state.store.credentials_by_email(email).await? else {
    tracing::warn!("admin_email {email:?} has no account yet; skipping");
    return Ok(());
  };

  let profile = state
    .store
    .ensure_profile(
      creds.identity.identity_id,
      atelier_core::profile::username_from_email(email),
    )
    .await?;
  state.store.set_admin(profile.profile_id, true).await?;
  tracing::info!("granted admin to {email}");
  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
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

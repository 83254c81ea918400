//! Atelier server: configuration, page routes and router assembly.
//!
//! The binary in `main.rs` reads a [`ServerConfig`], opens the SQLite store
//! and the media root, and serves the combined router: server-rendered pages
//! at the top level, the JSON API under `/api`, uploaded objects under
//! `/files`.

pub mod pages;

use std::path::PathBuf;

use axum::Router;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use atelier_api::AppState;
use atelier_core::store::CommunityStore;

/// Runtime server configuration, deserialised from `config.toml` and
/// `ATELIER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  /// Externally visible base URL; public file URLs are derived from it.
  pub base_url:    String,
  pub store_path:  PathBuf,
  pub media_root:  PathBuf,
  /// Grant the admin flag to this account's profile at startup.
  #[serde(default)]
  pub admin_email: Option<String>,
}

/// Build the complete application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let files = ServeDir::new(state.objects.root().to_path_buf());

  Router::new()
    .merge(pages::router(state.clone()))
    .nest("/api", atelier_api::api_router(state))
    .nest_service("/files", files)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────

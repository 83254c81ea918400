//! JSON REST API for the Atelier community platform.
//!
//! Exposes an axum [`Router`] backed by any
//! [`atelier_core::store::CommunityStore`]. TLS and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", atelier_api::api_router(state.clone()))
//! ```

pub mod admin;
pub mod auth;
pub mod comments;
pub mod error;
pub mod events;
pub mod notifications;
pub mod posts;
pub mod profiles;
pub mod reactions;
pub mod session;
pub mod uploads;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, post},
};

use atelier_core::{media::COMMUNITY_FILES, store::CommunityStore};
use atelier_media::LocalObjectStore;

pub use error::ApiError;
pub use events::ChangeFeed;
pub use session::Sessions;

/// Shared state threaded through every API handler.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub sessions: Sessions,
  pub objects:  Arc<LocalObjectStore>,
  pub feed:     ChangeFeed,
}

impl<S> AppState<S> {
  pub fn new(store: S, objects: LocalObjectStore) -> Self {
    Self {
      store:    Arc::new(store),
      sessions: Sessions::new(),
      objects:  Arc::new(objects),
      feed:     ChangeFeed::new(),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // The community-files limit plus headroom; per-bucket limits are enforced
  // by the upload policies themselves.
  let upload_limit = COMMUNITY_FILES.max_bytes as usize + 1024 * 1024;

  Router::new()
    // Auth
    .route("/auth/signup", post(auth::sign_up::<S>))
    .route("/auth/signin", post(auth::sign_in::<S>))
    .route("/auth/session", get(auth::session::<S>))
    .route("/auth/signout", post(auth::sign_out::<S>))
    // Profile
    .route("/profile", get(profiles::me::<S>).put(profiles::update::<S>))
    // Feed
    .route("/feed", get(posts::feed::<S>))
    .route("/posts", post(posts::create::<S>))
    .route("/posts/{id}/reactions", post(reactions::react::<S>))
    .route("/posts/{id}/comments", post(comments::create::<S>))
    .route("/comments/{id}", delete(comments::delete::<S>))
    // Notifications
    .route("/notifications", get(notifications::inbox::<S>))
    .route("/notifications/{id}/read", post(notifications::mark_read::<S>))
    // Admin
    .route("/admin/users", get(admin::list_users::<S>))
    .route("/admin/users/{id}/verify", post(admin::verify::<S>))
    .route("/admin/broadcast", post(admin::broadcast::<S>))
    // Uploads & live updates
    .route(
      "/uploads/{bucket}",
      post(uploads::upload::<S>).layer(DefaultBodyLimit::max(upload_limit)),
    )
    .route("/events", get(events::stream::<S>))
    .with_state(state)
}

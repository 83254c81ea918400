//! In-process session layer and the request extractors built on it.
//!
//! Sessions are random UUID bearer tokens. API clients send them as
//! `Authorization: Bearer <token>`; the server-rendered pages send the same
//! token back via the `atelier_session` cookie set at sign-in. There is no
//! ambient session state — handlers receive the identity through an
//! explicitly extracted [`CurrentUser`] / [`AdminUser`] argument.

use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use atelier_core::store::CommunityStore;

use crate::{AppState, error::ApiError};

/// Cookie name used by the page layer.
pub const SESSION_COOKIE: &str = "atelier_session";

/// The identity attached to a live session token.
#[derive(Debug, Clone)]
pub struct SessionUser {
  pub identity_id: Uuid,
  pub email:       String,
}

/// Token → identity map. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct Sessions {
  inner: Arc<RwLock<HashMap<Uuid, SessionUser>>>,
}

impl Sessions {
  pub fn new() -> Self { Self::default() }

  /// Open a session and return its bearer token.
  pub async fn open(&self, user: SessionUser) -> Uuid {
    let token = Uuid::new_v4();
    self.inner.write().await.insert(token, user);
    token
  }

  pub async fn get(&self, token: Uuid) -> Option<SessionUser> {
    self.inner.read().await.get(&token).cloned()
  }

  pub async fn revoke(&self, token: Uuid) {
    self.inner.write().await.remove(&token);
  }
}

/// Pull the session token out of a request: the `Authorization` bearer header
/// wins, the session cookie is the fallback.
pub fn token_from_headers(headers: &HeaderMap) -> Option<Uuid> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .and_then(|t| Uuid::parse_str(t.trim()).ok());
  bearer.or_else(|| cookie_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<Uuid> {
  let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
  cookies.split(';').find_map(|pair| {
    let (name, value) = pair.trim().split_once('=')?;
    if name == SESSION_COOKIE {
      Uuid::parse_str(value.trim()).ok()
    } else {
      None
    }
  })
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// A signed-in user. Rejects with 401 when no valid session accompanies the
/// request.
pub struct CurrentUser(pub SessionUser);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = token_from_headers(&parts.headers)
      .ok_or_else(|| ApiError::Unauthorized("sign in first".to_string()))?;
    let user = state
      .sessions
      .get(token)
      .await
      .ok_or_else(|| ApiError::Unauthorized("session expired".to_string()))?;
    Ok(CurrentUser(user))
  }
}

/// A signed-in user whose profile carries the admin flag. The check runs
/// server-side on every admin request, not in the client.
pub struct AdminUser(pub SessionUser);

impl<S> FromRequestParts<AppState<S>> for AdminUser
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let CurrentUser(user) =
      CurrentUser::from_request_parts(parts, state).await?;

    let profile = state
      .store
      .get_profile(user.identity_id)
      .await
      .map_err(ApiError::store)?;

    match profile {
      Some(p) if p.is_admin => Ok(AdminUser(user)),
      _ => Err(ApiError::Forbidden("admin access required".to_string())),
    }
  }
}

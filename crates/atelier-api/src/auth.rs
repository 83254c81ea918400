//! Handlers for `/auth/*` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | Body: [`CredentialsBody`]; 201 + session |
//! | `POST` | `/auth/signin` | Body: [`CredentialsBody`]; 200 + session |
//! | `GET`  | `/auth/session` | Current identity + profile, 401 if none |
//! | `POST` | `/auth/signout` | Revokes the session token |

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::{
  event::{ChangeEvent, ChangeOp, Table},
  identity::{Identity, NewIdentity},
  profile::{Profile, username_from_email},
  store::CommunityStore,
};

use crate::{
  AppState,
  error::ApiError,
  session::{CurrentUser, SESSION_COOKIE, SessionUser, token_from_headers},
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
  pub email:    String,
  pub password: String,
}

/// The session envelope returned by sign-up and sign-in.
#[derive(Debug, Serialize)]
pub struct SessionBody {
  pub token:    Uuid,
  pub identity: Identity,
  pub profile:  Profile,
}

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Session cookie mirroring the bearer token, for the page layer.
fn session_cookie(token: Uuid) -> String {
  format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

fn with_session_cookie(token: Uuid, body: Response) -> Response {
  let mut response = body;
  if let Ok(value) = header::HeaderValue::from_str(&session_cookie(token)) {
    response.headers_mut().insert(header::SET_COOKIE, value);
  }
  response
}

// ─── Sign-up ──────────────────────────────────────────────────────────────────

/// `POST /auth/signup`
pub async fn sign_up<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let email = body.email.trim().to_lowercase();
  if !email.contains('@') {
    return Err(ApiError::Validation("enter a valid email address".into()));
  }
  if body.password.len() < MIN_PASSWORD_LEN {
    return Err(ApiError::Validation(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }

  if state
    .store
    .credentials_by_email(&email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::Conflict(
      "an account with this email already exists".into(),
    ));
  }

  let password_hash = hash_password(&body.password)?;
  let identity = state
    .store
    .create_identity(NewIdentity { email: email.clone(), password_hash })
    .await
    .map_err(ApiError::store)?;

  // The profile is created eagerly at sign-up, lazily at sign-in.
  let profile = state
    .store
    .ensure_profile(identity.identity_id, username_from_email(&email))
    .await
    .map_err(ApiError::store)?;
  state.feed.publish(ChangeEvent::new(
    Table::Profiles,
    ChangeOp::Insert,
    profile.profile_id,
  ));

  let token = state
    .sessions
    .open(SessionUser { identity_id: identity.identity_id, email })
    .await;

  let body = (
    StatusCode::CREATED,
    Json(SessionBody { token, identity, profile }),
  )
    .into_response();
  Ok(with_session_cookie(token, body))
}

// ─── Sign-in ──────────────────────────────────────────────────────────────────

/// `POST /auth/signin`
pub async fn sign_in<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let email = body.email.trim().to_lowercase();

  let invalid =
    || ApiError::Unauthorized("invalid email or password".to_string());

  let creds = state
    .store
    .credentials_by_email(&email)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(invalid)?;

  if !verify_password(&body.password, &creds.password_hash) {
    return Err(invalid());
  }

  // First sign-in without a profile creates one from the email local part.
  let profile = state
    .store
    .ensure_profile(
      creds.identity.identity_id,
      username_from_email(&creds.identity.email),
    )
    .await
    .map_err(ApiError::store)?;

  let token = state
    .sessions
    .open(SessionUser {
      identity_id: creds.identity.identity_id,
      email:       creds.identity.email.clone(),
    })
    .await;

  let body = Json(SessionBody { token, identity: creds.identity, profile })
    .into_response();
  Ok(with_session_cookie(token, body))
}

// ─── Session ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WhoAmIBody {
  pub identity_id: Uuid,
  pub email:       String,
  pub profile:     Option<Profile>,
}

/// `GET /auth/session`
pub async fn session<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<WhoAmIBody>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = state
    .store
    .get_profile(user.identity_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(WhoAmIBody {
    identity_id: user.identity_id,
    email: user.email,
    profile,
  }))
}

// ─── Sign-out ─────────────────────────────────────────────────────────────────

/// `POST /auth/signout` — revokes whatever token accompanied the request.
pub async fn sign_out<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Response
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if let Some(token) = token_from_headers(&headers) {
    state.sessions.revoke(token).await;
  }

  let mut response = StatusCode::NO_CONTENT.into_response();
  let expired = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0");
  if let Ok(value) = header::HeaderValue::from_str(&expired) {
    response.headers_mut().insert(header::SET_COOKIE, value);
  }
  response
}

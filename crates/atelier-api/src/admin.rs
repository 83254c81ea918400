//! Handlers for the admin console.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin/users` | All profiles, newest first |
//! | `POST` | `/admin/users/:id/verify` | Sets the flag, then notifies |
//! | `POST` | `/admin/broadcast` | Body: [`BroadcastBody`] |
//!
//! The multi-step operations here (verify-then-notify, the broadcast loop)
//! have no rollback: a failure mid-sequence leaves prior steps committed and
//! aborts the remainder with a generic error.

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::{
  Error as CoreError,
  event::{ChangeEvent, ChangeOp, Table},
  notification::BroadcastTarget,
  profile::Profile,
  store::CommunityStore,
};

use crate::{AppState, error::ApiError, session::AdminUser};

const VERIFIED_TITLE: &str = "Account Verified";
const VERIFIED_MESSAGE: &str =
  "Congratulations! Your account has been verified.";

/// `GET /admin/users`
pub async fn list_users<S>(
  State(state): State<AppState<S>>,
  AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Profile>>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let users = state.store.list_profiles().await.map_err(ApiError::store)?;
  Ok(Json(users))
}

/// `POST /admin/users/:id/verify` — flips the verification flag and, as a
/// side effect, sends the fixed congratulatory notification to that user.
pub async fn verify<S>(
  State(state): State<AppState<S>>,
  AdminUser(_admin): AdminUser,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = state
    .store
    .set_verified(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("profile {user_id} not found")))?;

  state.feed.publish(ChangeEvent::new(
    Table::Profiles,
    ChangeOp::Update,
    user_id,
  ));

  // The flag is already committed; a notification failure is reported but
  // not rolled back.
  let notification = state
    .store
    .notify(user_id, VERIFIED_TITLE.into(), VERIFIED_MESSAGE.into())
    .await
    .map_err(ApiError::store)?;
  state.feed.publish(ChangeEvent::notification(
    ChangeOp::Insert,
    notification.notification_id,
    user_id,
  ));

  Ok(Json(profile))
}

// ─── Broadcast ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BroadcastBody {
  pub target:  BroadcastTarget,
  pub title:   String,
  pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastReport {
  pub sent: usize,
}

/// `POST /admin/broadcast` — one notification row per resolved recipient,
/// written in a sequential loop of individual inserts.
pub async fn broadcast<S>(
  State(state): State<AppState<S>>,
  AdminUser(_admin): AdminUser,
  Json(body): Json<BroadcastBody>,
) -> Result<Json<BroadcastReport>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let title = body.title.trim().to_string();
  let message = body.message.trim().to_string();
  if title.is_empty() || message.is_empty() {
    return Err(ApiError::Validation("title and message are required".into()));
  }

  let profiles = state.store.list_profiles().await.map_err(ApiError::store)?;

  let recipients: Vec<Uuid> = match body.target {
    BroadcastTarget::All => profiles.iter().map(|p| p.profile_id).collect(),
    BroadcastTarget::Verified => profiles
      .iter()
      .filter(|p| p.is_verified)
      .map(|p| p.profile_id)
      .collect(),
    BroadcastTarget::Selected(ids) => profiles
      .iter()
      .filter(|p| ids.contains(&p.profile_id))
      .map(|p| p.profile_id)
      .collect(),
  };

  // An empty resolution never reaches the insert loop — the "send to zero
  // verified users" case performs no writes at all.
  if recipients.is_empty() {
    return Err(CoreError::EmptyBroadcast.into());
  }

  let mut sent = 0;
  for recipient in recipients {
    // No partial-failure recovery: the first N-1 inserts stay committed if
    // the Nth fails.
    let notification = state
      .store
      .notify(recipient, title.clone(), message.clone())
      .await
      .map_err(|e| {
        tracing::warn!("broadcast aborted after {sent} notifications: {e}");
        ApiError::store(e)
      })?;
    state.feed.publish(ChangeEvent::notification(
      ChangeOp::Insert,
      notification.notification_id,
      recipient,
    ));
    sent += 1;
  }

  Ok(Json(BroadcastReport { sent }))
}

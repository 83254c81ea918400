//! Handlers for the signed-in user's notification inbox.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/notifications` | Inbox, newest first, with unread count |
//! | `POST` | `/notifications/:id/read` | Recipient-only; returns the refreshed inbox |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use atelier_core::{
  event::{ChangeEvent, ChangeOp},
  notification::{Notification, unread_count},
  store::CommunityStore,
};

use crate::{AppState, error::ApiError, session::CurrentUser};

#[derive(Debug, Serialize)]
pub struct InboxBody {
  pub notifications: Vec<Notification>,
  pub unread:        usize,
}

/// `GET /notifications`
pub async fn inbox<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<InboxBody>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let notifications = state
    .store
    .inbox(user.identity_id)
    .await
    .map_err(ApiError::store)?;
  let unread = unread_count(&notifications);
  Ok(Json(InboxBody { notifications, unread }))
}

/// `POST /notifications/:id/read` — flips the read flag and answers with the
/// re-fetched inbox, matching the original's refresh-after-mark behaviour.
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<InboxBody>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let notification = state
    .store
    .get_notification(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("notification {id} not found")))?;

  if notification.recipient_id != user.identity_id {
    return Err(ApiError::Forbidden(
      "only the recipient can mark a notification read".into(),
    ));
  }

  state
    .store
    .mark_read(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("notification {id} not found")))?;

  state.feed.publish(ChangeEvent::notification(
    ChangeOp::Update,
    id,
    user.identity_id,
  ));

  let notifications = state
    .store
    .inbox(user.identity_id)
    .await
    .map_err(ApiError::store)?;
  let unread = unread_count(&notifications);
  Ok(Json(InboxBody { notifications, unread }))
}

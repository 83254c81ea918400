//! Handler for the reaction toggle.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/posts/:id/reactions` | Body: `{"kind":"like"\|"dislike"}` |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use atelier_core::{
  event::{ChangeEvent, ChangeOp, Table},
  post::{ReactionKind, ReactionOutcome},
  store::CommunityStore,
};

use crate::{AppState, error::ApiError, session::CurrentUser};

#[derive(Debug, Deserialize)]
pub struct ReactBody {
  pub kind: ReactionKind,
}

/// `POST /posts/:id/reactions` — submitting the held kind removes it,
/// submitting the other kind switches it, otherwise one is added.
pub async fn react<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(post_id): Path<Uuid>,
  Json(body): Json<ReactBody>,
) -> Result<Json<ReactionOutcome>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_post(post_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("post {post_id} not found")))?;

  let outcome = state
    .store
    .react(post_id, user.identity_id, body.kind)
    .await
    .map_err(ApiError::store)?;

  let op = match &outcome {
    ReactionOutcome::Added(_) => ChangeOp::Insert,
    ReactionOutcome::Switched(_) => ChangeOp::Update,
    ReactionOutcome::Removed { .. } => ChangeOp::Delete,
  };
  state.feed.publish(ChangeEvent::new(
    Table::Reactions,
    op,
    outcome.reaction_id(),
  ));

  Ok(Json(outcome))
}

//! Handlers for comments.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/posts/:id/comments` | Body: `{"content":"..."}` |
//! | `DELETE` | `/comments/:id` | Author-only, enforced server-side |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use atelier_core::{
  event::{ChangeEvent, ChangeOp, Table},
  post::NewComment,
  store::CommunityStore,
};

use crate::{AppState, error::ApiError, session::CurrentUser};

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub content: String,
}

/// `POST /posts/:id/comments` — returns 201 + the stored comment.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(post_id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
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

  let input = NewComment {
    post_id,
    author_id: user.identity_id,
    content: body.content,
  };
  input.validate()?;

  let comment = state
    .store
    .add_comment(input)
    .await
    .map_err(ApiError::store)?;

  state.feed.publish(ChangeEvent::new(
    Table::Comments,
    ChangeOp::Insert,
    comment.comment_id,
  ));

  Ok((StatusCode::CREATED, Json(comment)))
}

/// `DELETE /comments/:id` — only the comment's author may delete it. The
/// original enforced this in the client alone; here the server refuses.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let comment = state
    .store
    .get_comment(comment_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("comment {comment_id} not found"))
    })?;

  if comment.author_id != user.identity_id {
    return Err(ApiError::Forbidden(
      "only the author can delete a comment".into(),
    ));
  }

  state
    .store
    .delete_comment(comment_id)
    .await
    .map_err(ApiError::store)?;

  state.feed.publish(ChangeEvent::new(
    Table::Comments,
    ChangeOp::Delete,
    comment_id,
  ));

  Ok(StatusCode::NO_CONTENT)
}

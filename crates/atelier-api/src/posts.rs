//! Handlers for the feed and post creation.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/feed` | Every post, newest first, fully decorated |
//! | `POST` | `/posts` | Body: [`NewPostBody`]; kind tag is derived |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use atelier_core::{
  event::{ChangeEvent, ChangeOp, Table},
  post::{FeedPost, NewPost},
  store::CommunityStore,
};

use crate::{AppState, error::ApiError, session::CurrentUser};

/// `GET /feed` — the single joined fetch behind the community page. There is
/// no pagination; every refresh returns everything.
pub async fn feed<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<FeedPost>>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let feed = state.store.feed().await.map_err(ApiError::store)?;
  Ok(Json(feed))
}

#[derive(Debug, Deserialize)]
pub struct NewPostBody {
  pub text:     Option<String>,
  pub link:     Option<String>,
  /// Object key in `community-files`, as returned by the upload endpoint.
  pub file_key: Option<String>,
}

/// `POST /posts` — returns 201 + the stored post.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<NewPostBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let input = NewPost {
    author_id: user.identity_id,
    text:      body.text,
    link:      body.link,
    file_key:  body.file_key,
  };
  // Surface "please add some content" as a validation error before the
  // store sees the post.
  input.classify()?;

  let post = state.store.create_post(input).await.map_err(ApiError::store)?;

  state.feed.publish(ChangeEvent::new(
    Table::Posts,
    ChangeOp::Insert,
    post.post_id,
  ));

  Ok((StatusCode::CREATED, Json(post)))
}

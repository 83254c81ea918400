//! Handlers for the signed-in user's own profile.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profile` | Lazily creates the profile on first access |
//! | `PUT`  | `/profile` | Body: [`UpdateBody`]; upsert semantics |

use axum::{Json, extract::State};
use serde::Deserialize;

use atelier_core::{
  event::{ChangeEvent, ChangeOp, Table},
  profile::{Profile, ProfileUpdate, username_from_email},
  store::CommunityStore,
};

use crate::{AppState, error::ApiError, session::CurrentUser};

/// `GET /profile` — mirrors the original client, which created the profile
/// row on first load if it was missing.
pub async fn me<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<Profile>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = state
    .store
    .ensure_profile(user.identity_id, username_from_email(&user.email))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub username:       String,
  pub mobile:         Option<String>,
  pub portfolio_link: Option<String>,
  pub country:        Option<String>,
  /// Fresh object key in the `avatars` bucket; omit to keep the stored one.
  pub avatar_key:     Option<String>,
  /// Fresh object key in the `verification` bucket; omit to keep the stored one.
  pub document_key:   Option<String>,
}

/// `PUT /profile`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let username = body.username.trim().to_string();
  if username.is_empty() {
    return Err(ApiError::Validation("username is required".into()));
  }

  let none_if_blank =
    |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

  let profile = state
    .store
    .update_profile(user.identity_id, ProfileUpdate {
      username,
      mobile:         none_if_blank(body.mobile),
      portfolio_link: none_if_blank(body.portfolio_link),
      country:        none_if_blank(body.country),
      avatar_key:     body.avatar_key,
      document_key:   body.document_key,
    })
    .await
    .map_err(ApiError::store)?;

  state.feed.publish(ChangeEvent::new(
    Table::Profiles,
    ChangeOp::Update,
    profile.profile_id,
  ));

  Ok(Json(profile))
}

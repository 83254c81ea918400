//! Profile — the public face of an identity.
//!
//! One row per identity, created lazily on first sign-in. Object keys
//! (avatar, verification document) reference the media store; only keys are
//! persisted, URLs are derived at display time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile. `profile_id` equals the owning identity's UUID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id:     Uuid,
  pub username:       String,
  pub mobile:         Option<String>,
  pub portfolio_link: Option<String>,
  pub country:        Option<String>,
  /// Object key in the `avatars` bucket.
  pub avatar_key:     Option<String>,
  /// Object key in the `verification` bucket (ID-document photo).
  pub document_key:   Option<String>,
  pub is_verified:    bool,
  pub is_admin:       bool,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

/// The author fields inlined into feed entries and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCard {
  pub profile_id:  Uuid,
  pub username:    String,
  pub avatar_key:  Option<String>,
  pub is_verified: bool,
}

impl Profile {
  pub fn card(&self) -> ProfileCard {
    ProfileCard {
      profile_id:  self.profile_id,
      username:    self.username.clone(),
      avatar_key:  self.avatar_key.clone(),
      is_verified: self.is_verified,
    }
  }
}

/// Input to [`crate::store::CommunityStore::update_profile`].
///
/// Text fields are replaced wholesale (the form always submits them; empty
/// becomes `None`). Object keys are replaced only when `Some` — a submission
/// without a fresh upload keeps the stored key.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
  pub username:       String,
  pub mobile:         Option<String>,
  pub portfolio_link: Option<String>,
  pub country:        Option<String>,
  pub avatar_key:     Option<String>,
  pub document_key:   Option<String>,
}

/// Derive the default username for a fresh profile from the account email.
pub fn username_from_email(email: &str) -> String {
  let local = email.split('@').next().unwrap_or("");
  if local.is_empty() {
    "user".to_string()
  } else {
    local.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn username_is_the_local_part() {
    assert_eq!(username_from_email("alice@example.com"), "alice");
  }

  #[test]
  fn username_falls_back_for_degenerate_input() {
    assert_eq!(username_from_email(""), "user");
    assert_eq!(username_from_email("@example.com"), "user");
  }
}

//! Identity — the authentication account envelope.
//!
//! An identity holds only what the auth layer needs. Everything a user shows
//! to other users lives in their [`Profile`](crate::profile::Profile), keyed
//! by the same UUID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authentication account. The password hash is never part of this struct;
/// it travels separately in [`Credentials`] and only as far as verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub identity_id: Uuid,
  pub email:       String,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::CommunityStore::create_identity`].
/// The caller hashes the password; stores never see plaintext.
#[derive(Debug, Clone)]
pub struct NewIdentity {
  pub email:         String,
  /// Argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// An identity together with its stored password hash, as read back for
/// sign-in verification.
#[derive(Clone)]
pub struct Credentials {
  pub identity:      Identity,
  pub password_hash: String,
}

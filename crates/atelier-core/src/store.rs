//! The `CommunityStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `atelier-store-sqlite`).
//! Higher layers (`atelier-api`, `atelier-server`) depend on this
//! abstraction, not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  identity::{Credentials, Identity, NewIdentity},
  notification::Notification,
  post::{Comment, FeedPost, NewComment, NewPost, Post, ReactionKind, ReactionOutcome},
  profile::{Profile, ProfileUpdate},
};

/// Abstraction over the community data store.
///
/// The store owns all timestamps and generated ids. Policy checks that need
/// request context (who is asking) live in the API layer; the store enforces
/// only data invariants — unique emails, the one-reaction-per-user rule, and
/// referential integrity.
pub trait CommunityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// Create an authentication account. Fails if the email is taken.
  fn create_identity(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Fetch an identity plus its password hash for sign-in verification.
  fn credentials_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  fn get_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create the profile for an identity if it does not exist yet, then
  /// return it. Idempotent; the given username is only used on creation.
  fn ensure_profile(
    &self,
    identity_id: Uuid,
    username: String,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Upsert the self-service profile fields. Creates the row when absent
  /// (mirroring the original client's upsert submission).
  fn update_profile(
    &self,
    id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// All profiles, newest first (admin console listing and broadcast
  /// target resolution).
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  /// Set the verification flag. Returns `None` if no such profile.
  fn set_verified(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Grant or revoke the admin flag (startup seeding, operator action).
  fn set_admin(
    &self,
    id: Uuid,
    is_admin: bool,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// The whole feed in one fetch: every post, newest first, decorated with
  /// its full reaction set and comment set, author fields inlined.
  fn feed(
    &self,
  ) -> impl Future<Output = Result<Vec<FeedPost>, Self::Error>> + Send + '_;

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Toggle semantics: no existing reaction inserts, same kind removes,
  /// different kind updates in place. At most one live reaction per
  /// `(post, user)` at any time.
  fn react(
    &self,
    post_id: Uuid,
    author_id: Uuid,
    kind: ReactionKind,
  ) -> impl Future<Output = Result<ReactionOutcome, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Remove a comment. Authorization (author-only) is checked by the caller
  /// before this is invoked.
  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Insert one notification row. Broadcasts are a caller-side loop of
  /// these calls; there is no batch write.
  fn notify(
    &self,
    recipient: Uuid,
    title: String,
    message: String,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn get_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  /// A recipient's inbox, newest first.
  fn inbox(
    &self,
    recipient: Uuid,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  /// Flip the read flag. Returns `None` if no such notification.
  fn mark_read(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;
}

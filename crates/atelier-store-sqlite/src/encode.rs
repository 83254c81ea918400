//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings (which sort chronologically as text).
//! UUIDs are hyphenated lowercase strings. Enum columns store their
//! lowercase discriminant.

use atelier_core::{
  identity::Identity,
  notification::Notification,
  post::{Comment, CommentView, Post, PostKind, Reaction, ReactionKind},
  profile::{Profile, ProfileCard},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PostKind ────────────────────────────────────────────────────────────────

pub fn encode_post_kind(k: PostKind) -> &'static str {
  match k {
    PostKind::Text => "text",
    PostKind::Link => "link",
    PostKind::File => "file",
  }
}

pub fn decode_post_kind(s: &str) -> Result<PostKind> {
  match s {
    "text" => Ok(PostKind::Text),
    "link" => Ok(PostKind::Link),
    "file" => Ok(PostKind::File),
    other => Err(Error::Decode(format!("unknown post kind: {other:?}"))),
  }
}

// ─── ReactionKind ────────────────────────────────────────────────────────────

pub fn encode_reaction_kind(k: ReactionKind) -> &'static str {
  match k {
    ReactionKind::Like => "like",
    ReactionKind::Dislike => "dislike",
  }
}

pub fn decode_reaction_kind(s: &str) -> Result<ReactionKind> {
  match s {
    "like" => Ok(ReactionKind::Like),
    "dislike" => Ok(ReactionKind::Dislike),
    other => Err(Error::Decode(format!("unknown reaction kind: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `identities` row.
pub struct RawIdentity {
  pub identity_id: String,
  pub email:       String,
  pub created_at:  String,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      identity_id: decode_uuid(&self.identity_id)?,
      email:       self.email,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id:     String,
  pub username:       String,
  pub mobile:         Option<String>,
  pub portfolio_link: Option<String>,
  pub country:        Option<String>,
  pub avatar_key:     Option<String>,
  pub document_key:   Option<String>,
  pub is_verified:    bool,
  pub is_admin:       bool,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id:     decode_uuid(&self.profile_id)?,
      username:       self.username,
      mobile:         self.mobile,
      portfolio_link: self.portfolio_link,
      country:        self.country,
      avatar_key:     self.avatar_key,
      document_key:   self.document_key,
      is_verified:    self.is_verified,
      is_admin:       self.is_admin,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// The author display columns joined onto posts and comments.
pub struct RawCard {
  pub profile_id:  String,
  pub username:    String,
  pub avatar_key:  Option<String>,
  pub is_verified: bool,
}

impl RawCard {
  pub fn into_card(self) -> Result<ProfileCard> {
    Ok(ProfileCard {
      profile_id:  decode_uuid(&self.profile_id)?,
      username:    self.username,
      avatar_key:  self.avatar_key,
      is_verified: self.is_verified,
    })
  }
}

/// Raw strings read directly from a `posts` row.
pub struct RawPost {
  pub post_id:    String,
  pub author_id:  String,
  pub content:    Option<String>,
  pub file_key:   Option<String>,
  pub kind:       String,
  pub created_at: String,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      post_id:    decode_uuid(&self.post_id)?,
      author_id:  decode_uuid(&self.author_id)?,
      content:    self.content,
      file_key:   self.file_key,
      kind:       decode_post_kind(&self.kind)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `reactions` row.
pub struct RawReaction {
  pub reaction_id: String,
  pub post_id:     String,
  pub author_id:   String,
  pub kind:        String,
  pub created_at:  String,
}

impl RawReaction {
  pub fn into_reaction(self) -> Result<Reaction> {
    Ok(Reaction {
      reaction_id: decode_uuid(&self.reaction_id)?,
      post_id:     decode_uuid(&self.post_id)?,
      author_id:   decode_uuid(&self.author_id)?,
      kind:        decode_reaction_kind(&self.kind)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub post_id:    String,
  pub author_id:  String,
  pub content:    String,
  pub created_at: String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      post_id:    decode_uuid(&self.post_id)?,
      author_id:  decode_uuid(&self.author_id)?,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A comment row joined with its author's display columns.
pub struct RawCommentRow {
  pub comment: RawComment,
  pub author:  RawCard,
}

impl RawCommentRow {
  pub fn into_view(self) -> Result<CommentView> {
    Ok(CommentView {
      comment: self.comment.into_comment()?,
      author:  self.author.into_card()?,
    })
  }
}

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub recipient_id:    String,
  pub title:           String,
  pub message:         String,
  pub is_read:         bool,
  pub created_at:      String,
}

impl RawNotification {
  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      recipient_id:    decode_uuid(&self.recipient_id)?,
      title:           self.title,
      message:         self.message,
      is_read:         self.is_read,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

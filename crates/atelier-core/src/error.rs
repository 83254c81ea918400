//! Error types for `atelier-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("post not found: {0}")]
  PostNotFound(Uuid),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  #[error("notification not found: {0}")]
  NotificationNotFound(Uuid),

  #[error("an account with email {0:?} already exists")]
  EmailTaken(String),

  #[error("a post needs text, a link, or a file")]
  EmptyPost,

  #[error("a comment needs a non-empty body")]
  EmptyComment,

  #[error("broadcast resolved to zero recipients")]
  EmptyBroadcast,

  #[error("unknown storage bucket: {0:?}")]
  UnknownBucket(String),

  #[error("content type {0:?} is not allowed here")]
  UnsupportedMediaType(String),

  #[error("file of {size} bytes exceeds the {limit}-byte limit")]
  FileTooLarge { size: u64, limit: u64 },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

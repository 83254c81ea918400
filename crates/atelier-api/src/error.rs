//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("validation error: {0}")]
  Validation(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap an opaque backend failure.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

/// Map domain-level failures onto HTTP semantics.
impl From<atelier_core::Error> for ApiError {
  fn from(e: atelier_core::Error) -> Self {
    use atelier_core::Error as E;
    match e {
      E::EmailTaken(_) => Self::Conflict(e.to_string()),
      E::EmptyPost
      | E::EmptyComment
      | E::EmptyBroadcast
      | E::UnsupportedMediaType(_)
      | E::FileTooLarge { .. } => Self::Validation(e.to_string()),
      E::UnknownBucket(_)
      | E::ProfileNotFound(_)
      | E::PostNotFound(_)
      | E::CommentNotFound(_)
      | E::NotificationNotFound(_) => Self::NotFound(e.to_string()),
      E::Serialization(_) => Self::Internal(e.to_string()),
    }
  }
}

impl From<atelier_media::Error> for ApiError {
  fn from(e: atelier_media::Error) -> Self {
    match e {
      atelier_media::Error::Policy(core) => core.into(),
      atelier_media::Error::Io(io) => Self::Internal(io.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Validation(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Internal(m) => {
        tracing::error!("internal error: {m}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
      ApiError::Store(e) => {
        tracing::error!("store error: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

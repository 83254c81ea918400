//! Handler for bucket-scoped file uploads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/uploads/:bucket` | Raw body + `Content-Type`; 201 + key/url |
//!
//! The bucket's policy (MIME membership, byte limit) is checked before any
//! write; only the returned key is meant to be persisted on owning records.

use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use serde::Serialize;

use atelier_core::store::CommunityStore;

use crate::{AppState, error::ApiError, session::CurrentUser};

#[derive(Debug, Serialize)]
pub struct UploadedBody {
  pub bucket: String,
  pub key:    String,
  pub url:    String,
}

/// `POST /uploads/:bucket`
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  CurrentUser(_user): CurrentUser,
  Path(bucket): Path<String>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommunityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let content_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
    .unwrap_or_else(|| "application/octet-stream".to_string());

  let stored = state.objects.put(&bucket, &content_type, &body).await?;

  Ok((
    StatusCode::CREATED,
    Json(UploadedBody {
      bucket: stored.bucket,
      key:    stored.key,
      url:    stored.url,
    }),
  ))
}

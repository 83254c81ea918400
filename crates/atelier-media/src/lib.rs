//! Local-disk object storage for uploaded files.
//!
//! Buckets are directories under a single media root. Objects are written
//! under randomly generated keys; only the key is ever persisted on owning
//! records, and the public URL is a pure derivation from `(base, bucket,
//! key)`. Validation happens strictly before any byte touches disk.

pub mod error;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use atelier_core::media::policy_for;
use tokio::fs;
use uuid::Uuid;

/// The result of a successful upload.
#[derive(Debug, Clone)]
pub struct StoredObject {
  pub bucket: String,
  pub key:    String,
  pub url:    String,
}

/// Bucket-scoped object storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
  root:        PathBuf,
  public_base: String,
}

impl LocalObjectStore {
  /// `root` is the directory holding one subdirectory per bucket;
  /// `public_base` is the externally visible server base URL.
  pub fn new(root: PathBuf, public_base: impl Into<String>) -> Self {
    let public_base = public_base.into().trim_end_matches('/').to_string();
    Self { root, public_base }
  }

  /// The media root, for mounting a static file service over it.
  pub fn root(&self) -> &Path { &self.root }

  /// Validate and store one object. The bucket's policy is checked before
  /// any write: a rejected file never reaches disk.
  pub async fn put(
    &self,
    bucket: &str,
    content_type: &str,
    data: &[u8],
  ) -> Result<StoredObject> {
    let policy = policy_for(bucket)?;
    policy.check(content_type, data.len() as u64)?;

    let key = object_key(content_type);
    let path = self.root.join(bucket).join(&key);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).await?;
    }
    fs::write(&path, data).await?;

    Ok(StoredObject {
      bucket: bucket.to_string(),
      url:    self.public_url(bucket, &key),
      key,
    })
  }

  /// Derive the public URL for a stored key. Pure and idempotent — the same
  /// `(bucket, key)` always yields the same URL.
  pub fn public_url(&self, bucket: &str, key: &str) -> String {
    format!("{}/files/{}/{}", self.public_base, bucket, key)
  }
}

/// A fresh object key: `public/<uuid>.<ext>`, extension chosen from the
/// declared content type.
fn object_key(content_type: &str) -> String {
  let ext = match content_type {
    "image/jpeg" => "jpg",
    "image/png" => "png",
    "image/gif" => "gif",
    "image/webp" => "webp",
    _ => "bin",
  };
  format!("public/{}.{}", Uuid::new_v4(), ext)
}

#[cfg(test)]
mod tests {
  use atelier_core::media::AVATARS;

  use super::*;

  fn scratch_store() -> LocalObjectStore {
    let root = std::env::temp_dir()
      .join("atelier-media-tests")
      .join(Uuid::new_v4().to_string());
    LocalObjectStore::new(root, "http://localhost:3000/")
  }

  #[tokio::test]
  async fn put_stores_under_a_random_public_key() {
    let store = scratch_store();

    let stored = store
      .put("avatars", "image/png", b"not-really-a-png")
      .await
      .unwrap();
    assert!(stored.key.starts_with("public/"));
    assert!(stored.key.ends_with(".png"));

    let on_disk = fs::read(store.root().join("avatars").join(&stored.key))
      .await
      .unwrap();
    assert_eq!(on_disk, b"not-really-a-png");
  }

  #[tokio::test]
  async fn rejected_files_never_touch_disk() {
    let store = scratch_store();

    let err = store
      .put("avatars", "application/pdf", b"%PDF-")
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      Error::Policy(atelier_core::Error::UnsupportedMediaType(_))
    ));

    let oversize = vec![0u8; (AVATARS.max_bytes + 1) as usize];
    let err = store.put("avatars", "image/png", &oversize).await.unwrap_err();
    assert!(matches!(
      err,
      Error::Policy(atelier_core::Error::FileTooLarge { .. })
    ));

    // Nothing was written for either attempt.
    assert!(!store.root().join("avatars").exists());
  }

  #[tokio::test]
  async fn exactly_the_limit_is_accepted() {
    let store = scratch_store();
    let at_limit = vec![0u8; AVATARS.max_bytes as usize];
    assert!(store.put("avatars", "image/png", &at_limit).await.is_ok());
  }

  #[test]
  fn public_url_is_idempotent_and_slash_safe() {
    let store = scratch_store();
    let a = store.public_url("avatars", "public/x.png");
    let b = store.public_url("avatars", "public/x.png");
    assert_eq!(a, b);
    assert_eq!(a, "http://localhost:3000/files/avatars/public/x.png");
  }

  #[tokio::test]
  async fn unknown_bucket_is_refused() {
    let store = scratch_store();
    let err = store.put("warez", "image/png", b"x").await.unwrap_err();
    assert!(matches!(
      err,
      Error::Policy(atelier_core::Error::UnknownBucket(_))
    ));
  }
}

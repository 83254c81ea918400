//! Upload policies — what each bucket accepts.
//!
//! Validation happens strictly before any byte reaches storage: a file that
//! fails the MIME or size check is rejected without a write.

use crate::{Error, Result};

const MIB: u64 = 1024 * 1024;

/// Image types accepted for profile assets (avatar, verification document).
const PROFILE_IMAGE_TYPES: &[&str] =
  &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Image types accepted for community post images.
const POST_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// The acceptance rule for one storage bucket.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
  pub bucket:        &'static str,
  pub max_bytes:     u64,
  pub allowed_types: &'static [&'static str],
}

pub const AVATARS: UploadPolicy = UploadPolicy {
  bucket:        "avatars",
  max_bytes:     5 * MIB,
  allowed_types: PROFILE_IMAGE_TYPES,
};

pub const VERIFICATION: UploadPolicy = UploadPolicy {
  bucket:        "verification",
  max_bytes:     5 * MIB,
  allowed_types: PROFILE_IMAGE_TYPES,
};

pub const COMMUNITY_FILES: UploadPolicy = UploadPolicy {
  bucket:        "community-files",
  max_bytes:     50 * MIB,
  allowed_types: POST_IMAGE_TYPES,
};

const POLICIES: &[&UploadPolicy] = &[&AVATARS, &VERIFICATION, &COMMUNITY_FILES];

/// Look up the policy for a bucket name; unknown buckets are not uploadable.
pub fn policy_for(bucket: &str) -> Result<&'static UploadPolicy> {
  POLICIES
    .iter()
    .copied()
    .find(|p| p.bucket == bucket)
    .ok_or_else(|| Error::UnknownBucket(bucket.to_string()))
}

impl UploadPolicy {
  /// Check a declared content type and byte size against this policy.
  /// A file of exactly `max_bytes` passes; one byte over fails.
  pub fn check(&self, content_type: &str, size: u64) -> Result<()> {
    if !self.allowed_types.contains(&content_type) {
      return Err(Error::UnsupportedMediaType(content_type.to_string()));
    }
    if size > self.max_bytes {
      return Err(Error::FileTooLarge { size, limit: self.max_bytes });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exact_limit_passes_one_over_fails() {
    assert!(AVATARS.check("image/png", AVATARS.max_bytes).is_ok());
    assert!(matches!(
      AVATARS.check("image/png", AVATARS.max_bytes + 1),
      Err(Error::FileTooLarge { .. })
    ));
  }

  #[test]
  fn non_image_types_are_rejected() {
    assert!(matches!(
      COMMUNITY_FILES.check("application/pdf", 10),
      Err(Error::UnsupportedMediaType(_))
    ));
    // webp is a profile-asset type only.
    assert!(COMMUNITY_FILES.check("image/webp", 10).is_err());
    assert!(AVATARS.check("image/webp", 10).is_ok());
  }

  #[test]
  fn unknown_bucket_has_no_policy() {
    assert!(policy_for("community-files").is_ok());
    assert!(matches!(policy_for("warez"), Err(Error::UnknownBucket(_))));
  }
}

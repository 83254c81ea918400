//! Error type for `atelier-media`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Policy violation — unknown bucket, bad content type, oversize file.
  #[error(transparent)]
  Policy(#[from] atelier_core::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

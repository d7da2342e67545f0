//! Error type for `jukebox-registry`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] jukebox_core::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The persisted state is internally inconsistent.
  #[error("corrupt snapshot: {0}")]
  CorruptSnapshot(String),

  #[error("search index error: {0}")]
  Search(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

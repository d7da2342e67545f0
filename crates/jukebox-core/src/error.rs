//! Error types for `jukebox-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid song: {0}")]
  InvalidSong(String),

  #[error("invalid identifier: {0:?}")]
  InvalidId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

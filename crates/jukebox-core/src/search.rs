//! The `SongSearch` trait — the full-text index collaborator.
//!
//! The registry owns song state; the index owns text matching. The registry
//! pushes every newly added song to the index and asks it for candidate ids
//! when a caller searches. Visibility filtering happens afterwards, inside the
//! registry.

use std::future::Future;

use crate::song::{Song, SongId};

/// Abstraction over a full-text song index.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait SongSearch: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Make `song` findable. Indexing an already indexed id replaces it.
  fn index<'a>(
    &'a self,
    song: &'a Song,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Return up to `limit` ids matching `query`, best match first.
  fn search<'a>(
    &'a self,
    query: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SongId>, Self::Error>> + Send + 'a;
}

//! [`Jukebox`] — shared, async access to a [`SongRegistry`] and its search
//! index.
//!
//! All registry bookkeeping happens under one mutex, so concurrent callers
//! from any number of tasks observe each operation atomically. Calls into the
//! [`SongSearch`] collaborator are made with the lock released.

use std::{collections::HashSet, sync::Arc};

use jukebox_core::{
  projection::StatefulSong,
  search::SongSearch,
  song::{Song, SongId, SongState},
  user::Identity,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::{Error, Result, SongRegistry, notify::SongUpdates};

/// Cloning is cheap — every part is reference-counted.
pub struct Jukebox<S> {
  registry:  Arc<Mutex<SongRegistry>>,
  search:    Arc<S>,
  /// Registered songs whose last push to the index failed.
  unindexed: Arc<Mutex<HashSet<SongId>>>,
}

impl<S> Clone for Jukebox<S> {
  fn clone(&self) -> Self {
    Self {
      registry:  Arc::clone(&self.registry),
      search:    Arc::clone(&self.search),
      unindexed: Arc::clone(&self.unindexed),
    }
  }
}

impl<S: SongSearch> Jukebox<S> {
  pub fn new(registry: SongRegistry, search: S) -> Self {
    Self {
      registry:  Arc::new(Mutex::new(registry)),
      search:    Arc::new(search),
      unindexed: Arc::default(),
    }
  }

  /// Exclusive access for the synchronous registry operations.
  pub async fn registry(&self) -> MutexGuard<'_, SongRegistry> {
    self.registry.lock().await
  }

  pub async fn subscribe(&self) -> SongUpdates {
    self.registry.lock().await.subscribe()
  }

  /// Add `song` and push it to the search index if it is new, or if an
  /// earlier push failed.
  ///
  /// An index failure is returned as [`Error::Search`], but the song stays
  /// registered and the push is retried by the next `add` of the same id.
  pub async fn add(
    &self,
    song: Song,
    submitter: &impl Identity,
    initial_state: SongState,
  ) -> Result<StatefulSong> {
    let id = song.id.clone();
    let (projection, pending) = {
      let mut registry = self.registry.lock().await;
      let is_new = !registry.contains(&id);
      let projection = registry.add(song, submitter, initial_state)?;
      let mut unindexed = self.unindexed.lock().await;
      if is_new {
        unindexed.insert(id.clone());
      }
      // Index the registered song, not the resubmitted copy.
      let pending = unindexed
        .contains(&id)
        .then(|| registry.get(&id).map(|r| r.song().clone()))
        .flatten();
      (projection, pending)
    };

    if let Some(song) = pending {
      self.push_to_index(&song).await?;
    }
    Ok(projection)
  }

  async fn push_to_index(&self, song: &Song) -> Result<()> {
    if let Err(e) = self.search.index(song).await {
      tracing::warn!(song = %song.id, error = %e, "search index push failed");
      return Err(Error::Search(Box::new(e)));
    }
    self.unindexed.lock().await.remove(&song.id);
    Ok(())
  }

  /// Add a batch of resolver results, skipping malformed songs. Returns the
  /// projections of the accepted songs in input order.
  pub async fn add_all(
    &self,
    songs: impl IntoIterator<Item = Song>,
    submitter: &impl Identity,
  ) -> Result<Vec<StatefulSong>> {
    let mut added = Vec::new();
    for song in songs {
      let id = song.id.clone();
      match self.add(song, submitter, SongState::New).await {
        Ok(projection) => added.push(projection),
        Err(Error::Core(e)) => {
          tracing::warn!(song = %id, error = %e, "skipping malformed song");
        }
        Err(e) => return Err(e),
      }
    }
    Ok(added)
  }

  /// Query the search index and keep the hits `viewer` may see, at most
  /// `limit` of them.
  ///
  /// Hidden songs can crowd the top of the index, so the fetch size doubles
  /// until `limit` visible hits turn up or the index runs dry.
  pub async fn search(
    &self,
    query: &str,
    limit: usize,
    viewer: &impl Identity,
  ) -> Result<Vec<StatefulSong>> {
    if limit == 0 {
      return Ok(Vec::new());
    }
    let query = query.trim();
    let mut fetch = limit;
    loop {
      let hits = self
        .search
        .search(query, fetch)
        .await
        .map_err(|e| Error::Search(Box::new(e)))?;
      let exhausted = hits.len() < fetch || fetch == usize::MAX;
      let found = self.registry.lock().await.resolve_hits(&hits, limit, viewer);
      if found.len() >= limit || exhausted {
        return Ok(found);
      }
      fetch = fetch.saturating_mul(2);
    }
  }

  /// Push every known song to the search index, e.g. after loading state
  /// into an index that does not persist.
  pub async fn reindex(&self) -> Result<usize> {
    let songs: Vec<Song> =
      self.registry.lock().await.songs().cloned().collect();
    for song in &songs {
      self.push_to_index(song).await?;
    }
    tracing::info!(songs = songs.len(), "rebuilt search index");
    Ok(songs.len())
  }
}

//! [`MemorySearch`] — an in-process [`SongSearch`] implementation.
//!
//! Matches case-insensitively on whitespace-separated terms: every term must
//! occur in the song's title, artist, or album. Hits whose title contains
//! the whole query rank first; otherwise insertion order is kept.

use std::{collections::HashMap, convert::Infallible};

use jukebox_core::{
  search::SongSearch,
  song::{Song, SongId},
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemorySearch {
  inner: RwLock<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
  docs:     Vec<Doc>,
  position: HashMap<SongId, usize>,
}

#[derive(Debug)]
struct Doc {
  id:       SongId,
  title:    String,
  haystack: String,
}

impl Doc {
  fn new(song: &Song) -> Self {
    let title = song.title.to_lowercase();
    let mut haystack = format!("{title} {}", song.artist.to_lowercase());
    if let Some(album) = &song.album {
      haystack.push(' ');
      haystack.push_str(&album.to_lowercase());
    }
    Self { id: song.id.clone(), title, haystack }
  }
}

impl MemorySearch {
  pub fn new() -> Self { Self::default() }

  pub async fn len(&self) -> usize { self.inner.read().await.docs.len() }
}

impl SongSearch for MemorySearch {
  type Error = Infallible;

  async fn index(&self, song: &Song) -> Result<(), Self::Error> {
    let doc = Doc::new(song);
    let mut entries = self.inner.write().await;
    let existing = entries.position.get(&song.id).copied();
    match existing {
      Some(at) => entries.docs[at] = doc,
      None => {
        let at = entries.docs.len();
        entries.position.insert(song.id.clone(), at);
        entries.docs.push(doc);
      }
    }
    Ok(())
  }

  async fn search(
    &self,
    query: &str,
    limit: usize,
  ) -> Result<Vec<SongId>, Self::Error> {
    let query = query.trim().to_lowercase();
    let terms: Vec<&str> = query.split_whitespace().collect();
    if terms.is_empty() {
      return Ok(Vec::new());
    }

    let entries = self.inner.read().await;
    let mut hits: Vec<(bool, usize, &Doc)> = entries
      .docs
      .iter()
      .enumerate()
      .filter(|(_, doc)| terms.iter().all(|t| doc.haystack.contains(t)))
      .map(|(at, doc)| (!doc.title.contains(&query), at, doc))
      .collect();
    hits.sort_by_key(|(title_miss, at, _)| (*title_miss, *at));

    Ok(
      hits
        .into_iter()
        .take(limit)
        .map(|(_, _, doc)| doc.id.clone())
        .collect(),
    )
  }
}

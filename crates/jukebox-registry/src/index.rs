//! Rank-ordered index over record ids.
//!
//! The index stores immutable [`RankKey`] snapshots. A record whose rank key
//! changes must be moved with [`RankIndex::reposition`] using the key it was
//! inserted under; the index never looks at live records.

use std::collections::BTreeSet;

use jukebox_core::song::SongId;

use crate::record::RankKey;

#[derive(Debug, Default)]
pub(crate) struct RankIndex {
  entries: BTreeSet<(RankKey, SongId)>,
}

impl RankIndex {
  pub fn insert(&mut self, key: RankKey, id: SongId) -> bool {
    self.entries.insert((key, id))
  }

  pub fn reposition(&mut self, old: RankKey, new: RankKey, id: &SongId) {
    if old == new {
      return;
    }
    let mut entry = (old, id.clone());
    let removed = self.entries.remove(&entry);
    debug_assert!(removed, "{id} was not indexed under its previous rank key");
    entry.0 = new;
    self.entries.insert(entry);
  }

  /// Ids in rank order, best first.
  pub fn iter(&self) -> impl Iterator<Item = &SongId> + '_ {
    self.entries.iter().map(|(_, id)| id)
  }

  pub fn len(&self) -> usize { self.entries.len() }
}

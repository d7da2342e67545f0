//! Operator-curated "play next" overrides.
//!
//! Holds ids only; records stay in the registry arena. An id appears at most
//! once.

use jukebox_core::song::SongId;

#[derive(Debug, Default, Clone)]
pub(crate) struct AdminQueue {
  ids: Vec<SongId>,
}

impl AdminQueue {
  pub fn from_ids(ids: Vec<SongId>) -> Self { Self { ids } }

  pub fn ids(&self) -> &[SongId] { &self.ids }

  pub fn first(&self) -> Option<&SongId> { self.ids.first() }

  pub fn get(&self, position: usize) -> Option<&SongId> {
    self.ids.get(position)
  }

  pub fn position(&self, id: &SongId) -> Option<usize> {
    self.ids.iter().position(|queued| queued == id)
  }

  pub fn contains(&self, id: &SongId) -> bool { self.position(id).is_some() }

  /// Insert `id` at `position` (clamped to the queue length), or append.
  /// An already queued id is moved rather than duplicated.
  pub fn insert(&mut self, id: SongId, position: Option<usize>) {
    self.remove(&id);
    let at = position.map_or(self.ids.len(), |p| p.min(self.ids.len()));
    self.ids.insert(at, id);
  }

  pub fn remove(&mut self, id: &SongId) -> bool {
    match self.position(id) {
      Some(at) => {
        self.ids.remove(at);
        true
      }
      None => false,
    }
  }

  pub fn move_up(&mut self, position: usize) -> bool {
    if position == 0 || position >= self.ids.len() {
      return false;
    }
    self.ids.swap(position - 1, position);
    true
  }

  pub fn move_down(&mut self, position: usize) -> bool {
    if position.saturating_add(1) >= self.ids.len() {
      return false;
    }
    self.ids.swap(position, position + 1);
    true
  }
}

//! [`SongRegistry`] — the canonical set of songs, their votes, and the order
//! they are played in.
//!
//! Every operation is synchronous and runs to completion without suspending,
//! so a single owner (or a single mutex, see [`Jukebox`](crate::Jukebox)) is
//! enough to make each call atomic.
//!
//! Unknown ids are routine: per-song operations return `None` for them.
//! Transitions that do not apply to the current state are ignored and the
//! unchanged projection is returned.

use std::collections::HashMap;

use chrono::Utc;
use jukebox_core::{
  projection::{SongPage, StatefulSong},
  song::{Song, SongId, SongState, Vote},
  user::{Anonymous, Identity},
};

use crate::{
  Result,
  admin_queue::AdminQueue,
  index::RankIndex,
  notify::{SongUpdates, UpdateSignal},
  record::SongRecord,
};

#[derive(Debug)]
pub struct SongRegistry {
  pub(crate) records:     HashMap<SongId, SongRecord>,
  pub(crate) index:       RankIndex,
  pub(crate) admin_queue: AdminQueue,
  pub(crate) next_seq:    u64,
  pub(crate) updates:     UpdateSignal,
}

impl Default for SongRegistry {
  fn default() -> Self { Self::new() }
}

impl SongRegistry {
  pub fn new() -> Self {
    Self {
      records:     HashMap::new(),
      index:       RankIndex::default(),
      admin_queue: AdminQueue::default(),
      next_seq:    0,
      updates:     UpdateSignal::new(),
    }
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn contains(&self, id: &SongId) -> bool { self.records.contains_key(id) }

  pub fn get(&self, id: &SongId) -> Option<&SongRecord> { self.records.get(id) }

  /// Ids currently in the admin queue, in play order.
  pub fn admin_queue(&self) -> &[SongId] { self.admin_queue.ids() }

  /// Receive a coalesced notification after every mutating operation.
  pub fn subscribe(&self) -> SongUpdates { self.updates.subscribe() }

  // ── Internal helpers ──────────────────────────────────────────────────

  /// Detach the record from the rank index, mutate it, and reattach it under
  /// its new key.
  fn update<T>(
    &mut self,
    id: &SongId,
    mutate: impl FnOnce(&mut SongRecord) -> T,
  ) -> Option<T> {
    let record = self.records.get_mut(id)?;
    let before = record.rank_key();
    let out = mutate(record);
    self.index.reposition(before, record.rank_key(), id);
    self.updates.publish(Some(id.clone()));
    Some(out)
  }

  fn project(
    &self,
    id: &SongId,
    viewer: &impl Identity,
  ) -> Option<StatefulSong> {
    self.records.get(id).map(|r| r.project(viewer, None))
  }

  // ── Adding ────────────────────────────────────────────────────────────

  /// Register `song`, or return the existing record's projection if its id is
  /// already known.
  ///
  /// Fails only when `song` is malformed.
  pub fn add(
    &mut self,
    song: Song,
    submitter: &impl Identity,
    initial_state: SongState,
  ) -> Result<StatefulSong> {
    song.validate()?;

    if let Some(existing) = self.records.get(&song.id) {
      return Ok(existing.project(submitter, None));
    }

    let seq = self.next_seq;
    self.next_seq += 1;
    let record = SongRecord::new(
      song,
      initial_state,
      submitter.user_id().cloned(),
      Utc::now(),
      seq,
    );
    let id = record.id().clone();
    tracing::debug!(song = %id, state = %initial_state, "adding song");

    self.index.insert(record.rank_key(), id.clone());
    let projection = record.project(submitter, None);
    self.records.insert(id.clone(), record);
    debug_assert_eq!(self.index.len(), self.records.len());

    self.updates.publish(Some(id));
    Ok(projection)
  }

  // ── Voting ────────────────────────────────────────────────────────────

  pub fn upvote(
    &mut self,
    id: &SongId,
    user: &impl Identity,
  ) -> Option<StatefulSong> {
    let Some(voter) = user.user_id().cloned() else {
      return self.project(id, user);
    };
    if self.records.get(id)?.state() == SongState::Banned {
      tracing::debug!(song = %id, "ignoring upvote on banned song");
      return self.project(id, user);
    }
    self.update(id, |r| {
      r.auto_accept();
      r.set_vote(&voter, Some(Vote::Up));
    })?;
    self.project(id, user)
  }

  /// The vote only lands if the song is available once auto-accept has run;
  /// the auto-accept transition itself happens either way.
  pub fn downvote(
    &mut self,
    id: &SongId,
    user: &impl Identity,
  ) -> Option<StatefulSong> {
    let Some(voter) = user.user_id().cloned() else {
      return self.project(id, user);
    };
    self.update(id, |r| {
      r.auto_accept();
      if r.state() == SongState::Available {
        r.set_vote(&voter, Some(Vote::Down));
      }
    })?;
    self.project(id, user)
  }

  pub fn unvote(
    &mut self,
    id: &SongId,
    user: &impl Identity,
  ) -> Option<StatefulSong> {
    let Some(voter) = user.user_id().cloned() else {
      return self.project(id, user);
    };
    self.update(id, |r| {
      r.auto_accept();
      r.set_vote(&voter, None);
    })?;
    self.project(id, user)
  }

  // ── Review ────────────────────────────────────────────────────────────

  pub fn accept(
    &mut self,
    id: &SongId,
    user: &impl Identity,
  ) -> Option<StatefulSong> {
    self.update(id, |r| {
      if r.state() == SongState::New {
        r.set_state(SongState::Available);
      }
    })?;
    self.project(id, user)
  }

  /// Ban from any state. Votes are discarded and not restored by `unban`.
  pub fn ban(
    &mut self,
    id: &SongId,
    user: &impl Identity,
  ) -> Option<StatefulSong> {
    self.update(id, |r| {
      r.set_state(SongState::Banned);
      r.clear_votes();
    })?;
    tracing::debug!(song = %id, "banned");
    self.project(id, user)
  }

  pub fn unban(
    &mut self,
    id: &SongId,
    user: &impl Identity,
  ) -> Option<StatefulSong> {
    self.update(id, |r| {
      if r.state() == SongState::Banned {
        r.set_state(SongState::Available);
      }
    })?;
    self.project(id, user)
  }

  // ── Playback ──────────────────────────────────────────────────────────

  /// Record that `id` started playing.
  ///
  /// An admin-queued song consumes its queue entry and keeps its votes; a
  /// vote-ranked song has its votes reset for the next round.
  pub fn mark_played(&mut self, id: &SongId) -> Option<StatefulSong> {
    if !self.records.contains_key(id) {
      return None;
    }
    let from_admin_queue = self.admin_queue.remove(id);
    let now = Utc::now();
    self.update(id, |r| {
      if !from_admin_queue {
        r.clear_votes();
      }
      r.record_play(now);
    })?;
    tracing::debug!(song = %id, from_admin_queue, "marked played");
    self.project(id, &Anonymous)
  }

  /// The next song to play: the head of the admin queue, otherwise the best
  /// ranked available song.
  pub fn top_song(&self) -> Option<StatefulSong> {
    if let Some(record) =
      self.admin_queue.first().and_then(|id| self.records.get(id))
    {
      return Some(record.project(&Anonymous, Some(0)));
    }
    self
      .index
      .iter()
      .next()
      .and_then(|id| self.records.get(id))
      .filter(|r| r.state() == SongState::Available)
      .map(|r| r.project(&Anonymous, None))
  }

  // ── Listings ──────────────────────────────────────────────────────────

  /// Admin-queue entries (tagged with their position) followed by the best
  /// ranked available songs not already queued, up to `limit` in total.
  pub fn top_songs(
    &self,
    limit: usize,
    viewer: &impl Identity,
  ) -> Vec<StatefulSong> {
    let queued = self
      .admin_queue
      .ids()
      .iter()
      .enumerate()
      .filter_map(|(position, id)| {
        self
          .records
          .get(id)
          .filter(|r| viewer.can_see_queued(r.state()))
          .map(|r| r.project(viewer, Some(position)))
      });

    let ranked = self
      .index
      .iter()
      .filter_map(|id| self.records.get(id))
      .take_while(|r| r.state() == SongState::Available)
      .filter(|r| !self.admin_queue.contains(r.id()))
      .map(|r| r.project(viewer, None));

    queued.chain(ranked).take(limit).collect()
  }

  /// One page of the rank-ordered library as seen by `viewer`. `offset`
  /// counts visible songs only.
  pub fn all_songs(
    &self,
    limit: usize,
    offset: usize,
    viewer: &impl Identity,
  ) -> SongPage {
    let mut songs: Vec<StatefulSong> = self
      .index
      .iter()
      .filter_map(|id| self.records.get(id))
      .filter(|r| viewer.can_see(r.state()))
      .skip(offset)
      .take(limit.saturating_add(1))
      .map(|r| r.project(viewer, None))
      .collect();

    let has_more = songs.len() > limit;
    songs.truncate(limit);
    SongPage { songs, has_more }
  }

  /// Resolve search-index hits into projections, dropping unknown and
  /// invisible ids and keeping the index's order.
  pub fn resolve_hits(
    &self,
    hits: &[SongId],
    limit: usize,
    viewer: &impl Identity,
  ) -> Vec<StatefulSong> {
    hits
      .iter()
      .filter_map(|id| self.records.get(id))
      .filter(|r| viewer.can_see(r.state()))
      .take(limit)
      .map(|r| r.project(viewer, None))
      .collect()
  }

  /// Projection for pushing a "song updated" message to `viewer`; `None` if
  /// the song is unknown or hidden from them.
  pub fn for_user_display(
    &self,
    id: &SongId,
    viewer: &impl Identity,
  ) -> Option<StatefulSong> {
    self
      .records
      .get(id)
      .filter(|r| viewer.can_see(r.state()))
      .map(|r| r.project(viewer, None))
  }

  /// Public projection, regardless of state, e.g. for the now-playing
  /// banner.
  pub fn for_anonymous_display(&self, id: &SongId) -> Option<StatefulSong> {
    self.project(id, &Anonymous)
  }

  // ── Admin queue ───────────────────────────────────────────────────────

  /// Queue `id` at `position` (clamped), or at the end. Unknown ids are
  /// ignored.
  pub fn admin_enqueue(&mut self, id: &SongId, position: Option<usize>) {
    if !self.records.contains_key(id) {
      tracing::warn!(song = %id, "ignoring admin queue insert of unknown song");
      return;
    }
    self.admin_queue.insert(id.clone(), position);
    self.updates.publish(Some(id.clone()));
  }

  pub fn admin_dequeue(&mut self, id: &SongId) -> bool {
    let removed = self.admin_queue.remove(id);
    if removed {
      self.updates.publish(Some(id.clone()));
    }
    removed
  }

  pub fn admin_move_up(&mut self, position: usize) -> bool {
    let moved = self.admin_queue.move_up(position);
    if moved {
      self.publish_queue_slot(position - 1);
    }
    moved
  }

  pub fn admin_move_down(&mut self, position: usize) -> bool {
    let moved = self.admin_queue.move_down(position);
    if moved {
      self.publish_queue_slot(position + 1);
    }
    moved
  }

  fn publish_queue_slot(&self, position: usize) {
    self.updates.publish(self.admin_queue.get(position).cloned());
  }

  /// Every known song, in no particular order.
  pub fn songs(&self) -> impl Iterator<Item = &Song> + '_ {
    self.records.values().map(SongRecord::song)
  }
}

//! [`SongRecord`] — the registry's mutable bookkeeping around a [`Song`].
//!
//! Records are only ever mutated through [`SongRegistry`](crate::SongRegistry),
//! which detaches them from the rank index before calling any of the
//! `pub(crate)` mutators here and reattaches them afterwards.

use std::{cmp::Reverse, collections::BTreeMap};

use chrono::{DateTime, Utc};
use jukebox_core::{
  projection::StatefulSong,
  song::{Song, SongId, SongState, Vote},
  user::{Identity, UserId},
};
use serde::{Deserialize, Serialize};

// ─── Rank key ────────────────────────────────────────────────────────────────

/// Ordering snapshot of a record. Lower keys sort first.
///
/// Available songs come before new and banned ones, then higher scores, then
/// fewer plays, then older submissions. `seq` is the insertion sequence and
/// only breaks ties between songs added within the same clock tick.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankKey {
  tier:       u8,
  score:      Reverse<i64>,
  play_count: u64,
  added_on:   DateTime<Utc>,
  seq:        u64,
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct SongRecord {
  song:           Song,
  state:          SongState,
  play_count:     u64,
  votes:          BTreeMap<UserId, Vote>,
  /// Always equal to the sum of `votes`.
  #[serde(skip_serializing)]
  vote_score:     i64,
  added_by:       Option<UserId>,
  added_on:       DateTime<Utc>,
  last_play_date: Option<DateTime<Utc>>,
  seq:            u64,
}

/// Persisted shape of a record. The cached score is not trusted from disk.
#[derive(Deserialize)]
struct RawRecord {
  song:           Song,
  state:          SongState,
  play_count:     u64,
  #[serde(default)]
  votes:          BTreeMap<UserId, Vote>,
  added_by:       Option<UserId>,
  added_on:       DateTime<Utc>,
  last_play_date: Option<DateTime<Utc>>,
  #[serde(default)]
  seq:            u64,
}

impl From<RawRecord> for SongRecord {
  fn from(raw: RawRecord) -> Self {
    let vote_score = raw.votes.values().map(|v| v.value()).sum();
    Self {
      song: raw.song,
      state: raw.state,
      play_count: raw.play_count,
      votes: raw.votes,
      vote_score,
      added_by: raw.added_by,
      added_on: raw.added_on,
      last_play_date: raw.last_play_date,
      seq: raw.seq,
    }
  }
}

impl SongRecord {
  pub(crate) fn new(
    song: Song,
    state: SongState,
    added_by: Option<UserId>,
    added_on: DateTime<Utc>,
    seq: u64,
  ) -> Self {
    Self {
      song,
      state,
      play_count: 0,
      votes: BTreeMap::new(),
      vote_score: 0,
      added_by,
      added_on,
      last_play_date: None,
      seq,
    }
  }

  pub fn id(&self) -> &SongId { &self.song.id }

  pub fn song(&self) -> &Song { &self.song }

  pub fn state(&self) -> SongState { self.state }

  pub fn play_count(&self) -> u64 { self.play_count }

  pub fn vote_score(&self) -> i64 { self.vote_score }

  pub fn vote_of(&self, user: &UserId) -> Option<Vote> {
    self.votes.get(user).copied()
  }

  pub fn votes(&self) -> impl Iterator<Item = (&UserId, Vote)> {
    self.votes.iter().map(|(u, v)| (u, *v))
  }

  pub fn added_by(&self) -> Option<&UserId> { self.added_by.as_ref() }

  pub fn added_on(&self) -> DateTime<Utc> { self.added_on }

  pub fn last_play_date(&self) -> Option<DateTime<Utc>> { self.last_play_date }

  pub(crate) fn seq(&self) -> u64 { self.seq }

  pub fn rank_key(&self) -> RankKey {
    RankKey {
      tier:       if self.state == SongState::Available { 0 } else { 1 },
      score:      Reverse(self.vote_score),
      play_count: self.play_count,
      added_on:   self.added_on,
      seq:        self.seq,
    }
  }

  // ── Mutators ──────────────────────────────────────────────────────────

  /// `new → available` when the song does not need an operator's review.
  /// Returns whether the transition happened.
  pub(crate) fn auto_accept(&mut self) -> bool {
    if self.state == SongState::New && !self.song.review_required() {
      self.state = SongState::Available;
      return true;
    }
    false
  }

  pub(crate) fn set_state(&mut self, state: SongState) { self.state = state; }

  /// Set or remove `user`'s vote, keeping the cached score in sync.
  pub(crate) fn set_vote(&mut self, user: &UserId, vote: Option<Vote>) {
    let previous = match vote {
      Some(vote) => self.votes.insert(user.clone(), vote),
      None => self.votes.remove(user),
    };
    self.vote_score -= previous.map_or(0, Vote::value);
    self.vote_score += vote.map_or(0, Vote::value);
  }

  pub(crate) fn clear_votes(&mut self) {
    self.votes.clear();
    self.vote_score = 0;
  }

  pub(crate) fn record_play(&mut self, at: DateTime<Utc>) {
    self.play_count += 1;
    self.last_play_date = Some(at);
  }

  // ── Projection ────────────────────────────────────────────────────────

  pub fn project(
    &self,
    viewer: &impl Identity,
    queue_position: Option<usize>,
  ) -> StatefulSong {
    StatefulSong {
      song: self.song.clone(),
      state: self.state,
      votes: self.vote_score,
      my_vote: viewer.user_id().and_then(|u| self.vote_of(u)),
      play_count: self.play_count,
      added_by: self.added_by.clone(),
      added_on: self.added_on,
      last_play_date: self.last_play_date,
      queue_position,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use jukebox_core::user::{Ability, Anonymous, User};

  use super::*;

  fn record(review_required: bool) -> SongRecord {
    let song = Song::new(SongId::parse("a").unwrap(), "A", "Artist")
      .with_review_required(review_required);
    SongRecord::new(song, SongState::New, None, Utc.timestamp_opt(0, 0).unwrap(), 0)
  }

  #[test]
  fn set_vote_keeps_score_in_sync() {
    let mut r = record(false);
    let (u1, u2) = (UserId::new("u1"), UserId::new("u2"));

    r.set_vote(&u1, Some(Vote::Up));
    r.set_vote(&u2, Some(Vote::Down));
    assert_eq!(r.vote_score(), 0);

    r.set_vote(&u2, Some(Vote::Up));
    assert_eq!(r.vote_score(), 2);

    r.set_vote(&u1, None);
    r.set_vote(&u1, None);
    assert_eq!(r.vote_score(), 1);
    assert_eq!(r.votes().count(), 1);
  }

  #[test]
  fn auto_accept_respects_review_flag() {
    let mut free = record(false);
    assert!(free.auto_accept());
    assert_eq!(free.state(), SongState::Available);
    assert!(!free.auto_accept());

    let mut reviewed = record(true);
    assert!(!reviewed.auto_accept());
    assert_eq!(reviewed.state(), SongState::New);
  }

  #[test]
  fn rank_key_orders_available_first_then_score() {
    let mut available = record(false);
    available.set_state(SongState::Available);
    let mut popular_new = record(false);
    popular_new.set_vote(&UserId::new("u"), Some(Vote::Up));
    assert!(available.rank_key() < popular_new.rank_key());

    let mut voted = available.clone();
    voted.set_vote(&UserId::new("u"), Some(Vote::Up));
    assert!(voted.rank_key() < available.rank_key());

    let mut played = available.clone();
    played.record_play(Utc::now());
    assert!(available.rank_key() < played.rank_key());
  }

  #[test]
  fn projection_is_viewer_scoped() {
    let mut r = record(false);
    let user = User::new("u1", [Ability::UpVote]);
    r.set_vote(&user.id, Some(Vote::Down));

    assert_eq!(r.project(&user, None).my_vote, Some(Vote::Down));
    assert_eq!(r.project(&Anonymous, None).my_vote, None);
    assert_eq!(r.project(&Anonymous, Some(3)).queue_position, Some(3));
  }

  #[test]
  fn deserialization_recomputes_score() {
    let mut r = record(false);
    r.set_vote(&UserId::new("u1"), Some(Vote::Up));
    r.set_vote(&UserId::new("u2"), Some(Vote::Up));

    let json = serde_json::to_value(&r).unwrap();
    assert!(json.get("vote_score").is_none());
    let back: SongRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back.vote_score(), 2);
  }
}

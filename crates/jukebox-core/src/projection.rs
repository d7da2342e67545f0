//! Read models handed out by the registry.
//!
//! Projections are computed on read and never stored. They are scoped to a
//! caller: `my_vote` is the caller's own vote, and anonymous callers always
//! see `None` there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  song::{Song, SongState, Vote},
  user::UserId,
};

/// A caller-scoped view of a song and its registry bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatefulSong {
  pub song:           Song,
  pub state:          SongState,
  /// Sum of all votes currently held.
  pub votes:          i64,
  /// The requesting caller's own vote, if any.
  pub my_vote:        Option<Vote>,
  pub play_count:     u64,
  pub added_by:       Option<UserId>,
  pub added_on:       DateTime<Utc>,
  pub last_play_date: Option<DateTime<Utc>>,
  /// Position in the admin queue; only set by queue listings.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub queue_position: Option<usize>,
}

/// One page of the full, rank-ordered library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongPage {
  pub songs:    Vec<StatefulSong>,
  /// `false` once the last visible song has been delivered.
  pub has_more: bool,
}

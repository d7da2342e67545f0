//! Caller identity and capabilities.
//!
//! The registry never authenticates anyone. It receives an [`Identity`] from
//! whatever authorization layer sits in front of it and only asks two
//! questions: who is this (for vote bookkeeping) and what may they see.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::song::SongState;

/// Opaque user identifier, as handed out by the authorization provider.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Something a caller is allowed to do.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Ability {
  Search,
  Accept,
  UpVote,
  DownVote,
  Ban,
  AdminQueue,
  /// See songs that are not `available` (new and banned ones).
  SeeHidden,
}

/// The capability surface the registry needs from a caller.
pub trait Identity {
  /// `None` for anonymous viewers; they can never hold a vote.
  fn user_id(&self) -> Option<&UserId>;

  fn can(&self, ability: Ability) -> bool;

  /// Whether this caller may see a song in `state` in ordinary listings.
  fn can_see(&self, state: SongState) -> bool {
    state == SongState::Available || self.can(Ability::SeeHidden)
  }

  /// Whether this caller may see a song in `state` that an operator put in the
  /// admin queue, when listing the queue. Queued songs are shown to everyone
  /// whatever their state, since they will play next.
  fn can_see_queued(&self, _state: SongState) -> bool { true }
}

/// A known user with an explicit set of abilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:        UserId,
  pub abilities: BTreeSet<Ability>,
}

impl User {
  pub fn new(
    id: impl Into<String>,
    abilities: impl IntoIterator<Item = Ability>,
  ) -> Self {
    Self {
      id:        UserId::new(id),
      abilities: abilities.into_iter().collect(),
    }
  }

  /// A user holding every ability.
  pub fn admin(id: impl Into<String>) -> Self {
    use strum::IntoEnumIterator as _;
    Self::new(id, Ability::iter())
  }
}

impl Identity for User {
  fn user_id(&self) -> Option<&UserId> { Some(&self.id) }

  fn can(&self, ability: Ability) -> bool { self.abilities.contains(&ability) }
}

/// The viewer used for public displays (e.g. the now-playing banner).
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Identity for Anonymous {
  fn user_id(&self) -> Option<&UserId> { None }

  fn can(&self, _: Ability) -> bool { false }
}

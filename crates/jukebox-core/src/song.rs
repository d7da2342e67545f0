//! Song types — the externally supplied, immutable unit the registry ranks.
//!
//! A [`Song`] arrives from a resolver (a search backend, a bulk import) and is
//! never modified afterwards. All mutable bookkeeping (votes, plays, state)
//! lives in the registry's own records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Opaque song identifier, e.g. `youtube:dQw4w9WgXcQ`.
///
/// Guaranteed non-empty and free of surrounding whitespace.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct SongId(String);

impl SongId {
  pub fn parse(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    if raw.is_empty() || raw.trim() != raw {
      return Err(Error::InvalidId(raw));
    }
    Ok(Self(raw))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for SongId {
  type Error = Error;

  fn try_from(raw: String) -> Result<Self> { Self::parse(raw) }
}

impl From<SongId> for String {
  fn from(id: SongId) -> Self { id.0 }
}

impl fmt::Display for SongId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Song ────────────────────────────────────────────────────────────────────

/// Metadata for a playable song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
  pub id:              SongId,
  pub title:           String,
  pub artist:          String,
  #[serde(default)]
  pub album:           Option<String>,
  /// Track length in seconds, when the resolver knows it.
  #[serde(default)]
  pub duration:        Option<f64>,
  /// Songs from untrusted sources must be accepted by an operator before
  /// votes can make them available.
  #[serde(default)]
  pub review_required: bool,
}

impl Song {
  pub fn new(
    id: SongId,
    title: impl Into<String>,
    artist: impl Into<String>,
  ) -> Self {
    Self {
      id,
      title: title.into(),
      artist: artist.into(),
      album: None,
      duration: None,
      review_required: false,
    }
  }

  pub fn with_review_required(mut self, review_required: bool) -> Self {
    self.review_required = review_required;
    self
  }

  pub fn review_required(&self) -> bool { self.review_required }

  /// Check the fields the registry relies on.
  ///
  /// A song that fails here indicates an integration bug in whatever produced
  /// it, not a routine runtime condition.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::InvalidSong(format!("{}: missing title", self.id)));
    }
    if let Some(duration) = self.duration
      && !(duration.is_finite() && duration >= 0.0)
    {
      return Err(Error::InvalidSong(format!(
        "{}: invalid duration {duration}",
        self.id
      )));
    }
    Ok(())
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Review state of a song inside the registry.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SongState {
  New,
  Available,
  Banned,
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// A single user's opinion of a song. The absence of a vote is represented by
/// the absence of the entry, never by a zero variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
  Up,
  Down,
}

impl Vote {
  pub fn value(self) -> i64 {
    match self {
      Self::Up => 1,
      Self::Down => -1,
    }
  }
}

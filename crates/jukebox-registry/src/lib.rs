//! In-memory song ranking and voting registry.
//!
//! [`SongRegistry`] owns every known song, its votes and review state, and
//! keeps a rank-ordered index for listings and playback selection.
//! [`Jukebox`] wraps it behind a single async mutex together with a
//! [`SongSearch`](jukebox_core::search::SongSearch) collaborator.

mod admin_queue;
mod index;
mod record;
mod snapshot;

pub mod error;
pub mod jukebox;
pub mod memory_search;
pub mod notify;
pub mod registry;

pub use error::{Error, Result};
pub use jukebox::Jukebox;
pub use memory_search::MemorySearch;
pub use notify::SongUpdates;
pub use record::{RankKey, SongRecord};
pub use registry::SongRegistry;

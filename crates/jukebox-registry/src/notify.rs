//! Single-slot "song changed" signal.
//!
//! Built on [`tokio::sync::watch`]: the slot holds only the most recent
//! notification, publishing never blocks, and a consumer that falls behind
//! sees one coalesced change instead of a backlog.

use jukebox_core::song::SongId;
use tokio::sync::watch;

/// What changed. `None` means "everything", e.g. after a state load.
pub type SongUpdate = Option<SongId>;

/// Receiving end handed to presentation layers.
pub type SongUpdates = watch::Receiver<SongUpdate>;

#[derive(Debug)]
pub(crate) struct UpdateSignal {
  tx: watch::Sender<SongUpdate>,
}

impl UpdateSignal {
  pub fn new() -> Self {
    let (tx, _) = watch::channel(None);
    Self { tx }
  }

  /// Overwrite any undelivered notification. Works with zero subscribers.
  pub fn publish(&self, update: SongUpdate) { self.tx.send_replace(update); }

  pub fn subscribe(&self) -> SongUpdates { self.tx.subscribe() }
}

//! Whole-registry persistence.
//!
//! A snapshot is a JSON document holding every record and the admin-queue id
//! order. Loading is all-or-nothing: the registry is only replaced once the
//! whole snapshot has been validated. Callers must not run mutations while a
//! dump or load is in progress.

use std::{
  collections::HashMap,
  io::{Read, Write},
};

use jukebox_core::song::SongId;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result, SongRegistry, admin_queue::AdminQueue, index::RankIndex,
  record::SongRecord,
};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
  version:     u32,
  next_seq:    u64,
  songs:       Vec<&'a SongRecord>,
  admin_queue: &'a [SongId],
}

#[derive(Deserialize)]
struct Snapshot {
  version:     u32,
  #[serde(default)]
  next_seq:    u64,
  songs:       Vec<SongRecord>,
  #[serde(default)]
  admin_queue: Vec<SongId>,
}

impl SongRegistry {
  /// Serialize every record and the admin queue to `writer`.
  pub fn dump_state(&self, writer: impl Write) -> Result<()> {
    let mut songs: Vec<&SongRecord> = self.records.values().collect();
    songs.sort_by_key(|r| r.seq());

    let snapshot = SnapshotRef {
      version: SNAPSHOT_VERSION,
      next_seq: self.next_seq,
      songs,
      admin_queue: self.admin_queue.ids(),
    };
    serde_json::to_writer(writer, &snapshot)?;
    tracing::info!(
      songs = self.records.len(),
      queued = self.admin_queue.ids().len(),
      "dumped registry state"
    );
    Ok(())
  }

  /// Replace the registry's contents with the snapshot read from `reader`.
  ///
  /// On error the registry is left untouched.
  pub fn load_state(&mut self, reader: impl Read) -> Result<()> {
    let snapshot: Snapshot = serde_json::from_reader(reader)?;
    if snapshot.version != SNAPSHOT_VERSION {
      return Err(Error::CorruptSnapshot(format!(
        "unsupported snapshot version {}",
        snapshot.version
      )));
    }

    let mut records = HashMap::with_capacity(snapshot.songs.len());
    let mut index = RankIndex::default();
    let mut next_seq = snapshot.next_seq;
    for record in snapshot.songs {
      let id = record.id().clone();
      record
        .song()
        .validate()
        .map_err(|e| Error::CorruptSnapshot(e.to_string()))?;
      let after = record.seq().checked_add(1).ok_or_else(|| {
        Error::CorruptSnapshot(format!("song {id} has sequence {}", u64::MAX))
      })?;
      next_seq = next_seq.max(after);
      index.insert(record.rank_key(), id.clone());
      if records.insert(id.clone(), record).is_some() {
        return Err(Error::CorruptSnapshot(format!("duplicate song {id}")));
      }
    }

    let mut queued = Vec::with_capacity(snapshot.admin_queue.len());
    for id in snapshot.admin_queue {
      if !records.contains_key(&id) {
        return Err(Error::CorruptSnapshot(format!(
          "admin queue references unknown song {id}"
        )));
      }
      if queued.contains(&id) {
        return Err(Error::CorruptSnapshot(format!(
          "song {id} queued twice"
        )));
      }
      queued.push(id);
    }

    tracing::info!(
      songs = records.len(),
      queued = queued.len(),
      "loaded registry state"
    );
    self.records = records;
    self.index = index;
    self.admin_queue = AdminQueue::from_ids(queued);
    self.next_seq = next_seq;
    self.updates.publish(None);
    Ok(())
  }
}

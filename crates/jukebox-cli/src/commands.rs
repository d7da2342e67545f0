//! Subcommands and their dispatch onto the registry.
//!
//! Every command is gated on the caller's abilities before the registry is
//! touched. Results are printed to stdout as JSON, one document per line.

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::Subcommand;
use jukebox_core::{
  search::SongSearch,
  song::{Song, SongId, SongState},
  user::{Ability, Identity, User},
};
use jukebox_registry::Jukebox;
use serde::Serialize;

use crate::settings::Settings;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Submit a song.
  Add {
    id:       String,
    title:    String,
    artist:   String,
    #[arg(long)]
    album:    Option<String>,
    /// Length in seconds.
    #[arg(long)]
    duration: Option<f64>,
    /// Require an operator to accept the song before votes make it playable.
    #[arg(long)]
    review:   bool,
    /// Skip review entirely and make the song available right away.
    #[arg(long)]
    available: bool,
  },
  /// Bulk-import pre-approved songs from a JSON array.
  Import { file: PathBuf },
  Upvote { id: String },
  Downvote { id: String },
  /// Withdraw your vote.
  Unvote { id: String },
  Accept { id: String },
  Ban { id: String },
  Unban { id: String },
  /// Record that a song started playing.
  Played { id: String },
  /// Show one song.
  Show { id: String },
  /// Page through the whole library in rank order.
  List {
    #[arg(long, default_value_t = 0)]
    offset: usize,
  },
  /// Show the upcoming queue.
  Queue,
  /// Show the next song to play.
  Next,
  Search { query: Vec<String> },
  /// Put a song in the admin queue.
  Enqueue {
    id:       String,
    #[arg(long)]
    position: Option<usize>,
  },
  Dequeue { id: String },
  MoveUp { position: usize },
  MoveDown { position: usize },
}

impl Command {
  /// The ability a caller needs to run this command, if any.
  fn required_ability(&self) -> Option<Ability> {
    match self {
      Self::Add { available: true, .. } | Self::Import { .. } => {
        Some(Ability::Accept)
      }
      Self::Add { .. } | Self::Search { .. } | Self::List { .. } => {
        Some(Ability::Search)
      }
      Self::Upvote { .. } => Some(Ability::UpVote),
      Self::Downvote { .. } => Some(Ability::DownVote),
      Self::Accept { .. } => Some(Ability::Accept),
      Self::Ban { .. } | Self::Unban { .. } => Some(Ability::Ban),
      Self::Played { .. }
      | Self::Enqueue { .. }
      | Self::Dequeue { .. }
      | Self::MoveUp { .. }
      | Self::MoveDown { .. } => Some(Ability::AdminQueue),
      Self::Unvote { .. }
      | Self::Show { .. }
      | Self::Queue
      | Self::Next => None,
    }
  }
}

fn emit(value: &impl Serialize) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string(value)?);
  Ok(())
}

fn song_id(raw: String) -> anyhow::Result<SongId> {
  SongId::parse(raw).context("invalid song id")
}

pub async fn run<S: SongSearch>(
  jukebox: &Jukebox<S>,
  settings: &Settings,
  user: &User,
  command: Command,
) -> anyhow::Result<()> {
  if let Some(ability) = command.required_ability()
    && !user.can(ability)
  {
    bail!("user {} lacks the {ability} ability", user.id);
  }
  // Withdrawing a vote needs the right to cast one.
  if matches!(command, Command::Unvote { .. })
    && !(user.can(Ability::UpVote) || user.can(Ability::DownVote))
  {
    bail!("user {} may not vote", user.id);
  }

  tracing::debug!(user = %user.id, ?command, "running command");
  match command {
    Command::Add { id, title, artist, album, duration, review, available } => {
      let mut song = Song::new(song_id(id)?, title, artist)
        .with_review_required(review);
      song.album = album;
      song.duration = duration;
      let state = if available { SongState::Available } else { SongState::New };
      emit(&jukebox.add(song, user, state).await?)
    }
    Command::Import { file } => {
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading {}", file.display()))?;
      let songs: Vec<Song> =
        serde_json::from_str(&raw).context("parsing song list")?;
      let mut imported = 0usize;
      for song in songs {
        jukebox.add(song, user, SongState::Available).await?;
        imported += 1;
      }
      tracing::info!(imported, "imported songs");
      emit(&imported)
    }
    Command::Upvote { id } => {
      emit(&jukebox.registry().await.upvote(&song_id(id)?, user))
    }
    Command::Downvote { id } => {
      emit(&jukebox.registry().await.downvote(&song_id(id)?, user))
    }
    Command::Unvote { id } => {
      emit(&jukebox.registry().await.unvote(&song_id(id)?, user))
    }
    Command::Accept { id } => {
      emit(&jukebox.registry().await.accept(&song_id(id)?, user))
    }
    Command::Ban { id } => {
      emit(&jukebox.registry().await.ban(&song_id(id)?, user))
    }
    Command::Unban { id } => {
      emit(&jukebox.registry().await.unban(&song_id(id)?, user))
    }
    Command::Played { id } => {
      emit(&jukebox.registry().await.mark_played(&song_id(id)?))
    }
    Command::Show { id } => {
      emit(&jukebox.registry().await.for_user_display(&song_id(id)?, user))
    }
    Command::List { offset } => emit(
      &jukebox
        .registry()
        .await
        .all_songs(settings.library_page_size, offset, user),
    ),
    Command::Queue => {
      emit(&jukebox.registry().await.top_songs(settings.queue_size, user))
    }
    Command::Next => emit(&jukebox.registry().await.top_song()),
    Command::Search { query } => {
      let query = query.join(" ");
      emit(&jukebox.search(&query, settings.search_count, user).await?)
    }
    Command::Enqueue { id, position } => {
      jukebox.registry().await.admin_enqueue(&song_id(id)?, position);
      emit(&jukebox.registry().await.admin_queue())
    }
    Command::Dequeue { id } => {
      emit(&jukebox.registry().await.admin_dequeue(&song_id(id)?))
    }
    Command::MoveUp { position } => {
      emit(&jukebox.registry().await.admin_move_up(position))
    }
    Command::MoveDown { position } => {
      emit(&jukebox.registry().await.admin_move_down(position))
    }
  }
}

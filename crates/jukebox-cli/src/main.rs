//! `jukebox` — drive a song registry from the command line.
//!
//! Reads `jukebox.toml` (or the path given with `--config`), restores the
//! registry from its state file, runs one command as the given user, and
//! writes the state back if anything changed.
//!
//! # Usage
//!
//! ```text
//! jukebox --user alice add yt:dQw4w9WgXcQ "Never Gonna Give You Up" "Rick Astley"
//! jukebox --user alice upvote yt:dQw4w9WgXcQ
//! jukebox --user dj enqueue yt:dQw4w9WgXcQ --position 0
//! jukebox --user bob queue
//! ```

mod commands;
mod settings;

use std::{
  fs::File,
  io::{BufReader, BufWriter, Write as _},
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::Parser;
use jukebox_core::search::SongSearch;
use jukebox_registry::{Jukebox, MemorySearch, SongRegistry};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::Command;
use settings::Settings;

#[derive(Parser)]
#[command(author, version, about = "Shared jukebox queue")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "jukebox.toml")]
  config: PathBuf,

  /// Identity to act as.
  #[arg(short, long, env = "JUKEBOX_USER")]
  user: String,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries command output.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let state_path = settings.state_path();

  let mut registry = SongRegistry::new();
  if state_path.exists() {
    let file = File::open(&state_path)
      .with_context(|| format!("failed to open {}", state_path.display()))?;
    registry
      .load_state(BufReader::new(file))
      .with_context(|| format!("failed to load {}", state_path.display()))?;
  }

  let jukebox = Jukebox::new(registry, MemorySearch::new());
  jukebox.reindex().await.context("failed to build search index")?;
  let updates = jukebox.subscribe().await;

  let user = settings.user(&cli.user);
  commands::run(&jukebox, &settings, &user, cli.command).await?;

  if updates.has_changed().unwrap_or(false) {
    save_state(&jukebox, &state_path).await?;
  }
  Ok(())
}

/// Write the snapshot next to `path` and rename it into place.
async fn save_state<S: SongSearch>(
  jukebox: &Jukebox<S>,
  path: &Path,
) -> anyhow::Result<()> {
  let tmp = path.with_extension("tmp");
  {
    let file = File::create(&tmp)
      .with_context(|| format!("failed to create {}", tmp.display()))?;
    let mut writer = BufWriter::new(file);
    jukebox
      .registry()
      .await
      .dump_state(&mut writer)
      .context("failed to dump state")?;
    writer.flush()?;
  }
  std::fs::rename(&tmp, path)
    .with_context(|| format!("failed to replace {}", path.display()))?;
  Ok(())
}

//! Runtime settings, read from `jukebox.toml` and `JUKEBOX_*` variables.

use std::{
  collections::{BTreeSet, HashMap},
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use jukebox_core::user::{Ability, User};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub state_file:        PathBuf,
  pub library_page_size: usize,
  pub queue_size:        usize,
  pub search_count:      usize,
  /// Abilities of users that have no entry in `users`.
  pub default_abilities: BTreeSet<Ability>,
  pub users:             HashMap<String, BTreeSet<Ability>>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      state_file:        PathBuf::from("jukebox-state.json"),
      library_page_size: 50,
      queue_size:        20,
      search_count:      30,
      default_abilities: BTreeSet::from([
        Ability::Search,
        Ability::UpVote,
        Ability::DownVote,
      ]),
      users:             HashMap::new(),
    }
  }
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("JUKEBOX"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  pub fn user(&self, id: &str) -> User {
    let abilities = self
      .users
      .get(id)
      .unwrap_or(&self.default_abilities)
      .iter()
      .copied();
    User::new(id, abilities)
  }

  /// The state file path with a leading `~` expanded.
  pub fn state_path(&self) -> PathBuf { expand_tilde(&self.state_file) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use jukebox_core::user::Identity;

  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let settings = Settings::load(Path::new("/nonexistent/jukebox.toml")).unwrap();
    assert_eq!(settings.library_page_size, 50);
    assert_eq!(settings.queue_size, 20);
    assert_eq!(settings.search_count, 30);
  }

  #[test]
  fn configured_users_get_their_abilities() {
    let mut settings = Settings::default();
    settings
      .users
      .insert("dj".into(), BTreeSet::from([Ability::AdminQueue, Ability::Ban]));

    let dj = settings.user("dj");
    assert!(dj.can(Ability::Ban));
    assert!(!dj.can(Ability::UpVote));

    let guest = settings.user("guest");
    assert!(guest.can(Ability::UpVote));
    assert!(!guest.can(Ability::Ban));
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/state.json")),
      PathBuf::from(home).join("state.json")
    );
    assert_eq!(expand_tilde(Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
  }
}

//! Core types and trait definitions for the jukebox song registry.
//!
//! No runtime, storage, or I/O lives here. The registry crate and the CLI
//! depend on it.

pub mod error;
pub mod projection;
pub mod search;
pub mod song;
pub mod user;

pub use error::{Error, Result};

//! Turret Settings CLI
//!
//! Operator tooling around [`turret_core::SettingsSession`]: a JSON file
//! backend standing in for the settings database, plus the commands the
//! `turret-settings` binary exposes.
//!
//! # Core Concepts
//!
//! - [`JsonFileBackend`]: owners, zones, models and values in one JSON file
//! - [`Edit`]: `--set key=value`, `--on key` and `--off key` edits
//! - [`commands`]: `groups`, `render`, `apply`, `save` and `check-schema`
//!
//! # Example
//!
//! ```rust
//! use turret_cli::Edit;
//!
//! let edit: Edit = "maxVolume=70".parse().unwrap();
//! assert_eq!(edit.key(), "maxVolume");
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod backend;
pub mod commands;
mod edits;
pub mod logging;

pub use backend::{BackendData, JsonFileBackend, LinkedOwner, OwnerRecord, StoredValue};
pub use commands::SessionArgs;
pub use edits::{form_state, Edit};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

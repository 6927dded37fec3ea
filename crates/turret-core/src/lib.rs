//! Turret Settings Core
//!
//! Editing sessions over a subject's settings: loading values and the
//! owners they inherit from, reconciling submitted forms, and committing.
//!
//! # Core Concepts
//!
//! - [`SettingsSession`]: explicit per-subject context; open, render, apply, save, refresh
//! - [`ValueStore`]: the subject's values with soft deletion and minimal diffs
//! - [`Reconciler`]: turns form state into store changes, driven by a [`ReconcileTrigger`]
//! - [`ValuePersistence`], [`OwnershipProvider`], [`IdGenerator`]: external collaborators
//! - [`CommitObserver`]: post-commit hooks (device files, global configuration)
//!
//! # Example
//!
//! ```rust
//! use turret_core::{LoadedValues, ReconcileTrigger, Reconciler, UlidGenerator, ValueStore};
//! use turret_form::FormState;
//! use turret_model::{OwnerId, SettingCategory};
//! use turret_schema::{SchemaSetting, SettingType};
//!
//! let settings = vec![SchemaSetting::new("1", "maxVolume", SettingType::Text, "50")];
//! let mut store = ValueStore::from_loaded(
//!     OwnerId::new("P1"),
//!     SettingCategory::TerminalProfile,
//!     LoadedValues::default(),
//! );
//!
//! let mut state = FormState::new();
//! state.enable("maxVolume", "");
//! let ids = UlidGenerator::new();
//! let diff = Reconciler::new(&ids).apply(
//!     &settings,
//!     &state,
//!     &ReconcileTrigger::enabled("1"),
//!     &mut store,
//! );
//!
//! assert_eq!(diff.adds().len(), 1);
//! assert_eq!(store.find_by_key("maxVolume").unwrap().value(), "50");
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod collaborators;
mod config;
mod error;
mod reconciler;
mod session;
mod store;

pub use collaborators::{
    AttachedProfile, CommitEvent, CommitObserver, IdGenerator, LoadedValues, LoggingObserver,
    OwnershipProvider, UlidGenerator, ValuePersistence,
};
pub use config::{ConfigError, EditorConfig, SubjectOptions};
pub use error::{EditorError, PersistenceError};
pub use reconciler::{ReconcileTrigger, Reconciler};
pub use session::{Collaborators, SaveOutcome, SettingsSession, Subject};
pub use store::{CommitReceipt, ValueStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

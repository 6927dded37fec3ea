//! Turret Settings Schema
//!
//! Loading and querying of the setting schema documents that drive the
//! settings editor.
//!
//! # Core Concepts
//!
//! - [`Schema`]: `categories → groups → settings` as declared by a document
//! - [`SchemaSetting`]: type, defaults, validators and descriptions of one key
//! - [`SchemaStore`]: resolves a document name to a cached, parsed [`Schema`]
//! - [`SchemaParser`]: XML and JSON formats, selected by extension
//!
//! # Example
//!
//! ```rust
//! use turret_schema::{SchemaLoader, SchemaStore, SettingType};
//!
//! let mut store = SchemaStore::in_memory();
//! store.register_document(
//!     "SettingsTerminal.xml",
//!     r#"<categories><category name="profile"><groups><group name="Audio"><settings>
//!          <setting id="1" name="maxVolume" type="tb" default_value="50" basic_level="Y"/>
//!        </settings></group></groups></category></categories>"#,
//! );
//!
//! let schema = store.load_schema("SettingsTerminal.xml").unwrap();
//! let group = schema.find_category("profile").unwrap().find_group("Audio").unwrap();
//! let settings = group.list_settings(true);
//! assert_eq!(settings[0].setting_type, SettingType::Text);
//! assert_eq!(settings[0].disabled_default(), "50");
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod cache;
mod error;
mod model;
mod parsers;
mod store;

pub use cache::{CacheStats, Fingerprint, SchemaCache};
pub use error::SchemaError;
pub use model::{
    Choice, Schema, SchemaCategory, SchemaGroup, SchemaSetting, SettingType, ViewMode,
};
pub use parsers::{default_parsers, JsonSchemaParser, ParserRegistry, SchemaParser, XmlSchemaParser};
pub use store::{SchemaLoader, SchemaStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

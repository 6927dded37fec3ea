//! Editor configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use turret_inherit::LinkTemplates;

/// Configuration could not be read
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Not valid TOML or wrong shape
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings shared by every editing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory holding the schema documents
    pub schema_dir: PathBuf,
    /// Name of the fallback zone
    pub system_zone_name: String,
    /// Application that marks a shared profile as a TPO profile
    pub tpo_application_name: String,
    /// Start in the basic view
    pub basic_level: bool,
    /// Max schema documents kept parsed
    pub schema_cache_capacity: u64,
    /// Deep-link templates for the inherited column
    pub links: LinkTemplates,
}

impl EditorConfig {
    /// Create with default values
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set schema directory
    #[inline]
    #[must_use]
    pub fn with_schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = dir.into();
        self
    }

    /// Set system zone name
    #[inline]
    #[must_use]
    pub fn with_system_zone_name(mut self, name: impl Into<String>) -> Self {
        self.system_zone_name = name.into();
        self
    }

    /// Set TPO application name
    #[inline]
    #[must_use]
    pub fn with_tpo_application_name(mut self, name: impl Into<String>) -> Self {
        self.tpo_application_name = name.into();
        self
    }

    /// Set initial view
    #[inline]
    #[must_use]
    pub fn with_basic_level(mut self, basic_level: bool) -> Self {
        self.basic_level = basic_level;
        self
    }

    /// Set schema cache capacity
    #[inline]
    #[must_use]
    pub fn with_schema_cache_capacity(mut self, capacity: u64) -> Self {
        self.schema_cache_capacity = capacity;
        self
    }

    /// Set link templates
    #[inline]
    #[must_use]
    pub fn with_links(mut self, links: LinkTemplates) -> Self {
        self.links = links;
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schemas"),
            system_zone_name: "System".to_string(),
            tpo_application_name: "TPO".to_string(),
            basic_level: true,
            schema_cache_capacity: 16,
            links: LinkTemplates::default(),
        }
    }
}

/// How one subject is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectOptions {
    /// Subject is itself a shared profile
    pub shared_profile: bool,
    /// Show what the subject inherits
    pub display_inherited: bool,
    /// Ask for the global configuration to be rebuilt after saving
    pub reconstruct_global_config: bool,
    /// Caller passed the permission check for saving
    pub can_save: bool,
}

impl SubjectOptions {
    /// Create with default values
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark as shared profile or not
    #[inline]
    #[must_use]
    pub fn with_shared_profile(mut self, shared: bool) -> Self {
        self.shared_profile = shared;
        self
    }

    /// Request the inherited column
    #[inline]
    #[must_use]
    pub fn with_display_inherited(mut self, display: bool) -> Self {
        self.display_inherited = display;
        self
    }

    /// Request global configuration rebuild on save
    #[inline]
    #[must_use]
    pub fn with_reconstruct_global_config(mut self, reconstruct: bool) -> Self {
        self.reconstruct_global_config = reconstruct;
        self
    }

    /// Grant or deny saving
    #[inline]
    #[must_use]
    pub fn with_can_save(mut self, can_save: bool) -> Self {
        self.can_save = can_save;
        self
    }
}

impl Default for SubjectOptions {
    fn default() -> Self {
        Self {
            shared_profile: true,
            display_inherited: false,
            reconstruct_global_config: false,
            can_save: true,
        }
    }
}

//! Setting categories
//!
//! A [`SettingCategory`] names the kind of subject being edited. It decides
//! three things: which schema document is loaded, which schema category is
//! rendered, and which category the values are stored under (the *merged*
//! category).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of subject whose settings are edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingCategory {
    /// Turret boot settings
    TerminalBoot,
    /// Turret user profile settings
    #[default]
    TerminalProfile,
    /// Netrix boot settings (stored as terminal boot)
    NetrixBoot,
    /// Netrix profile settings (stored as terminal profile)
    NetrixProfile,
    /// TPO boot settings
    TpoBoot,
    /// TPO private profile settings
    TpoPrivate,
    /// TPO shared profile settings
    TpoShared,
}

/// Schema document holding the netrix definitions
pub const NETRIX_DOCUMENT: &str = "SettingsNetrix.xml";
/// Schema document holding the terminal definitions
pub const TERMINAL_DOCUMENT: &str = "SettingsTerminal.xml";
/// Schema document holding the TPO definitions
pub const TPO_DOCUMENT: &str = "SettingsTPO.xml";

impl SettingCategory {
    /// All categories, in declaration order
    pub const ALL: [Self; 7] = [
        Self::TerminalBoot,
        Self::TerminalProfile,
        Self::NetrixBoot,
        Self::NetrixProfile,
        Self::TpoBoot,
        Self::TpoPrivate,
        Self::TpoShared,
    ];

    /// Category used for storage lookups
    ///
    /// Device-family specific categories collapse into the common terminal ones.
    #[inline]
    #[must_use]
    pub fn merged(self) -> Self {
        match self {
            Self::NetrixBoot => Self::TerminalBoot,
            Self::NetrixProfile => Self::TerminalProfile,
            other => other,
        }
    }

    /// Name of the `<category>` rendered from the schema document
    #[inline]
    #[must_use]
    pub fn schema_category_name(self) -> &'static str {
        match self {
            Self::TerminalBoot | Self::TpoBoot | Self::NetrixBoot => "boot",
            Self::TerminalProfile | Self::NetrixProfile => "profile",
            Self::TpoPrivate => "private",
            Self::TpoShared => "shared",
        }
    }

    /// Schema document that defines this category
    #[inline]
    #[must_use]
    pub fn document_name(self) -> &'static str {
        match self {
            Self::NetrixBoot | Self::NetrixProfile => NETRIX_DOCUMENT,
            Self::TerminalBoot | Self::TerminalProfile => TERMINAL_DOCUMENT,
            Self::TpoBoot | Self::TpoPrivate | Self::TpoShared => TPO_DOCUMENT,
        }
    }

    /// Whether this is one of the trading-application categories
    #[inline]
    #[must_use]
    pub fn is_tpo(self) -> bool {
        matches!(self, Self::TpoBoot | Self::TpoPrivate | Self::TpoShared)
    }

    /// Whether the rendered schema category is `boot`
    #[inline]
    #[must_use]
    pub fn is_boot(self) -> bool {
        self.schema_category_name() == "boot"
    }

    /// Stable snake_case name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TerminalBoot => "terminal_boot",
            Self::TerminalProfile => "terminal_profile",
            Self::NetrixBoot => "netrix_boot",
            Self::NetrixProfile => "netrix_profile",
            Self::TpoBoot => "tpo_boot",
            Self::TpoPrivate => "tpo_private",
            Self::TpoShared => "tpo_shared",
        }
    }
}

impl fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a category name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown setting category: '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for SettingCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

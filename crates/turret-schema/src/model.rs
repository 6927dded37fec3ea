//! Schema document model
//!
//! A document is `categories → groups → settings`. Everything here is
//! immutable once parsed and shared behind an `Arc` by the store.

use crate::error::SchemaError;
use serde::Serialize;
use std::fmt;

/// Control type a setting is edited with
///
/// Closed set: adding a type means adding a variant and handling it
/// wherever the renderer matches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    /// Free text (`tb`)
    Text,
    /// Masked text (`pw`)
    Password,
    /// Single-select radio list (`rb`)
    Radio,
    /// True/false radio pair (`bl`)
    Boolean,
    /// Drop-down list (`dd`)
    Dropdown,
}

impl SettingType {
    /// Parse the schema's type code
    pub fn from_code(key: &str, code: &str) -> Result<Self, SchemaError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "tb" => Ok(Self::Text),
            "pw" => Ok(Self::Password),
            "rb" => Ok(Self::Radio),
            "bl" => Ok(Self::Boolean),
            "dd" => Ok(Self::Dropdown),
            _ => Err(SchemaError::UnknownSettingType {
                key: key.to_string(),
                code: code.to_string(),
            }),
        }
    }

    /// Type code as written in schema documents
    #[inline]
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Text => "tb",
            Self::Password => "pw",
            Self::Radio => "rb",
            Self::Boolean => "bl",
            Self::Dropdown => "dd",
        }
    }

    /// Whether the type offers a fixed list of choices
    #[inline]
    #[must_use]
    pub fn has_choices(self) -> bool {
        matches!(self, Self::Radio | Self::Dropdown)
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which settings a group listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Settings flagged `basic_level = Y`
    #[default]
    Basic,
    /// Settings flagged `basic_level = N`
    Expert,
    /// Settings flagged `mandatory = Y`
    Advanced,
}

impl ViewMode {
    /// View matching the boolean basic/expert filter
    #[inline]
    #[must_use]
    pub fn from_basic_level(basic_level: bool) -> Self {
        if basic_level {
            Self::Basic
        } else {
            Self::Expert
        }
    }

    /// Whether a setting belongs in this view
    #[inline]
    #[must_use]
    pub fn includes(self, setting: &SchemaSetting) -> bool {
        match self {
            Self::Basic => setting.basic_level,
            Self::Expert => !setting.basic_level,
            Self::Advanced => setting.mandatory,
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "expert" => Ok(Self::Expert),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!("unknown view mode '{other}'")),
        }
    }
}

/// One selectable item of a radio or drop-down setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Stored value
    pub value: String,
    /// Label, when it differs from the value
    pub text: Option<String>,
}

impl Choice {
    /// Choice whose label is its value
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: None,
        }
    }

    /// Choice with an explicit label
    #[must_use]
    pub fn labeled(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: Some(text.into()),
        }
    }

    /// Label shown to the operator
    #[inline]
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.text.as_deref().unwrap_or(&self.value)
    }
}

/// One setting definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSetting {
    /// Numeric or opaque id from the document
    pub id: String,
    /// Unique key within the document
    pub key: String,
    /// Control type
    pub setting_type: SettingType,
    /// Default shown when the setting is enabled
    pub default_value: String,
    /// Default representation when disabled; falls back to `default_value`
    pub default_value_code: Option<String>,
    /// Listed in the advanced view
    pub mandatory: bool,
    /// Value required while enabled
    pub validator_require: bool,
    /// Raw `min;max;typeCode` encoding
    pub validator_range: Option<String>,
    /// Pattern the whole value must match
    pub validator_regex: Option<String>,
    /// Human readable name
    pub friendly_name: String,
    /// Tooltip text
    pub short_description: String,
    /// Full description
    pub long_description: String,
    /// Description of the accepted values
    pub constraint_description: String,
    /// Keys whose descriptions are shown alongside this one
    pub related_setting_keys: Vec<String>,
    /// Shown in the basic view
    pub basic_level: bool,
    /// Items of a radio or drop-down setting
    pub choices: Vec<Choice>,
}

impl SchemaSetting {
    /// New setting with empty descriptions and no validators
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        setting_type: SettingType,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            setting_type,
            default_value: default_value.into(),
            default_value_code: None,
            mandatory: false,
            validator_require: false,
            validator_range: None,
            validator_regex: None,
            friendly_name: String::new(),
            short_description: String::new(),
            long_description: String::new(),
            constraint_description: String::new(),
            related_setting_keys: Vec::new(),
            basic_level: true,
            choices: Vec::new(),
        }
    }

    /// `default_value_code`, or `default_value` when the document has none
    #[inline]
    #[must_use]
    pub fn default_code(&self) -> &str {
        self.default_value_code
            .as_deref()
            .unwrap_or(&self.default_value)
    }

    /// Value shown while the setting is disabled
    ///
    /// Booleans are compared lower-cased, so the code is lower-cased here.
    #[must_use]
    pub fn disabled_default(&self) -> String {
        match self.setting_type {
            SettingType::Boolean => self.default_code().to_ascii_lowercase(),
            _ => self.default_code().to_string(),
        }
    }

    /// Value a control takes when it becomes enabled
    ///
    /// For booleans this is the negation of the disabled code; a code that
    /// is not `true`/`false` counts as `false`.
    #[must_use]
    pub fn enabled_default(&self) -> String {
        match self.setting_type {
            SettingType::Boolean => {
                let disabled = self.default_code().trim().eq_ignore_ascii_case("true");
                (!disabled).to_string()
            }
            _ => self.default_value.clone(),
        }
    }

    /// Key with spaces and dots replaced, usable in element ids
    #[must_use]
    pub fn key_id(&self) -> String {
        self.key.replace([' ', '.'], "_")
    }

    /// Choice matching a value
    #[must_use]
    pub fn choice(&self, value: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.value == value)
    }
}

/// Named collection of settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaGroup {
    /// Group name
    pub name: String,
    /// Group id
    pub id: String,
    /// Settings in document order
    pub settings: Vec<SchemaSetting>,
}

impl SchemaGroup {
    /// Settings whose `basic_level` flag equals `basic_level`
    #[must_use]
    pub fn list_settings(&self, basic_level: bool) -> Vec<&SchemaSetting> {
        self.list_settings_for(ViewMode::from_basic_level(basic_level))
    }

    /// Settings visible in a view
    #[must_use]
    pub fn list_settings_for(&self, view: ViewMode) -> Vec<&SchemaSetting> {
        self.settings.iter().filter(|s| view.includes(s)).collect()
    }

    /// Setting by id
    #[must_use]
    pub fn find_setting_by_id(&self, id: &str) -> Option<&SchemaSetting> {
        self.settings.iter().find(|s| s.id == id)
    }
}

/// Named collection of groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaCategory {
    /// Category name (`boot`, `profile`, `private`, `shared`)
    pub name: String,
    /// Category uid
    pub uid: String,
    /// Groups in document order
    pub groups: Vec<SchemaGroup>,
}

impl SchemaCategory {
    /// Group by name
    pub fn find_group(&self, name: &str) -> Result<&SchemaGroup, SchemaError> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| SchemaError::GroupNotFound {
                category: self.name.clone(),
                group: name.to_string(),
            })
    }

    /// Group names in document order
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }
}

/// A parsed schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Document name the schema was loaded from
    pub document: String,
    /// Categories in document order
    pub categories: Vec<SchemaCategory>,
}

impl Schema {
    /// Empty schema for a document
    #[must_use]
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            categories: Vec::new(),
        }
    }

    /// Category by name
    pub fn find_category(&self, name: &str) -> Result<&SchemaCategory, SchemaError> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SchemaError::CategoryNotFound(name.to_string()))
    }

    /// Every setting in the document
    pub fn settings(&self) -> impl Iterator<Item = &SchemaSetting> {
        self.categories
            .iter()
            .flat_map(|c| c.groups.iter())
            .flat_map(|g| g.settings.iter())
    }

    /// Setting by key, searched across the whole document
    #[must_use]
    pub fn find_setting(&self, key: &str) -> Option<&SchemaSetting> {
        self.settings().find(|s| s.key == key)
    }

    /// Number of settings in the document
    #[must_use]
    pub fn setting_count(&self) -> usize {
        self.settings().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boolean(code: Option<&str>, default: &str) -> SchemaSetting {
        let mut s = SchemaSetting::new("1", "mute", SettingType::Boolean, default);
        s.default_value_code = code.map(str::to_string);
        s
    }

    #[test]
    fn type_codes() {
        assert_eq!(SettingType::from_code("k", "tb").unwrap(), SettingType::Text);
        assert_eq!(SettingType::from_code("k", " DD ").unwrap(), SettingType::Dropdown);
        assert!(SettingType::from_code("k", "xx").is_err());
        assert_eq!(SettingType::Password.code(), "pw");
        assert!(SettingType::Radio.has_choices());
        assert!(!SettingType::Boolean.has_choices());
    }

    #[test]
    fn boolean_defaults_are_lowercased_and_negated() {
        let s = boolean(Some("True"), "false");
        assert_eq!(s.disabled_default(), "true");
        assert_eq!(s.enabled_default(), "false");

        let s = boolean(Some("FALSE"), "true");
        assert_eq!(s.disabled_default(), "false");
        assert_eq!(s.enabled_default(), "true");
    }

    #[test]
    fn unparsable_boolean_code_counts_as_false() {
        let s = boolean(Some("maybe"), "");
        assert_eq!(s.enabled_default(), "true");
    }

    #[test]
    fn code_falls_back_to_default_value() {
        let s = SchemaSetting::new("2", "maxVolume", SettingType::Text, "50");
        assert_eq!(s.disabled_default(), "50");
        assert_eq!(s.enabled_default(), "50");
    }

    #[test]
    fn key_id_replaces_spaces_and_dots() {
        let s = SchemaSetting::new("3", "audio.ring tone", SettingType::Text, "");
        assert_eq!(s.key_id(), "audio_ring_tone");
    }

    #[test]
    fn view_modes_filter_settings() {
        let mut basic = SchemaSetting::new("1", "a", SettingType::Text, "");
        basic.basic_level = true;
        let mut expert = SchemaSetting::new("2", "b", SettingType::Text, "");
        expert.basic_level = false;
        expert.mandatory = true;
        let group = SchemaGroup {
            name: "Audio".into(),
            id: "1".into(),
            settings: vec![basic, expert],
        };

        let keys = |v: Vec<&SchemaSetting>| v.iter().map(|s| s.key.clone()).collect::<Vec<_>>();
        assert_eq!(keys(group.list_settings(true)), vec!["a"]);
        assert_eq!(keys(group.list_settings(false)), vec!["b"]);
        assert_eq!(keys(group.list_settings_for(ViewMode::Advanced)), vec!["b"]);
    }

    #[test]
    fn lookups_report_missing_names() {
        let schema = Schema::new("SettingsTerminal.xml");
        assert!(matches!(
            schema.find_category("profile"),
            Err(SchemaError::CategoryNotFound(_))
        ));
        let category = SchemaCategory {
            name: "profile".into(),
            uid: "c1".into(),
            groups: vec![],
        };
        assert!(matches!(
            category.find_group("Audio"),
            Err(SchemaError::GroupNotFound { .. })
        ));
    }

    #[test]
    fn choice_label_falls_back_to_value() {
        assert_eq!(Choice::new("a").display_text(), "a");
        assert_eq!(Choice::labeled("a", "Alpha").display_text(), "Alpha");
    }
}

//! Typed controls
//!
//! One constructor per [`SettingType`] variant. The control shows the
//! subject's value when the setting is available and the disabled default
//! otherwise.

use serde::Serialize;
use turret_schema::{SchemaSetting, SettingType};

/// Element ids derived from a setting key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementIds {
    /// Key with spaces and dots replaced by `_`
    pub key_id: String,
    /// Value control: `setting_<keyId>`
    pub control: String,
    /// Availability toggle: `cb_<keyId>`
    pub toggle: String,
    /// Conflict icon container: `div_cb_<keyId>`
    pub conflict: String,
    /// Table row: `tr_<keyId>`
    pub row: String,
}

impl ElementIds {
    /// Ids for a setting
    #[must_use]
    pub fn for_setting(setting: &SchemaSetting) -> Self {
        let key_id = setting.key_id();
        let toggle = format!("cb_{key_id}");
        Self {
            control: format!("setting_{key_id}"),
            conflict: format!("div_{toggle}"),
            row: format!("tr_{key_id}"),
            toggle,
            key_id,
        }
    }
}

/// One item of a list control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    /// Label
    pub text: String,
    /// Submitted value
    pub value: String,
    /// Currently selected
    pub selected: bool,
}

/// Control widget and its current content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum ControlKind {
    /// Text box
    Text {
        /// Current text
        value: String,
    },
    /// Masked text box
    Password {
        /// Current text
        value: String,
    },
    /// Radio list built from the setting's choices
    Radio {
        /// Choices
        items: Vec<ListItem>,
    },
    /// `true`/`false` radio pair
    Boolean {
        /// The two items
        items: Vec<ListItem>,
    },
    /// Drop-down built from the setting's choices
    Dropdown {
        /// Choices
        items: Vec<ListItem>,
    },
}

/// `data-*` attributes the client reads when the toggle changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlData {
    /// `data-defaultvalue`: value shown while disabled
    pub default_value: String,
    /// `data-defaultvalueonenabled`: value taken when enabled
    pub default_value_on_enabled: String,
    /// `data-settingtype`: schema type code
    pub setting_type: &'static str,
}

/// A rendered value control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedControl {
    /// Element id
    pub id: String,
    /// CSS class binding the control to its validators
    pub css_class: String,
    /// Editable; mirrors the availability toggle
    pub enabled: bool,
    /// Widget
    pub kind: ControlKind,
    /// Client-side defaults
    pub data: ControlData,
}

impl RenderedControl {
    /// Build the control for a setting
    ///
    /// `current` is the subject's own value, `None` when the setting is not
    /// available.
    #[must_use]
    pub fn build(setting: &SchemaSetting, ids: &ElementIds, current: Option<&str>) -> Self {
        let shown = match current {
            Some(value) => value.to_string(),
            None => setting.disabled_default(),
        };
        let kind = match setting.setting_type {
            SettingType::Text => text(shown),
            SettingType::Password => password(shown),
            SettingType::Radio => radio(setting, &shown),
            SettingType::Boolean => boolean(&shown),
            SettingType::Dropdown => dropdown(setting, &shown),
        };
        Self {
            id: ids.control.clone(),
            css_class: format!("settingControl_{}", setting.id),
            enabled: current.is_some(),
            kind,
            data: ControlData {
                default_value: setting.disabled_default(),
                default_value_on_enabled: setting.enabled_default(),
                setting_type: setting.setting_type.code(),
            },
        }
    }

    /// Value the control currently holds
    ///
    /// List controls with nothing selected hold no value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            ControlKind::Text { value } | ControlKind::Password { value } => Some(value.as_str()),
            ControlKind::Radio { items }
            | ControlKind::Boolean { items }
            | ControlKind::Dropdown { items } => items
                .iter()
                .find(|item| item.selected)
                .map(|item| item.value.as_str()),
        }
    }
}

fn text(value: String) -> ControlKind {
    ControlKind::Text { value }
}

fn password(value: String) -> ControlKind {
    ControlKind::Password { value }
}

fn choice_items(setting: &SchemaSetting, selected: &str) -> Vec<ListItem> {
    setting
        .choices
        .iter()
        .map(|choice| ListItem {
            text: choice.display_text().to_string(),
            value: choice.value.clone(),
            selected: choice.value == selected,
        })
        .collect()
}

fn radio(setting: &SchemaSetting, selected: &str) -> ControlKind {
    ControlKind::Radio {
        items: choice_items(setting, selected),
    }
}

fn dropdown(setting: &SchemaSetting, selected: &str) -> ControlKind {
    ControlKind::Dropdown {
        items: choice_items(setting, selected),
    }
}

fn boolean(selected: &str) -> ControlKind {
    let selected = selected.to_ascii_lowercase();
    let item = |v: &str| ListItem {
        text: v.to_string(),
        value: v.to_string(),
        selected: selected == v,
    };
    ControlKind::Boolean {
        items: vec![item("true"), item("false")],
    }
}

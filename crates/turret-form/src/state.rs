//! Submitted form state and field validation

use crate::error::FieldViolation;
use crate::renderer::{RenderedForm, RenderedSetting};
use crate::validators::Validator;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// State of one setting's toggle and control as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    /// Availability toggle checked
    pub enabled: bool,
    /// Control content; `None` when the control was never populated
    #[serde(default)]
    pub value: Option<String>,
}

impl FieldState {
    /// Checked toggle with a control value
    #[must_use]
    pub fn enabled(value: impl Into<String>) -> Self {
        Self {
            enabled: true,
            value: Some(value.into()),
        }
    }

    /// Checked toggle whose control has not been filled in yet
    #[must_use]
    pub fn just_enabled() -> Self {
        Self {
            enabled: true,
            value: None,
        }
    }

    /// Unchecked toggle
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Field state a rendered setting starts with
    #[must_use]
    pub fn from_rendered(setting: &RenderedSetting) -> Self {
        Self {
            enabled: setting.available,
            value: setting.control.value().map(str::to_string),
        }
    }
}

/// Field states keyed by setting key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    fields: IndexMap<String, FieldState>,
}

impl FormState {
    /// Empty state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State exactly as a form was rendered
    #[must_use]
    pub fn from_rendered(form: &RenderedForm) -> Self {
        Self {
            fields: form
                .settings
                .iter()
                .map(|s| (s.schema.key.clone(), FieldState::from_rendered(s)))
                .collect(),
        }
    }

    /// Set a field
    pub fn set(&mut self, key: impl Into<String>, field: FieldState) {
        self.fields.insert(key.into(), field);
    }

    /// Check a toggle and fill the control
    pub fn enable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, FieldState::enabled(value));
    }

    /// Uncheck a toggle, keeping the control content
    pub fn disable(&mut self, key: &str) {
        self.fields.entry(key.to_string()).or_default().enabled = false;
    }

    /// Field by key
    #[inline]
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldState> {
        self.fields.get(key)
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldState)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field was submitted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Validate submitted fields of a rendered form
///
/// Fields missing from `state` keep their rendered state. Disabled fields
/// are not validated. A checked toggle whose control was never filled is
/// validated against the enabled default, which is what would be saved.
#[must_use]
pub fn validate_form(form: &RenderedForm, state: &FormState) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for setting in &form.settings {
        let field = state
            .field(&setting.schema.key)
            .cloned()
            .unwrap_or_else(|| FieldState::from_rendered(setting));
        if !field.enabled {
            continue;
        }
        let value = field
            .value
            .unwrap_or_else(|| setting.schema.enabled_default());

        let mut validators: Vec<&Validator> = setting
            .validators
            .iter()
            .filter(|v| !matches!(v, Validator::Required))
            .collect();
        let required = Validator::Required;
        if setting.schema.validator_require {
            validators.insert(0, &required);
        }
        for validator in validators {
            if let Err(violation) =
                validator.validate(&setting.schema.key, &setting.ids.control, &value)
            {
                violations.push(violation);
            }
        }
    }
    violations
}

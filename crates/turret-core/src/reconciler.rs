//! Form state back into the value store
//!
//! A pass walks the settings of the active group and, per setting:
//!
//! - toggle off: the existing value is marked for deletion
//! - toggle on, value marked for deletion: brought back, then updated from
//!   the control if the control holds something
//! - toggle on, no value: a row is created
//! - toggle on, live value: updated from the control
//!
//! A setting whose toggle was just switched on is not read from its control,
//! which the client has not filled in yet; it keeps what existed or takes the
//! enabled default.

use crate::collaborators::IdGenerator;
use crate::store::ValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use turret_form::FormState;
use turret_model::{DiffOperation, SettingDiff};
use turret_schema::{SchemaSetting, SettingType};

/// Interaction that started a reconcile pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "trigger")]
pub enum ReconcileTrigger {
    /// Save button
    Save,
    /// Navigation to another group
    GroupSwitch,
    /// Availability toggle of one setting switched on
    Enabled {
        /// Schema id of that setting
        setting_id: String,
    },
}

impl ReconcileTrigger {
    /// Trigger for a toggle switched on
    #[must_use]
    pub fn enabled(setting_id: impl Into<String>) -> Self {
        Self::Enabled {
            setting_id: setting_id.into(),
        }
    }

    /// Whether `setting` is the one whose toggle raised this pass
    #[must_use]
    pub fn just_enabled(&self, setting: &SchemaSetting) -> bool {
        matches!(self, Self::Enabled { setting_id } if *setting_id == setting.id)
    }
}

impl fmt::Display for ReconcileTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Save => f.write_str("save"),
            Self::GroupSwitch => f.write_str("group switch"),
            Self::Enabled { setting_id } => write!(f, "enabled {setting_id}"),
        }
    }
}

/// Applies form state to a [`ValueStore`]
#[derive(Clone, Copy)]
pub struct Reconciler<'a> {
    ids: &'a dyn IdGenerator,
}

impl fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl<'a> Reconciler<'a> {
    /// Reconciler creating rows with ids from `ids`
    #[must_use]
    pub fn new(ids: &'a dyn IdGenerator) -> Self {
        Self { ids }
    }

    /// Apply `state` for `settings` and return the changes of this pass
    ///
    /// Settings absent from `state` are left untouched. Applying the state of
    /// a form rendered right after a pass changes nothing.
    pub fn apply<'s, I>(
        &self,
        settings: I,
        state: &FormState,
        trigger: &ReconcileTrigger,
        store: &mut ValueStore,
    ) -> SettingDiff
    where
        I: IntoIterator<Item = &'s SchemaSetting>,
    {
        let mut diff = SettingDiff::new();
        for setting in settings {
            let Some(field) = state.field(&setting.key) else {
                continue;
            };
            let key = setting.key.as_str();

            let operation = if !field.enabled {
                store.soft_delete(key).then_some(DiffOperation::Delete)
            } else {
                let control = field
                    .value
                    .as_deref()
                    .filter(|_| !trigger.just_enabled(setting));
                match control {
                    Some(value) => self.write(setting, value, store),
                    None => self.keep_or_default(setting, store),
                }
            };

            if let Some(operation) = operation {
                if let Some(value) = store.get(key) {
                    diff.push(operation, value.clone());
                }
            }
        }

        tracing::debug!(
            "Reconciled ({}): {} added, {} updated, {} deleted",
            trigger,
            diff.adds().len(),
            diff.updates().len(),
            diff.deletes().len()
        );
        diff
    }

    fn write(
        &self,
        setting: &SchemaSetting,
        value: &str,
        store: &mut ValueStore,
    ) -> Option<DiffOperation> {
        // Boolean controls select lower-cased items; a stored "True" is unchanged
        let unchanged = store
            .find_by_key(&setting.key)
            .is_some_and(|current| same_value(setting.setting_type, current.value(), value));
        if unchanged {
            return None;
        }
        store.upsert(&setting.key, value, self.ids)
    }

    fn keep_or_default(
        &self,
        setting: &SchemaSetting,
        store: &mut ValueStore,
    ) -> Option<DiffOperation> {
        if store.restore(&setting.key) {
            return Some(DiffOperation::Update);
        }
        if store.get(&setting.key).is_some() {
            return None;
        }
        store.upsert(&setting.key, &setting.enabled_default(), self.ids)
    }
}

fn same_value(setting_type: SettingType, stored: &str, submitted: &str) -> bool {
    match setting_type {
        SettingType::Boolean => stored.eq_ignore_ascii_case(submitted),
        _ => stored == submitted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{LoadedValues, UlidGenerator};
    use turret_form::FieldState;
    use turret_model::{OwnerId, SettingCategory, SettingUid, SettingValue, Version};

    fn settings() -> Vec<SchemaSetting> {
        let mut mute = SchemaSetting::new("3", "mute", SettingType::Boolean, "true");
        mute.default_value_code = Some("false".into());
        vec![
            SchemaSetting::new("1", "maxVolume", SettingType::Text, "50"),
            SchemaSetting::new("2", "ringtone", SettingType::Dropdown, "chime1"),
            mute,
        ]
    }

    fn store_with(values: &[(&str, &str)]) -> ValueStore {
        ValueStore::from_loaded(
            OwnerId::new("P"),
            SettingCategory::TerminalProfile,
            LoadedValues {
                values: values
                    .iter()
                    .map(|(k, v)| {
                        SettingValue::loaded(
                            SettingUid::new(),
                            OwnerId::new("P"),
                            SettingCategory::TerminalProfile,
                            *k,
                            *v,
                            Version(1),
                        )
                    })
                    .collect(),
                owner_version: Version(1),
            },
        )
    }

    #[test]
    fn toggle_off_soft_deletes() {
        let ids = UlidGenerator::new();
        let mut store = store_with(&[("ringtone", "chime2")]);
        let mut state = FormState::new();
        state.set("ringtone", FieldState::disabled());

        let diff = Reconciler::new(&ids).apply(&settings(), &state, &ReconcileTrigger::Save, &mut store);
        assert_eq!(diff.operation_for("ringtone"), Some(DiffOperation::Delete));
        assert!(store.find_by_key("ringtone").is_none());
    }

    #[test]
    fn just_enabled_uses_default_not_control() {
        let ids = UlidGenerator::new();
        let mut store = store_with(&[]);
        let mut state = FormState::new();
        state.enable("maxVolume", "");

        let diff = Reconciler::new(&ids).apply(
            &settings(),
            &state,
            &ReconcileTrigger::enabled("1"),
            &mut store,
        );
        assert_eq!(diff.operation_for("maxVolume"), Some(DiffOperation::Add));
        assert_eq!(store.find_by_key("maxVolume").unwrap().value(), "50");
    }

    #[test]
    fn just_enabled_boolean_takes_enabled_default() {
        let ids = UlidGenerator::new();
        let mut store = store_with(&[]);
        let mut state = FormState::new();
        state.enable("mute", "false");

        Reconciler::new(&ids).apply(&settings(), &state, &ReconcileTrigger::enabled("3"), &mut store);
        assert_eq!(store.find_by_key("mute").unwrap().value(), "true");
    }

    #[test]
    fn other_settings_read_their_control() {
        let ids = UlidGenerator::new();
        let mut store = store_with(&[("ringtone", "chime1")]);
        let mut state = FormState::new();
        state.enable("ringtone", "chime2");
        state.enable("maxVolume", "");

        Reconciler::new(&ids).apply(&settings(), &state, &ReconcileTrigger::enabled("1"), &mut store);
        assert_eq!(store.find_by_key("ringtone").unwrap().value(), "chime2");
    }

    #[test]
    fn re_enabling_restores_pre_delete_value() {
        let ids = UlidGenerator::new();
        let reconciler = Reconciler::new(&ids);
        let mut store = store_with(&[("ringtone", "chime2")]);

        let mut state = FormState::new();
        state.set("ringtone", FieldState::disabled());
        reconciler.apply(&settings(), &state, &ReconcileTrigger::GroupSwitch, &mut store);

        state.set("ringtone", FieldState::just_enabled());
        let diff = reconciler.apply(&settings(), &state, &ReconcileTrigger::enabled("2"), &mut store);
        assert_eq!(diff.operation_for("ringtone"), Some(DiffOperation::Update));
        assert_eq!(store.find_by_key("ringtone").unwrap().value(), "chime2");
        assert!(store.pending_diff().is_empty());
    }

    #[test]
    fn unpopulated_list_keeps_existing_value() {
        let ids = UlidGenerator::new();
        let mut store = store_with(&[("ringtone", "gong")]);
        let mut state = FormState::new();
        state.set("ringtone", FieldState::just_enabled());

        let diff = Reconciler::new(&ids).apply(&settings(), &state, &ReconcileTrigger::Save, &mut store);
        assert!(diff.is_empty());
        assert_eq!(store.find_by_key("ringtone").unwrap().value(), "gong");
    }

    #[test]
    fn boolean_case_is_not_a_change() {
        let ids = UlidGenerator::new();
        let mut store = store_with(&[("mute", "True")]);
        let mut state = FormState::new();
        state.enable("mute", "true");

        let diff = Reconciler::new(&ids).apply(&settings(), &state, &ReconcileTrigger::Save, &mut store);
        assert!(diff.is_empty());
    }

    #[test]
    fn fields_missing_from_state_are_untouched() {
        let ids = UlidGenerator::new();
        let mut store = store_with(&[("maxVolume", "70")]);
        let diff = Reconciler::new(&ids).apply(
            &settings(),
            &FormState::new(),
            &ReconcileTrigger::Save,
            &mut store,
        );
        assert!(diff.is_empty());
        assert_eq!(store.len(), 1);
    }
}

//! Concrete setting values
//!
//! A [`SettingValue`] is one `(key, value)` pair stored for an owner under a
//! category. Values loaded from storage remember what they looked like at load
//! time so that a collection can later be turned into a minimal diff.

use crate::category::SettingCategory;
use crate::ids::{OwnerId, SettingUid, Version};
use serde::Serialize;

/// One stored or pending setting
///
/// # Invariants
/// - `loaded_value` is `Some` iff the value came from storage
/// - a deleted value stays in its collection until the collection is committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingValue {
    uid: SettingUid,
    key: String,
    value: String,
    owner: OwnerId,
    category: SettingCategory,
    version: Version,
    #[serde(skip)]
    loaded_value: Option<String>,
    #[serde(skip)]
    deleted: bool,
}

impl SettingValue {
    /// Value read back from storage
    #[must_use]
    pub fn loaded(
        uid: SettingUid,
        owner: OwnerId,
        category: SettingCategory,
        key: impl Into<String>,
        value: impl Into<String>,
        version: Version,
    ) -> Self {
        let value = value.into();
        Self {
            uid,
            key: key.into(),
            loaded_value: Some(value.clone()),
            value,
            owner,
            category,
            version,
            deleted: false,
        }
    }

    /// New in-memory value, not yet written anywhere
    #[must_use]
    pub fn created(
        uid: SettingUid,
        version: Version,
        owner: OwnerId,
        category: SettingCategory,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            uid,
            key: key.into(),
            value: value.into(),
            owner,
            category,
            version,
            loaded_value: None,
            deleted: false,
        }
    }

    /// Row id
    #[inline]
    #[must_use]
    pub fn uid(&self) -> SettingUid {
        self.uid
    }

    /// Setting key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Owner the value belongs to
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Storage category
    #[inline]
    #[must_use]
    pub fn category(&self) -> SettingCategory {
        self.category
    }

    /// Row version
    #[inline]
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether the value was loaded from storage
    #[inline]
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.loaded_value.is_some()
    }

    /// Whether the value is marked for deletion
    #[inline]
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Value as it was when loaded, if persisted
    #[inline]
    #[must_use]
    pub fn loaded_value(&self) -> Option<&str> {
        self.loaded_value.as_deref()
    }

    /// Persisted, not deleted, and the value differs from storage
    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        !self.deleted
            && self
                .loaded_value
                .as_deref()
                .is_some_and(|loaded| loaded != self.value)
    }

    /// Replace the value; returns `true` if it changed
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value == self.value {
            return false;
        }
        self.value = value;
        true
    }

    /// Mark for deletion without removing; returns `true` if newly deleted
    pub fn delete_in_memory(&mut self) -> bool {
        !std::mem::replace(&mut self.deleted, true)
    }

    /// Undo a pending deletion; returns `true` if it was deleted
    pub fn restore(&mut self) -> bool {
        std::mem::replace(&mut self.deleted, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(value: &str) -> SettingValue {
        SettingValue::loaded(
            SettingUid::new(),
            OwnerId::new("P1"),
            SettingCategory::TerminalProfile,
            "ringtone",
            value,
            Version(3),
        )
    }

    #[test]
    fn loaded_value_is_persisted_and_clean() {
        let v = loaded("chime1");
        assert!(v.is_persisted());
        assert!(!v.is_modified());
        assert_eq!(v.loaded_value(), Some("chime1"));
    }

    #[test]
    fn created_value_is_not_persisted() {
        let v = SettingValue::created(
            SettingUid::new(),
            Version(1),
            OwnerId::new("P1"),
            SettingCategory::TerminalProfile,
            "maxVolume",
            "50",
        );
        assert!(!v.is_persisted());
        assert!(!v.is_modified());
    }

    #[test]
    fn set_value_tracks_modification() {
        let mut v = loaded("chime1");
        assert!(!v.set_value("chime1"));
        assert!(v.set_value("chime2"));
        assert!(v.is_modified());
        assert!(v.set_value("chime1"));
        assert!(!v.is_modified());
    }

    #[test]
    fn soft_delete_and_restore() {
        let mut v = loaded("chime1");
        assert!(v.delete_in_memory());
        assert!(!v.delete_in_memory());
        assert!(v.is_deleted());
        assert!(!v.is_modified());
        assert!(v.restore());
        assert!(!v.restore());
        assert_eq!(v.value(), "chime1");
    }
}

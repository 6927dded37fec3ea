//! In-memory values of every owner in a chain
//!
//! Loaded once per session so that resolving a whole form costs no further
//! persistence calls.

use std::collections::HashMap;
use turret_model::{OwnerId, SettingCategory, SettingValue};

/// Read access to persisted values of chain owners
pub trait ValueLookup {
    /// Persisted value of `key` held by `owner`
    ///
    /// `category` of `None` matches any category; shared profiles are looked
    /// up that way.
    fn lookup(
        &self,
        owner: &OwnerId,
        category: Option<SettingCategory>,
        key: &str,
    ) -> Option<&SettingValue>;
}

/// Values of chain owners, grouped by owner
#[derive(Debug, Clone, Default)]
pub struct InheritanceSnapshot {
    by_owner: HashMap<OwnerId, Vec<SettingValue>>,
}

impl InheritanceSnapshot {
    /// Empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add values, filed under each value's own owner
    pub fn extend<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = SettingValue>,
    {
        for value in values {
            self.by_owner
                .entry(value.owner().clone())
                .or_default()
                .push(value);
        }
    }

    /// Snapshot built from values
    #[must_use]
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = SettingValue>,
    {
        let mut snapshot = Self::new();
        snapshot.extend(values);
        snapshot
    }

    /// Number of owners with at least one value
    #[inline]
    #[must_use]
    pub fn owner_count(&self) -> usize {
        self.by_owner.len()
    }

    /// Total number of values
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.by_owner.values().map(Vec::len).sum()
    }
}

impl ValueLookup for InheritanceSnapshot {
    fn lookup(
        &self,
        owner: &OwnerId,
        category: Option<SettingCategory>,
        key: &str,
    ) -> Option<&SettingValue> {
        self.by_owner.get(owner)?.iter().find(|v| {
            v.key() == key
                && v.is_persisted()
                && !v.is_deleted()
                && category.map_or(true, |c| v.category() == c)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turret_model::{SettingUid, Version};

    fn persisted(owner: &str, category: SettingCategory, key: &str, value: &str) -> SettingValue {
        SettingValue::loaded(
            SettingUid::new(),
            OwnerId::new(owner),
            category,
            key,
            value,
            Version(1),
        )
    }

    #[test]
    fn lookup_filters_by_category_when_given() {
        let snapshot = InheritanceSnapshot::from_values([
            persisted("Z", SettingCategory::TerminalBoot, "vlan", "10"),
            persisted("Z", SettingCategory::TerminalProfile, "ringtone", "chime1"),
        ]);
        let zone = OwnerId::new("Z");

        assert!(snapshot
            .lookup(&zone, Some(SettingCategory::TerminalBoot), "vlan")
            .is_some());
        assert!(snapshot
            .lookup(&zone, Some(SettingCategory::TerminalBoot), "ringtone")
            .is_none());
        assert!(snapshot.lookup(&zone, None, "ringtone").is_some());
        assert_eq!(snapshot.owner_count(), 1);
        assert_eq!(snapshot.value_count(), 2);
    }

    #[test]
    fn in_memory_values_are_ignored() {
        let created = SettingValue::created(
            SettingUid::new(),
            Version(1),
            OwnerId::new("P"),
            SettingCategory::TerminalProfile,
            "ringtone",
            "chime1",
        );
        let snapshot = InheritanceSnapshot::from_values([created]);
        assert!(snapshot.lookup(&OwnerId::new("P"), None, "ringtone").is_none());
    }
}

//! Subject's value collection
//!
//! Loaded once, edited in memory, committed as one diff. Deleting a value
//! only marks it so that re-enabling before the commit brings it back.

use crate::collaborators::{IdGenerator, LoadedValues, ValuePersistence};
use crate::error::EditorError;
use indexmap::IndexMap;
use turret_form::CurrentValues;
use turret_model::{DiffOperation, OwnerId, SettingCategory, SettingDiff, SettingValue, Version};

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Owner version after the commit
    pub version: Version,
    /// Changes written
    pub diff: SettingDiff,
}

/// In-memory values of one owner under its merged category
///
/// # Invariants
/// - every value belongs to `owner` and `category`
/// - at most one value per key
#[derive(Debug, Clone)]
pub struct ValueStore {
    owner: OwnerId,
    category: SettingCategory,
    owner_version: Version,
    values: IndexMap<String, SettingValue>,
}

impl ValueStore {
    /// Empty collection
    #[must_use]
    pub fn new(owner: OwnerId, category: SettingCategory, owner_version: Version) -> Self {
        Self {
            owner,
            category: category.merged(),
            owner_version,
            values: IndexMap::new(),
        }
    }

    /// Collection built from values read by a collaborator
    #[must_use]
    pub fn from_loaded(owner: OwnerId, category: SettingCategory, loaded: LoadedValues) -> Self {
        let mut store = Self::new(owner, category, loaded.owner_version);
        for value in loaded.values {
            store.values.insert(value.key().to_string(), value);
        }
        store
    }

    /// Read the owner's values through `persistence`
    pub fn load<P>(
        persistence: &P,
        owner: &OwnerId,
        category: SettingCategory,
    ) -> Result<Self, EditorError>
    where
        P: ValuePersistence + ?Sized,
    {
        let merged = category.merged();
        let loaded = persistence
            .fetch_values(owner, merged)
            .map_err(|source| EditorError::ValueLoadFailed {
                owner: owner.clone(),
                source,
            })?;
        tracing::info!(
            "Loaded {} values of {} ({}) at {}",
            loaded.values.len(),
            owner,
            merged,
            loaded.owner_version
        );
        Ok(Self::from_loaded(owner.clone(), merged, loaded))
    }

    /// Owner of the values
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Merged category of the values
    #[inline]
    #[must_use]
    pub fn category(&self) -> SettingCategory {
        self.category
    }

    /// Owner version the values were loaded at
    #[inline]
    #[must_use]
    pub fn owner_version(&self) -> Version {
        self.owner_version
    }

    /// Live value for a key
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key).filter(|v| !v.is_deleted())
    }

    /// Value for a key, including one marked for deletion
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    /// Live values in load order
    pub fn values(&self) -> impl Iterator<Item = &SettingValue> {
        self.values.values().filter(|v| !v.is_deleted())
    }

    /// Number of live values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values().count()
    }

    /// Whether no value is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set a key's value, creating the row if needed
    ///
    /// A value marked for deletion is brought back. Returns the change made,
    /// `None` when the value was already live and equal.
    pub fn upsert<G>(&mut self, key: &str, value: &str, ids: &G) -> Option<DiffOperation>
    where
        G: IdGenerator + ?Sized,
    {
        if let Some(existing) = self.values.get_mut(key) {
            let restored = existing.restore();
            let changed = existing.set_value(value);
            return (restored || changed).then_some(DiffOperation::Update);
        }

        let created = SettingValue::created(
            ids.next_uid(),
            ids.next_version(),
            self.owner.clone(),
            self.category,
            key,
            value,
        );
        self.values.insert(key.to_string(), created);
        Some(DiffOperation::Add)
    }

    /// Mark a key's value for deletion; returns `true` if it was live
    pub fn soft_delete(&mut self, key: &str) -> bool {
        self.values
            .get_mut(key)
            .is_some_and(SettingValue::delete_in_memory)
    }

    /// Undo a pending deletion; returns `true` if one was pending
    pub fn restore(&mut self, key: &str) -> bool {
        self.values.get_mut(key).is_some_and(SettingValue::restore)
    }

    /// Changes a commit would write
    ///
    /// Rows created and deleted before any commit are left out.
    #[must_use]
    pub fn pending_diff(&self) -> SettingDiff {
        let mut diff = SettingDiff::new();
        for value in self.values.values() {
            let operation = match (value.is_persisted(), value.is_deleted()) {
                (true, true) => DiffOperation::Delete,
                (false, false) => DiffOperation::Add,
                (true, false) if value.is_modified() => DiffOperation::Update,
                _ => continue,
            };
            diff.push(operation, value.clone());
        }
        diff
    }

    /// Whether a commit would write anything
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.pending_diff().is_empty()
    }

    /// Write pending changes and bump the owner version
    ///
    /// On conflict nothing changes in memory; the caller must reload.
    pub fn commit<P>(&mut self, persistence: &P) -> Result<CommitReceipt, EditorError>
    where
        P: ValuePersistence + ?Sized,
    {
        let diff = self.pending_diff();
        let version = match persistence.commit_values(&self.owner, self.owner_version, &diff) {
            Ok(version) => version,
            Err(err) => {
                tracing::warn!("Commit of {} failed: {}", self.owner, err);
                return Err(EditorError::from_commit(&self.owner, err));
            }
        };

        tracing::info!(
            "Committed {} changes for {} ({} -> {})",
            diff.len(),
            self.owner,
            self.owner_version,
            version
        );

        self.owner_version = version;
        self.values = std::mem::take(&mut self.values)
            .into_iter()
            .filter(|(_, v)| !v.is_deleted())
            .map(|(key, v)| {
                let persisted = SettingValue::loaded(
                    v.uid(),
                    v.owner().clone(),
                    v.category(),
                    v.key(),
                    v.value(),
                    v.version(),
                );
                (key, persisted)
            })
            .collect();

        Ok(CommitReceipt { version, diff })
    }
}

impl CurrentValues for ValueStore {
    fn current(&self, key: &str) -> Option<&SettingValue> {
        self.find_by_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::UlidGenerator;
    use crate::error::PersistenceError;
    use parking_lot::Mutex;
    use turret_model::SettingUid;

    fn loaded(key: &str, value: &str) -> SettingValue {
        SettingValue::loaded(
            SettingUid::new(),
            OwnerId::new("P"),
            SettingCategory::TerminalProfile,
            key,
            value,
            Version(1),
        )
    }

    fn store() -> ValueStore {
        ValueStore::from_loaded(
            OwnerId::new("P"),
            SettingCategory::NetrixProfile,
            LoadedValues {
                values: vec![loaded("ringtone", "chime1"), loaded("maxVolume", "70")],
                owner_version: Version(5),
            },
        )
    }

    #[derive(Default)]
    struct Recorder {
        stored: Mutex<Version>,
        last: Mutex<Option<SettingDiff>>,
    }

    impl ValuePersistence for Recorder {
        fn fetch_values(
            &self,
            _owner: &OwnerId,
            _category: SettingCategory,
        ) -> Result<LoadedValues, PersistenceError> {
            Err(PersistenceError::Backend("offline".into()))
        }

        fn fetch_values_across_owners(
            &self,
            _owners: &[OwnerId],
        ) -> Result<Vec<SettingValue>, PersistenceError> {
            Ok(Vec::new())
        }

        fn commit_values(
            &self,
            _owner: &OwnerId,
            expected: Version,
            diff: &SettingDiff,
        ) -> Result<Version, PersistenceError> {
            let mut stored = self.stored.lock();
            if *stored != expected {
                return Err(PersistenceError::Conflict {
                    expected,
                    actual: *stored,
                });
            }
            *stored = stored.next();
            *self.last.lock() = Some(diff.clone());
            Ok(*stored)
        }
    }

    #[test]
    fn category_is_merged() {
        assert_eq!(store().category(), SettingCategory::TerminalProfile);
    }

    #[test]
    fn upsert_creates_then_updates() {
        let ids = UlidGenerator::new();
        let mut store = store();
        assert_eq!(store.upsert("mute", "true", &ids), Some(DiffOperation::Add));
        assert_eq!(store.upsert("mute", "true", &ids), None);
        assert_eq!(store.upsert("ringtone", "chime2", &ids), Some(DiffOperation::Update));

        let created = store.find_by_key("mute").unwrap();
        assert!(!created.is_persisted());
        assert_eq!(created.category(), SettingCategory::TerminalProfile);
        assert_eq!(created.version(), Version(1));
    }

    #[test]
    fn soft_delete_then_restore_keeps_value() {
        let mut store = store();
        assert!(store.soft_delete("ringtone"));
        assert!(!store.soft_delete("ringtone"));
        assert!(store.find_by_key("ringtone").is_none());
        assert!(store.get("ringtone").is_some());

        assert!(store.restore("ringtone"));
        assert_eq!(store.find_by_key("ringtone").unwrap().value(), "chime1");
        assert!(store.pending_diff().is_empty());
    }

    #[test]
    fn pending_diff_skips_created_then_deleted() {
        let ids = UlidGenerator::new();
        let mut store = store();
        store.upsert("mute", "true", &ids);
        store.soft_delete("mute");
        store.soft_delete("maxVolume");
        store.upsert("ringtone", "chime3", &ids);

        let diff = store.pending_diff();
        assert!(diff.adds().is_empty());
        assert_eq!(diff.operation_for("maxVolume"), Some(DiffOperation::Delete));
        assert_eq!(diff.operation_for("ringtone"), Some(DiffOperation::Update));
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn commit_settles_the_collection() {
        let backend = Recorder {
            stored: Mutex::new(Version(5)),
            ..Recorder::default()
        };
        let ids = UlidGenerator::new();
        let mut store = store();
        store.upsert("mute", "true", &ids);
        store.soft_delete("maxVolume");

        let receipt = store.commit(&backend).unwrap();
        assert_eq!(receipt.version, Version(6));
        assert_eq!(receipt.diff.len(), 2);
        assert_eq!(store.owner_version(), Version(6));
        assert!(store.get("maxVolume").is_none());
        assert!(store.find_by_key("mute").unwrap().is_persisted());
        assert!(!store.is_dirty());
    }

    #[test]
    fn conflict_leaves_local_edits() {
        let backend = Recorder {
            stored: Mutex::new(Version(9)),
            ..Recorder::default()
        };
        let ids = UlidGenerator::new();
        let mut store = store();
        store.upsert("ringtone", "chime2", &ids);

        let err = store.commit(&backend).unwrap_err();
        assert!(matches!(
            err,
            EditorError::PersistenceConflict {
                expected: Version(5),
                actual: Version(9),
                ..
            }
        ));
        assert!(store.is_dirty());
        assert_eq!(store.owner_version(), Version(5));
        assert!(backend.last.lock().is_none());
    }

    #[test]
    fn load_failure_names_the_owner() {
        let err = ValueStore::load(&Recorder::default(), &OwnerId::new("P"), SettingCategory::TerminalBoot)
            .unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("P"));
    }
}

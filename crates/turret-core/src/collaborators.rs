//! External collaborators consumed by the session
//!
//! Storage, ownership lookups, id generation and post-commit hooks live
//! outside this crate. Everything here is synchronous; timeouts are the
//! implementor's business.

use crate::error::PersistenceError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use turret_model::{OwnerId, OwnerRef, SettingCategory, SettingDiff, SettingUid, SettingValue, Version};
use ulid::Ulid;

/// One owner's values together with the owner's version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedValues {
    /// Persisted values
    pub values: Vec<SettingValue>,
    /// Version of the owner record when the values were read
    pub owner_version: Version,
}

/// Value storage
pub trait ValuePersistence: Send + Sync {
    /// Values of `owner` stored under `category`
    fn fetch_values(
        &self,
        owner: &OwnerId,
        category: SettingCategory,
    ) -> Result<LoadedValues, PersistenceError>;

    /// Values of several owners, any category, in one call
    fn fetch_values_across_owners(
        &self,
        owners: &[OwnerId],
    ) -> Result<Vec<SettingValue>, PersistenceError>;

    /// Values of one key held by several owners
    fn fetch_values_for_key_across_owners(
        &self,
        key: &str,
        owners: &[OwnerId],
    ) -> Result<Vec<SettingValue>, PersistenceError> {
        Ok(self
            .fetch_values_across_owners(owners)?
            .into_iter()
            .filter(|v| v.key() == key)
            .collect())
    }

    /// Apply `diff` and bump the owner version in one atomic unit
    ///
    /// Fails with [`PersistenceError::Conflict`] when the stored owner
    /// version is not `expected`; nothing is written in that case.
    fn commit_values(
        &self,
        owner: &OwnerId,
        expected: Version,
        diff: &SettingDiff,
    ) -> Result<Version, PersistenceError>;
}

/// Shared profile attached to a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedProfile {
    /// Profile uid
    pub profile: OwnerId,
    /// Profile name
    pub name: String,
    /// Name of the application owning the profile
    pub application_name: String,
}

/// Lookups of the owners a subject may inherit from
///
/// Every single-owner lookup yields zero or one owner.
pub trait OwnershipProvider: Send + Sync {
    /// Zone the subject is assigned to
    fn specific_zone(&self, subject: &OwnerId) -> Result<Option<OwnerRef>, PersistenceError>;

    /// Zone with the given name, compared case-insensitively
    fn system_zone(&self, name: &str) -> Result<Option<OwnerRef>, PersistenceError>;

    /// Device model of the subject
    fn model(&self, subject: &OwnerId) -> Result<Option<OwnerRef>, PersistenceError>;

    /// Cluster node profile of a TPO subject
    fn cluster_node(&self, subject: &OwnerId) -> Result<Option<OwnerRef>, PersistenceError>;

    /// Shared profiles attached to the subject, in attachment order
    fn shared_profiles(&self, subject: &OwnerId) -> Result<Vec<AttachedProfile>, PersistenceError>;
}

/// Source of ids for new setting rows
pub trait IdGenerator: Send + Sync {
    /// Fresh row id
    fn next_uid(&self) -> SettingUid;

    /// Fresh row version
    fn next_version(&self) -> Version;
}

/// Monotonic ULID ids with a counting version
pub struct UlidGenerator {
    state: Mutex<UlidState>,
}

struct UlidState {
    generator: ulid::Generator,
    version: Version,
}

impl UlidGenerator {
    /// Generator whose first version follows [`Version::INITIAL`]
    #[must_use]
    pub fn new() -> Self {
        Self::starting_after(Version::INITIAL)
    }

    /// Generator whose first version follows `version`
    #[must_use]
    pub fn starting_after(version: Version) -> Self {
        Self {
            state: Mutex::new(UlidState {
                generator: ulid::Generator::new(),
                version,
            }),
        }
    }
}

impl Default for UlidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UlidGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UlidGenerator")
            .field("version", &self.state.lock().version)
            .finish()
    }
}

impl IdGenerator for UlidGenerator {
    fn next_uid(&self) -> SettingUid {
        // Overflow within one millisecond: fall back to a random ULID
        let uid = self
            .state
            .lock()
            .generator
            .generate()
            .unwrap_or_else(|_| Ulid::new());
        SettingUid(uid)
    }

    fn next_version(&self) -> Version {
        let mut state = self.state.lock();
        state.version = state.version.next();
        state.version
    }
}

/// What a successful commit wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    /// Owner that was saved
    pub subject: OwnerId,
    /// Category of the subject
    pub category: SettingCategory,
    /// Owner version after the commit
    pub version: Version,
    /// Rows inserted
    pub adds: usize,
    /// Rows updated
    pub updates: usize,
    /// Rows removed
    pub deletes: usize,
}

impl CommitEvent {
    pub(crate) fn new(
        subject: OwnerId,
        category: SettingCategory,
        version: Version,
        diff: &SettingDiff,
    ) -> Self {
        Self {
            subject,
            category,
            version,
            adds: diff.adds().len(),
            updates: diff.updates().len(),
            deletes: diff.deletes().len(),
        }
    }
}

/// Hooks run after a commit
///
/// Regenerating device files or the global configuration is the
/// observer's job; the session only reports that it is due.
pub trait CommitObserver: Send + Sync {
    /// Every successful commit
    fn committed(&self, _event: &CommitEvent) {}

    /// A boot document was saved
    fn boot_settings_saved(&self, _event: &CommitEvent) {}

    /// The subject asked for the global configuration to be rebuilt
    fn global_config_requested(&self, _event: &CommitEvent) {}
}

/// Observer that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl CommitObserver for LoggingObserver {
    fn committed(&self, event: &CommitEvent) {
        tracing::info!(
            "Committed {} ({}) at {}: {} added, {} updated, {} deleted",
            event.subject,
            event.category,
            event.version,
            event.adds,
            event.updates,
            event.deletes
        );
    }

    fn boot_settings_saved(&self, event: &CommitEvent) {
        tracing::info!("Boot settings of {} changed; device files are due", event.subject);
    }

    fn global_config_requested(&self, event: &CommitEvent) {
        tracing::info!("Global configuration rebuild requested by {}", event.subject);
    }
}

//! JSON-file backend
//!
//! One file holds owners, zones, models and every stored value. Commits
//! rewrite the whole file through a temporary file in the same directory,
//! so a reader sees either the old or the new content.

use anyhow::Context;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use turret_core::{AttachedProfile, LoadedValues, OwnershipProvider, PersistenceError, ValuePersistence};
use turret_model::{
    OwnerId, OwnerRef, SettingCategory, SettingDiff, SettingUid, SettingValue, Version,
};

/// Owner row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerRecord {
    /// Display name
    pub name: String,
    /// Owning application
    pub application: String,
    /// Bumped by every commit
    pub version: Version,
    /// Assigned zone uid
    pub zone: Option<String>,
    /// Device model id
    pub model: Option<String>,
    /// Cluster node profile of a TPO node
    pub cluster_node: Option<OwnerId>,
    /// Attached shared profiles, in attachment order
    pub shared_profiles: Vec<OwnerId>,
}

/// Zone or model and the profile holding its settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedOwner {
    /// Display name
    pub name: String,
    /// Settings profile
    pub profile: OwnerId,
}

/// Value row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    /// Row id
    pub uid: SettingUid,
    /// Owner profile
    pub owner: OwnerId,
    /// Category stored under
    pub category: SettingCategory,
    /// Setting key
    pub key: String,
    /// Setting value
    pub value: String,
    /// Row version
    #[serde(default)]
    pub version: Version,
}

impl StoredValue {
    fn to_value(&self) -> SettingValue {
        SettingValue::loaded(
            self.uid,
            self.owner.clone(),
            self.category,
            &self.key,
            &self.value,
            self.version,
        )
    }

    fn from_value(value: &SettingValue) -> Self {
        Self {
            uid: value.uid(),
            owner: value.owner().clone(),
            category: value.category(),
            key: value.key().to_string(),
            value: value.value().to_string(),
            version: value.version(),
        }
    }
}

/// Whole content of the backend file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendData {
    /// Profiles by uid
    pub owners: BTreeMap<OwnerId, OwnerRecord>,
    /// Zones by uid
    pub zones: BTreeMap<String, LinkedOwner>,
    /// Models by id
    pub models: BTreeMap<String, LinkedOwner>,
    /// Stored values
    pub values: Vec<StoredValue>,
}

impl BackendData {
    fn owner_version(&self, owner: &OwnerId) -> Version {
        self.owners.get(owner).map(|o| o.version).unwrap_or_default()
    }

    fn apply(&mut self, diff: &SettingDiff) {
        for gone in diff.deletes() {
            self.values.retain(|v| v.uid != gone.uid());
        }
        for changed in diff.updates() {
            if let Some(row) = self.values.iter_mut().find(|v| v.uid == changed.uid()) {
                row.value = changed.value().to_string();
            }
        }
        self.values.extend(diff.adds().iter().map(StoredValue::from_value));
    }
}

/// Value storage and ownership lookups over one JSON file
pub struct JsonFileBackend {
    path: PathBuf,
    data: RwLock<BackendData>,
}

impl std::fmt::Debug for JsonFileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data.read();
        f.debug_struct("JsonFileBackend")
            .field("path", &self.path)
            .field("owners", &data.owners.len())
            .field("values", &data.values.len())
            .finish()
    }
}

impl JsonFileBackend {
    /// Read the file; a missing file is an empty backend
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            tracing::info!("{} does not exist yet, starting empty", path.display());
            BackendData::default()
        };
        Ok(Self::from_data(path, data))
    }

    /// Backend over given content, written to `path` on commit
    #[must_use]
    pub fn from_data(path: impl Into<PathBuf>, data: BackendData) -> Self {
        Self {
            path: path.into(),
            data: RwLock::new(data),
        }
    }

    /// File path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current content
    #[must_use]
    pub fn data(&self) -> BackendData {
        self.data.read().clone()
    }

    /// Highest row version stored
    #[must_use]
    pub fn max_version(&self) -> Version {
        self.data
            .read()
            .values
            .iter()
            .map(|v| v.version)
            .max()
            .unwrap_or_default()
    }

    fn write(&self, data: &BackendData) -> Result<(), PersistenceError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(backend_error)?;
        serde_json::to_writer_pretty(&mut file, data).map_err(backend_error)?;
        file.persist(&self.path).map_err(|e| backend_error(e.error))?;
        Ok(())
    }

    fn linked(
        &self,
        subject: &OwnerId,
        pick: impl Fn(&OwnerRecord) -> Option<&String>,
        table: impl Fn(&BackendData) -> &BTreeMap<String, LinkedOwner>,
        build: impl Fn(&str, &LinkedOwner) -> OwnerRef,
    ) -> Option<OwnerRef> {
        let data = self.data.read();
        let id = data.owners.get(subject).and_then(&pick)?;
        table(&data).get(id).map(|linked| build(id.as_str(), linked))
    }
}

fn backend_error(err: impl Display) -> PersistenceError {
    PersistenceError::Backend(err.to_string())
}

impl ValuePersistence for JsonFileBackend {
    fn fetch_values(
        &self,
        owner: &OwnerId,
        category: SettingCategory,
    ) -> Result<LoadedValues, PersistenceError> {
        let data = self.data.read();
        Ok(LoadedValues {
            values: data
                .values
                .iter()
                .filter(|v| &v.owner == owner && v.category == category)
                .map(StoredValue::to_value)
                .collect(),
            owner_version: data.owner_version(owner),
        })
    }

    fn fetch_values_across_owners(
        &self,
        owners: &[OwnerId],
    ) -> Result<Vec<SettingValue>, PersistenceError> {
        let data = self.data.read();
        Ok(data
            .values
            .iter()
            .filter(|v| owners.contains(&v.owner))
            .map(StoredValue::to_value)
            .collect())
    }

    fn commit_values(
        &self,
        owner: &OwnerId,
        expected: Version,
        diff: &SettingDiff,
    ) -> Result<Version, PersistenceError> {
        let mut data = self.data.write();
        let actual = data.owner_version(owner);
        if actual != expected {
            return Err(PersistenceError::Conflict { expected, actual });
        }

        let mut next = data.clone();
        next.apply(diff);
        let version = actual.next();
        next.owners.entry(owner.clone()).or_default().version = version;

        self.write(&next)?;
        *data = next;
        tracing::debug!("Wrote {} ({} values)", self.path.display(), data.values.len());
        Ok(version)
    }
}

impl OwnershipProvider for JsonFileBackend {
    fn specific_zone(&self, subject: &OwnerId) -> Result<Option<OwnerRef>, PersistenceError> {
        Ok(self.linked(
            subject,
            |o| o.zone.as_ref(),
            |d| &d.zones,
            |uid, z| OwnerRef::specific_zone(uid, z.profile.clone(), &z.name),
        ))
    }

    fn system_zone(&self, name: &str) -> Result<Option<OwnerRef>, PersistenceError> {
        let data = self.data.read();
        Ok(data
            .zones
            .iter()
            .find(|(_, z)| z.name.trim().eq_ignore_ascii_case(name))
            .map(|(uid, z)| OwnerRef::system_zone(uid.as_str(), z.profile.clone(), &z.name)))
    }

    fn model(&self, subject: &OwnerId) -> Result<Option<OwnerRef>, PersistenceError> {
        Ok(self.linked(
            subject,
            |o| o.model.as_ref(),
            |d| &d.models,
            |id, m| OwnerRef::model(id, m.profile.clone(), &m.name),
        ))
    }

    fn cluster_node(&self, subject: &OwnerId) -> Result<Option<OwnerRef>, PersistenceError> {
        let data = self.data.read();
        Ok(data
            .owners
            .get(subject)
            .and_then(|o| o.cluster_node.as_ref())
            .map(|node| {
                let name = data.owners.get(node).map_or(node.as_str(), |o| o.name.as_str());
                OwnerRef::cluster_node(node.clone(), name)
            }))
    }

    fn shared_profiles(&self, subject: &OwnerId) -> Result<Vec<AttachedProfile>, PersistenceError> {
        let data = self.data.read();
        let Some(owner) = data.owners.get(subject) else {
            return Ok(Vec::new());
        };
        Ok(owner
            .shared_profiles
            .iter()
            .map(|profile| {
                let record = data.owners.get(profile);
                AttachedProfile {
                    profile: profile.clone(),
                    name: record.map_or_else(|| profile.to_string(), |r| r.name.clone()),
                    application_name: record.map(|r| r.application.clone()).unwrap_or_default(),
                }
            })
            .collect())
    }
}

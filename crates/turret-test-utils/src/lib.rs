//! Testing utilities for the turret settings workspace
//!
//! In-memory collaborators, a deterministic id generator and fixture
//! schema documents.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use turret_core::{
    AttachedProfile, CommitEvent, CommitObserver, IdGenerator, LoadedValues, OwnershipProvider,
    PersistenceError, ValuePersistence,
};
use turret_model::{
    OwnerId, OwnerRef, SettingCategory, SettingDiff, SettingUid, SettingValue, Version,
    TERMINAL_DOCUMENT, TPO_DOCUMENT,
};
use turret_schema::SchemaStore;
use ulid::Ulid;

pub const TERMINAL_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<categories>
  <category name="profile" uid="CP">
    <groups>
      <group name="Audio" id="1">
        <settings>
          <setting id="10" name="maxVolume" type="tb" default_value="50"
                   basic_level="Y" mandatory="N" validator_require="Y"
                   validator_range="1;100;1" friendly_name="Max volume"
                   short_description="Loudest ring level"
                   contraint_description="1 to 100" />
          <setting id="11" name="ringtone" type="dd" default_value="chime1"
                   basic_level="Y" mandatory="N" friendly_name="Ringtone"
                   short_description="Incoming call tone">
            <choices>
              <choice value="chime1" text="Chime 1" />
              <choice value="chime2" text="Chime 2" />
              <choice value="chime3" />
            </choices>
            <settingsSettings>
              <settingsSetting name="maxVolume" />
            </settingsSettings>
          </setting>
          <setting id="12" name="mute" type="bl" default_value="true"
                   default_value_code="False" basic_level="Y" mandatory="N"
                   friendly_name="Mute" short_description="Start muted" />
          <setting id="13" name="audio.gain" type="tb" default_value="0"
                   basic_level="N" mandatory="Y" validator_range="-10;10;1"
                   friendly_name="Gain" short_description="Input gain" />
        </settings>
      </group>
      <group name="Display" id="2">
        <settings>
          <setting id="20" name="brightness" type="rb" default_value="mid"
                   basic_level="Y" mandatory="N" friendly_name="Brightness">
            <choices>
              <choice value="low" text="Low" />
              <choice value="mid" text="Medium" />
              <choice value="high" text="High" />
            </choices>
          </setting>
          <setting id="21" name="pin" type="pw" default_value=""
                   basic_level="Y" mandatory="N" validator_regex="\d{4}"
                   friendly_name="Unlock PIN" />
        </settings>
      </group>
    </groups>
  </category>
  <category name="boot" uid="CB">
    <groups>
      <group name="Network" id="3">
        <settings>
          <setting id="30" name="vlan" type="tb" default_value="1"
                   basic_level="Y" mandatory="N" validator_range="1;4094;1"
                   friendly_name="VLAN" />
          <setting id="31" name="dhcp" type="bl" default_value="true"
                   default_value_code="false" basic_level="Y" mandatory="N"
                   friendly_name="DHCP" />
        </settings>
      </group>
    </groups>
  </category>
</categories>"#;

pub const TPO_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<categories>
  <category name="boot" uid="TB">
    <groups>
      <group name="General" id="1">
        <settings>
          <setting id="40" name="ntpServer" type="tb" default_value="pool.ntp.org"
                   basic_level="Y" mandatory="N" validator_require="Y" />
        </settings>
      </group>
      <group name="TPO" id="2">
        <settings>
          <setting id="41" name="tradingDesk" type="tb" default_value="desk"
                   basic_level="Y" mandatory="N" />
        </settings>
      </group>
    </groups>
  </category>
  <category name="shared" uid="TS">
    <groups>
      <group name="General" id="3">
        <settings>
          <setting id="42" name="ntpServer" type="tb" default_value="pool.ntp.org"
                   basic_level="Y" mandatory="N" />
        </settings>
      </group>
      <group name="tpo" id="4">
        <settings>
          <setting id="43" name="tradingDesk" type="tb" default_value="desk"
                   basic_level="Y" mandatory="N" />
        </settings>
      </group>
    </groups>
  </category>
</categories>"#;

pub const TERMINAL_JSON: &str = r#"{
  "categories": [
    {
      "name": "profile",
      "uid": "CP",
      "groups": [
        {
          "name": "Audio",
          "id": "1",
          "settings": [
            {
              "id": "10",
              "name": "maxVolume",
              "type": "tb",
              "default_value": "50",
              "basic_level": "Y",
              "mandatory": "N",
              "validator_require": "Y",
              "validator_range": "1;100;1",
              "friendly_name": "Max volume",
              "contraint_description": "1 to 100",
              "choices": []
            },
            {
              "id": "11",
              "name": "ringtone",
              "type": "dd",
              "default_value": "chime1",
              "basic_level": "Y",
              "mandatory": "N",
              "choices": [
                { "Value": "chime1", "Text": "Chime 1" },
                { "Value": "chime2", "Text": null }
              ],
              "settingsSettings": ["maxVolume"]
            }
          ]
        }
      ]
    }
  ]
}"#;

/// Schema store holding the fixture documents
#[must_use]
pub fn fixture_schema_store() -> SchemaStore {
    let mut store = SchemaStore::in_memory();
    store.register_document(TERMINAL_DOCUMENT, TERMINAL_XML);
    store.register_document(TPO_DOCUMENT, TPO_XML);
    store
}

/// Persisted value
#[must_use]
pub fn stored_value(owner: &str, category: SettingCategory, key: &str, value: &str) -> SettingValue {
    SettingValue::loaded(
        SettingUid::new(),
        OwnerId::new(owner),
        category,
        key,
        value,
        Version(1),
    )
}

#[derive(Debug, Default)]
struct Rows {
    values: Vec<SettingValue>,
    versions: HashMap<OwnerId, Version>,
    fail_loads: bool,
}

/// Value storage in memory, counting calls
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    rows: Mutex<Rows>,
    fetch_calls: AtomicUsize,
    across_calls: AtomicUsize,
    commit_calls: AtomicUsize,
}

impl InMemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(self, owner: &str, category: SettingCategory, key: &str, value: &str) -> Self {
        self.insert(stored_value(owner, category, key, value));
        self
    }

    pub fn insert(&self, value: SettingValue) {
        let mut rows = self.rows.lock();
        rows.values
            .retain(|v| !(v.owner() == value.owner() && v.category() == value.category() && v.key() == value.key()));
        rows.values.push(value);
    }

    /// Move an owner's version as another session's commit would
    pub fn bump_owner_version(&self, owner: &str) -> Version {
        let mut rows = self.rows.lock();
        let version = rows.versions.entry(OwnerId::new(owner)).or_default();
        *version = version.next();
        *version
    }

    #[must_use]
    pub fn owner_version(&self, owner: &str) -> Version {
        self.rows
            .lock()
            .versions
            .get(&OwnerId::new(owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn fail_loads(&self, fail: bool) {
        self.rows.lock().fail_loads = fail;
    }

    /// Stored value of an owner's key, any category
    #[must_use]
    pub fn stored(&self, owner: &str, key: &str) -> Option<String> {
        self.rows
            .lock()
            .values
            .iter()
            .find(|v| v.owner().as_str() == owner && v.key() == key)
            .map(|v| v.value().to_string())
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.lock().values.len()
    }

    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn across_calls(&self) -> usize {
        self.across_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn commit_calls(&self) -> usize {
        self.commit_calls.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.fetch_calls.store(0, Ordering::SeqCst);
        self.across_calls.store(0, Ordering::SeqCst);
        self.commit_calls.store(0, Ordering::SeqCst);
    }
}

impl ValuePersistence for InMemoryPersistence {
    fn fetch_values(
        &self,
        owner: &OwnerId,
        category: SettingCategory,
    ) -> Result<LoadedValues, PersistenceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock();
        if rows.fail_loads {
            return Err(PersistenceError::Backend("database unreachable".into()));
        }
        Ok(LoadedValues {
            values: rows
                .values
                .iter()
                .filter(|v| v.owner() == owner && v.category() == category)
                .cloned()
                .collect(),
            owner_version: rows.versions.get(owner).copied().unwrap_or_default(),
        })
    }

    fn fetch_values_across_owners(
        &self,
        owners: &[OwnerId],
    ) -> Result<Vec<SettingValue>, PersistenceError> {
        self.across_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock();
        if rows.fail_loads {
            return Err(PersistenceError::Backend("database unreachable".into()));
        }
        Ok(rows
            .values
            .iter()
            .filter(|v| owners.contains(v.owner()))
            .cloned()
            .collect())
    }

    fn commit_values(
        &self,
        owner: &OwnerId,
        expected: Version,
        diff: &SettingDiff,
    ) -> Result<Version, PersistenceError> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock();
        let actual = rows.versions.get(owner).copied().unwrap_or_default();
        if actual != expected {
            return Err(PersistenceError::Conflict { expected, actual });
        }

        for gone in diff.deletes() {
            rows.values.retain(|v| v.uid() != gone.uid());
        }
        for changed in diff.updates() {
            if let Some(row) = rows.values.iter_mut().find(|v| v.uid() == changed.uid()) {
                row.set_value(changed.value());
            }
        }
        for added in diff.adds() {
            rows.values.push(SettingValue::loaded(
                added.uid(),
                added.owner().clone(),
                added.category(),
                added.key(),
                added.value(),
                added.version(),
            ));
        }

        let next = actual.next();
        rows.versions.insert(owner.clone(), next);
        Ok(next)
    }
}

/// Fixed ownership answers, counting calls
#[derive(Debug, Default)]
pub struct StaticOwnership {
    pub specific_zone: Option<OwnerRef>,
    pub system_zone: Option<OwnerRef>,
    pub model: Option<OwnerRef>,
    pub cluster_node: Option<OwnerRef>,
    pub shared_profiles: Vec<AttachedProfile>,
    calls: AtomicUsize,
}

impl StaticOwnership {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_specific_zone(mut self, zone_profile: &str, name: &str) -> Self {
        self.specific_zone = Some(OwnerRef::specific_zone(
            format!("zone-{zone_profile}"),
            OwnerId::new(zone_profile),
            name,
        ));
        self
    }

    #[must_use]
    pub fn with_system_zone(mut self, zone_profile: &str) -> Self {
        self.system_zone = Some(OwnerRef::system_zone(
            format!("zone-{zone_profile}"),
            OwnerId::new(zone_profile),
            "System",
        ));
        self
    }

    #[must_use]
    pub fn with_model(mut self, model_profile: &str, name: &str) -> Self {
        self.model = Some(OwnerRef::model(
            format!("model-{model_profile}"),
            OwnerId::new(model_profile),
            name,
        ));
        self
    }

    #[must_use]
    pub fn with_cluster_node(mut self, cluster_profile: &str, name: &str) -> Self {
        self.cluster_node = Some(OwnerRef::cluster_node(OwnerId::new(cluster_profile), name));
        self
    }

    #[must_use]
    pub fn with_shared_profile(mut self, profile: &str, name: &str, application: &str) -> Self {
        self.shared_profiles.push(AttachedProfile {
            profile: OwnerId::new(profile),
            name: name.to_string(),
            application_name: application.to_string(),
        });
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl OwnershipProvider for StaticOwnership {
    fn specific_zone(&self, _subject: &OwnerId) -> Result<Option<OwnerRef>, PersistenceError> {
        self.count();
        Ok(self.specific_zone.clone())
    }

    fn system_zone(&self, name: &str) -> Result<Option<OwnerRef>, PersistenceError> {
        self.count();
        Ok(self
            .system_zone
            .clone()
            .filter(|z| z.display_name.eq_ignore_ascii_case(name)))
    }

    fn model(&self, _subject: &OwnerId) -> Result<Option<OwnerRef>, PersistenceError> {
        self.count();
        Ok(self.model.clone())
    }

    fn cluster_node(&self, _subject: &OwnerId) -> Result<Option<OwnerRef>, PersistenceError> {
        self.count();
        Ok(self.cluster_node.clone())
    }

    fn shared_profiles(&self, _subject: &OwnerId) -> Result<Vec<AttachedProfile>, PersistenceError> {
        self.count();
        Ok(self.shared_profiles.clone())
    }
}

/// Ids counting up from 1
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_uid(&self) -> SettingUid {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        SettingUid(Ulid::from_parts(0, u128::from(n)))
    }

    fn next_version(&self) -> Version {
        Version(self.next.load(Ordering::SeqCst))
    }
}

/// Observer recording every call
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub committed: Mutex<Vec<CommitEvent>>,
    pub boot_saves: AtomicUsize,
    pub global_requests: AtomicUsize,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl CommitObserver for RecordingObserver {
    fn committed(&self, event: &CommitEvent) {
        self.committed.lock().push(event.clone());
    }

    fn boot_settings_saved(&self, _event: &CommitEvent) {
        self.boot_saves.fetch_add(1, Ordering::SeqCst);
    }

    fn global_config_requested(&self, _event: &CommitEvent) {
        self.global_requests.fetch_add(1, Ordering::SeqCst);
    }
}

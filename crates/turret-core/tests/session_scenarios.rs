use pretty_assertions::assert_eq;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use turret_core::{
    Collaborators, EditorConfig, EditorError, SettingsSession, Subject, SubjectOptions,
};
use turret_form::{FormError, FormState, ViolationKind};
use turret_model::{OwnerId, SettingCategory, Version};
use turret_test_utils::{
    fixture_schema_store, InMemoryPersistence, RecordingObserver, SequentialIds, StaticOwnership,
};

fn collaborators(persistence: &Arc<InMemoryPersistence>, ownership: StaticOwnership) -> Collaborators {
    Collaborators {
        schemas: Arc::new(fixture_schema_store()),
        persistence: persistence.clone(),
        ownership: Arc::new(ownership),
        ids: Arc::new(SequentialIds::new()),
    }
}

fn open(
    persistence: &Arc<InMemoryPersistence>,
    ownership: StaticOwnership,
    subject: Subject,
) -> Result<SettingsSession, EditorError> {
    SettingsSession::open(EditorConfig::default(), subject, collaborators(persistence, ownership))
}

fn profile_subject() -> Subject {
    Subject::new(OwnerId::new("P1"), SettingCategory::TerminalProfile)
}

fn inheriting(subject: Subject) -> Subject {
    subject.with_options(
        SubjectOptions::new()
            .with_shared_profile(false)
            .with_display_inherited(true),
    )
}

/// Tenet: An unset setting renders its default, disabled, and enabling then
/// saving it stores that default
#[test]
fn enable_and_save_stores_default() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();
    assert_eq!(session.selected_group(), Some("Audio"));

    let form = session.render().unwrap();
    let volume = form.setting("maxVolume").unwrap();
    assert!(!volume.available);
    assert!(!volume.control.enabled);
    assert_eq!(volume.control.value(), Some("50"));

    let form = session
        .enable_setting("10", &FormState::from_rendered(&form))
        .unwrap();
    assert!(form.setting("maxVolume").unwrap().available);

    let outcome = session.save(&FormState::from_rendered(&form)).unwrap();
    assert_eq!(outcome.version, Version(1));
    assert_eq!(outcome.diff.adds().len(), 1);
    assert_eq!(persistence.stored("P1", "maxVolume").as_deref(), Some("50"));
    assert!(outcome.form.setting("maxVolume").unwrap().available);
    assert!(!session.values().unwrap().is_dirty());
}

/// Tenet: Toggling a setting off and saving removes its value
#[test]
fn toggle_off_and_save_removes_value() {
    let persistence = Arc::new(InMemoryPersistence::new().with_value(
        "P1",
        SettingCategory::TerminalProfile,
        "ringtone",
        "chime2",
    ));
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();

    let mut state = FormState::from_rendered(&session.render().unwrap());
    state.disable("ringtone");
    let outcome = session.save(&state).unwrap();

    assert_eq!(outcome.diff.deletes().len(), 1);
    assert_eq!(persistence.stored("P1", "ringtone"), None);
    assert!(!outcome.form.setting("ringtone").unwrap().available);
}

/// Tenet: Toggling a setting back on before saving restores its value
#[test]
fn toggle_back_on_restores_value() {
    let persistence = Arc::new(InMemoryPersistence::new().with_value(
        "P1",
        SettingCategory::TerminalProfile,
        "ringtone",
        "chime2",
    ));
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();

    let mut state = FormState::from_rendered(&session.render().unwrap());
    state.disable("ringtone");
    session
        .apply(&state, &turret_core::ReconcileTrigger::GroupSwitch)
        .unwrap();
    assert!(!session.render().unwrap().setting("ringtone").unwrap().available);

    let form = session.enable_setting("11", &state).unwrap();
    let ringtone = form.setting("ringtone").unwrap();
    assert!(ringtone.available);
    assert_eq!(ringtone.control.value(), Some("chime2"));
    assert!(!session.values().unwrap().is_dirty());
}

/// Tenet: An enabled field outside its range blocks the save
#[test]
fn range_violation_blocks_commit() {
    let persistence = Arc::new(InMemoryPersistence::new().with_value(
        "P1",
        SettingCategory::TerminalProfile,
        "maxVolume",
        "150",
    ));
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();

    let state = FormState::from_rendered(&session.render().unwrap());
    let err = session.save(&state).unwrap_err();
    assert!(err.is_field_level());
    assert_eq!(err.violations().len(), 1);
    assert_eq!(err.violations()[0].kind, ViolationKind::Range);
    assert_eq!(err.violations()[0].control_id, "setting_maxVolume");
    assert_eq!(persistence.commit_calls(), 0);
}

/// Tenet: A commit against a moved owner version fails and keeps local edits
#[test]
fn concurrent_save_is_a_conflict() {
    let persistence = Arc::new(InMemoryPersistence::new().with_value(
        "P1",
        SettingCategory::TerminalProfile,
        "ringtone",
        "chime1",
    ));
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();
    persistence.bump_owner_version("P1");

    let mut state = FormState::from_rendered(&session.render().unwrap());
    state.enable("ringtone", "chime3");
    let err = session.save(&state).unwrap_err();
    assert!(matches!(
        err,
        EditorError::PersistenceConflict {
            expected: Version(0),
            actual: Version(1),
            ..
        }
    ));
    assert!(err.requires_refresh());
    assert_eq!(persistence.stored("P1", "ringtone").as_deref(), Some("chime1"));
    assert!(session.values().unwrap().is_dirty());

    session.refresh().unwrap();
    assert!(!session.values().unwrap().is_dirty());
    session.save(&state).unwrap();
    assert_eq!(persistence.stored("P1", "ringtone").as_deref(), Some("chime3"));
    assert_eq!(persistence.owner_version("P1"), Version(2));
}

/// Tenet: A failed load disables the session until a refresh succeeds
#[test]
fn load_failure_disables_session() {
    let persistence = Arc::new(InMemoryPersistence::new());
    persistence.fail_loads(true);
    let err = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap_err();
    assert!(err.is_structural());

    persistence.fail_loads(false);
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();

    persistence.fail_loads(true);
    assert!(session.refresh().is_err());
    assert!(!session.is_available());
    assert!(matches!(
        session.render(),
        Err(EditorError::Unavailable { .. })
    ));

    persistence.fail_loads(false);
    session.refresh().unwrap();
    assert!(session.render().is_ok());
}

/// Tenet: A missing schema document is fatal
#[test]
fn missing_schema_is_structural() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let subject = Subject::new(OwnerId::new("N1"), SettingCategory::NetrixProfile);
    let err = open(&persistence, StaticOwnership::new(), subject).unwrap_err();
    assert!(matches!(err, EditorError::Schema(ref e) if e.is_not_found()));
    assert!(err.is_structural());
}

/// Tenet: Subjects without save permission render read-only and cannot save
#[test]
fn save_requires_permission() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let subject = profile_subject().with_options(SubjectOptions::new().with_can_save(false));
    let mut session = open(&persistence, StaticOwnership::new(), subject).unwrap();

    let form = session.render().unwrap();
    assert!(form.read_only);
    let err = session.save(&FormState::from_rendered(&form)).unwrap_err();
    assert!(matches!(err, EditorError::Unavailable { .. }));
    assert_eq!(persistence.commit_calls(), 0);
}

/// Tenet: Two shared profiles defining a key are reported as a conflict
#[test]
fn shared_profiles_conflict() {
    let persistence = Arc::new(
        InMemoryPersistence::new()
            .with_value("PA", SettingCategory::TerminalProfile, "ringtone", "chime1")
            .with_value("PB", SettingCategory::TpoShared, "ringtone", "chime2"),
    );
    let ownership = StaticOwnership::new()
        .with_shared_profile("PA", "Sales", "Turret")
        .with_shared_profile("PB", "Desk", "TPO");
    let session = open(&persistence, ownership, inheriting(profile_subject())).unwrap();

    let form = session.render().unwrap();
    assert!(form.show_inherited);
    let ringtone = form.setting("ringtone").unwrap();
    assert!(ringtone.has_conflict);
    let entries = &ringtone.inherited.as_ref().unwrap().entries;
    let labels: Vec<&str> = entries.iter().map(|e| e.source_label.as_str()).collect();
    assert_eq!(labels, vec!["Sales", "Desk"]);
    assert_eq!(
        entries[0].source_link,
        "GeneralEditionForm.aspx?action=edit&type=turretprofile&item=PA"
    );
    assert_eq!(
        entries[1].source_link,
        "GeneralEditionForm.aspx?action=edit&type=tpoprofile&item=PB"
    );

    let volume = form.setting("maxVolume").unwrap();
    assert!(!volume.has_conflict);
    assert!(volume.inherited_text.is_none());
}

/// Tenet: Boot settings inherit from the most specific owner only
#[test]
fn boot_chain_stops_at_first_owner() {
    let persistence = Arc::new(
        InMemoryPersistence::new()
            .with_value("ZA", SettingCategory::TerminalBoot, "vlan", "100")
            .with_value("SYS", SettingCategory::TerminalBoot, "vlan", "1"),
    );
    let ownership = StaticOwnership::new()
        .with_specific_zone("ZA", "Zone A")
        .with_system_zone("SYS");
    let subject = inheriting(Subject::new(OwnerId::new("T1"), SettingCategory::TerminalBoot));
    let session = open(&persistence, ownership, subject).unwrap();
    let form = session.render().unwrap();

    let vlan = form.setting("vlan").unwrap();
    assert!(!vlan.has_conflict);
    let result = vlan.inherited.as_ref().unwrap();
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].source_label, "Zone A");
    assert_eq!(result.entries[0].value, "100");
    assert!(vlan.inherited_text.as_deref().unwrap().contains("Zone A"));
}

/// Tenet: The inherited column needs an unshared subject that asked for it
#[test]
fn inherited_column_is_opt_in() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();
    let form = session.render().unwrap();
    assert!(!form.show_inherited);
    assert!(form.settings.iter().all(|s| s.inherited.is_none()));
}

/// Tenet: Shared TPO profiles do not see the TPO group
#[test]
fn tpo_group_hidden_for_shared_profiles() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let shared = Subject::new(OwnerId::new("S1"), SettingCategory::TpoShared);
    let session = open(&persistence, StaticOwnership::new(), shared).unwrap();
    let names: Vec<String> = session.groups().unwrap().into_iter().map(|g| g.name).collect();
    assert_eq!(names, vec!["General".to_string()]);

    let node = Subject::new(OwnerId::new("N1"), SettingCategory::TpoBoot)
        .with_options(SubjectOptions::new().with_shared_profile(false));
    let mut session = open(&persistence, StaticOwnership::new(), node).unwrap();
    assert_eq!(session.groups().unwrap().len(), 2);
    session.select_group("TPO", None).unwrap();
    assert_eq!(session.selected_group(), Some("TPO"));
}

/// Tenet: Selecting an unknown group is refused and keeps the selection
#[test]
fn unknown_group_is_refused() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();
    let err = session.select_group("Nope", None).unwrap_err();
    assert!(matches!(err, EditorError::Form(_)));
    assert_eq!(session.selected_group(), Some("Audio"));
}

/// Tenet: Edits survive switching groups and are discarded on close
#[test]
fn group_switch_keeps_edits() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();

    let mut state = FormState::from_rendered(&session.render().unwrap());
    state.enable("maxVolume", "80");
    let diff = session.select_group("Display", Some(&state)).unwrap();
    assert_eq!(diff.adds().len(), 1);
    assert_eq!(session.selected_group(), Some("Display"));

    session.select_group("Audio", None).unwrap();
    let form = session.render().unwrap();
    assert_eq!(form.setting("maxVolume").unwrap().control.value(), Some("80"));

    let discarded = session.close();
    assert_eq!(discarded.len(), 1);
    assert_eq!(persistence.commit_calls(), 0);
}

/// Tenet: An invalid field blocks leaving its group, so a save from another
/// group can never commit it
#[test]
fn invalid_field_blocks_group_switch() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();

    let mut state = FormState::from_rendered(&session.render().unwrap());
    state.enable("maxVolume", "150");
    let err = session.select_group("Display", Some(&state)).unwrap_err();
    assert!(err.is_field_level());
    assert_eq!(err.violations()[0].key, "maxVolume");
    assert_eq!(err.violations()[0].kind, ViolationKind::Range);
    assert_eq!(session.selected_group(), Some("Audio"));
    assert!(!session.values().unwrap().is_dirty());

    // Abandon the edit and save whatever the group shows now.
    session.select_group("Display", None).unwrap();
    let display = session.render().unwrap();
    session.save(&FormState::from_rendered(&display)).unwrap();
    assert_eq!(persistence.stored("P1", "maxVolume"), None);
}

/// Tenet: Enabling a setting outside the selected group is a form error
#[test]
fn enabling_unknown_setting_is_a_form_error() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject()).unwrap();
    let state = FormState::from_rendered(&session.render().unwrap());

    let err = session.enable_setting("99", &state).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Form(FormError::UnknownSetting { ref setting_id, .. }) if setting_id == "99"
    ));
    assert!(!err.is_structural());
    assert!(!err.requires_refresh());
    assert!(session.is_available());
}

/// Tenet: Observers hear about boot saves and configuration rebuild requests
#[test]
fn observers_are_notified() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let observer = RecordingObserver::new();
    let subject = Subject::new(OwnerId::new("T1"), SettingCategory::TerminalBoot).with_options(
        SubjectOptions::new().with_reconstruct_global_config(true),
    );
    let mut session = open(&persistence, StaticOwnership::new(), subject)
        .unwrap()
        .with_observer(observer.clone());

    let mut state = FormState::from_rendered(&session.render().unwrap());
    state.enable("vlan", "12");
    session.save(&state).unwrap();

    let committed = observer.committed.lock();
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].adds, 1);
    assert_eq!(committed[0].category, SettingCategory::TerminalBoot);
    assert_eq!(observer.boot_saves.load(Ordering::SeqCst), 1);
    assert_eq!(observer.global_requests.load(Ordering::SeqCst), 1);
}

/// Tenet: Profile saves do not report boot changes
#[test]
fn profile_save_is_not_a_boot_save() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let observer = RecordingObserver::new();
    let mut session = open(&persistence, StaticOwnership::new(), profile_subject())
        .unwrap()
        .with_observer(observer.clone());

    let mut state = FormState::from_rendered(&session.render().unwrap());
    state.enable("ringtone", "chime2");
    session.save(&state).unwrap();
    assert_eq!(observer.boot_saves.load(Ordering::SeqCst), 0);
    assert_eq!(observer.global_requests.load(Ordering::SeqCst), 0);
}

/// Tenet: Rendering reads the snapshot, never persistence
#[test]
fn snapshot_loaded_once_per_session() {
    let persistence = Arc::new(
        InMemoryPersistence::new()
            .with_value("ZA", SettingCategory::TerminalBoot, "vlan", "100"),
    );
    let ownership = StaticOwnership::new()
        .with_specific_zone("ZA", "Zone A")
        .with_model("M1", "Model 1")
        .with_system_zone("SYS");
    let subject = inheriting(Subject::new(OwnerId::new("T1"), SettingCategory::TerminalBoot));
    let session = open(&persistence, ownership, subject).unwrap();

    // own values plus one collection per chain owner
    assert_eq!(persistence.fetch_calls(), 4);
    assert_eq!(persistence.across_calls(), 0);

    for _ in 0..3 {
        session.render().unwrap();
    }
    assert_eq!(persistence.fetch_calls(), 4);
}

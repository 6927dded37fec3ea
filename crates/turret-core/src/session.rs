//! Editing session of one subject
//!
//! A session owns everything loaded for one subject: the schema, the value
//! store, the ownership chain and the inheritance snapshot. They are loaded
//! together on open and on refresh, never per setting. Two sessions never
//! share state; concurrent saves meet at the version check of the commit.

use crate::collaborators::{
    CommitEvent, CommitObserver, IdGenerator, OwnershipProvider, ValuePersistence,
};
use crate::config::{EditorConfig, SubjectOptions};
use crate::error::{EditorError, PersistenceError};
use crate::reconciler::{ReconcileTrigger, Reconciler};
use crate::store::ValueStore;
use std::sync::Arc;
use turret_form::{
    validate_form, visible_groups, FieldState, FormError, FormRenderer, FormState, GroupSummary,
    InheritedColumn, RenderedForm,
};
use turret_inherit::{InheritanceResolver, InheritanceSnapshot, OwnershipChain};
use turret_model::{OwnerId, OwnerRef, ProfileKind, SettingCategory, SettingDiff, Version};
use turret_schema::{Schema, SchemaLoader, SchemaSetting, ViewMode};

/// Profile being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Profile uid
    pub id: OwnerId,
    /// Category edited
    pub category: SettingCategory,
    /// How it is edited
    pub options: SubjectOptions,
}

impl Subject {
    /// Subject with default options
    #[must_use]
    pub fn new(id: OwnerId, category: SettingCategory) -> Self {
        Self {
            id,
            category,
            options: SubjectOptions::default(),
        }
    }

    /// Set options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: SubjectOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether forms carry the inherited-value column
    #[inline]
    #[must_use]
    pub fn shows_inherited(&self) -> bool {
        !self.options.shared_profile && self.options.display_inherited
    }
}

/// External services a session talks to
#[derive(Clone)]
pub struct Collaborators {
    /// Schema documents
    pub schemas: Arc<dyn SchemaLoader>,
    /// Value storage
    pub persistence: Arc<dyn ValuePersistence>,
    /// Ownership lookups
    pub ownership: Arc<dyn OwnershipProvider>,
    /// Ids for new rows
    pub ids: Arc<dyn IdGenerator>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Result of a successful save
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// Owner version after the commit
    pub version: Version,
    /// Changes written
    pub diff: SettingDiff,
    /// Form re-rendered from the reloaded values
    pub form: RenderedForm,
}

#[derive(Debug)]
struct Loaded {
    schema: Arc<Schema>,
    store: ValueStore,
    chain: OwnershipChain,
    snapshot: InheritanceSnapshot,
}

#[derive(Debug)]
enum Phase {
    Ready(Box<Loaded>),
    Failed { reason: String },
}

/// Session editing one subject's settings
pub struct SettingsSession {
    subject: Subject,
    config: EditorConfig,
    collaborators: Collaborators,
    resolver: InheritanceResolver,
    observers: Vec<Arc<dyn CommitObserver>>,
    view: ViewMode,
    group: Option<String>,
    phase: Phase,
}

impl std::fmt::Debug for SettingsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsSession")
            .field("subject", &self.subject)
            .field("view", &self.view)
            .field("group", &self.group)
            .field("observers", &self.observers.len())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl SettingsSession {
    /// Load everything the subject's forms need and select the first group
    ///
    /// # Errors
    /// Fails when the schema document is missing or any load fails.
    pub fn open(
        config: EditorConfig,
        subject: Subject,
        collaborators: Collaborators,
    ) -> Result<Self, EditorError> {
        let resolver = InheritanceResolver::new(config.links.clone());
        let loaded = load(&subject, &config, &collaborators, &resolver)?;
        let view = ViewMode::from_basic_level(config.basic_level);

        let mut session = Self {
            subject,
            config,
            collaborators,
            resolver,
            observers: Vec::new(),
            view,
            group: None,
            phase: Phase::Ready(Box::new(loaded)),
        };
        session.group = session.groups()?.into_iter().next().map(|g| g.name);

        tracing::info!(
            "Opened settings of {} ({}), group {:?}",
            session.subject.id,
            session.subject.category,
            session.group
        );
        Ok(session)
    }

    /// Add a commit observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn CommitObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Use a custom resolver
    #[must_use]
    pub fn with_resolver(mut self, resolver: InheritanceResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Subject being edited
    #[inline]
    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current view mode
    #[inline]
    #[must_use]
    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Switch view mode
    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    /// Switch between the basic and expert views
    pub fn set_basic_level(&mut self, basic_level: bool) {
        self.view = ViewMode::from_basic_level(basic_level);
    }

    /// Selected group, if any
    #[inline]
    #[must_use]
    pub fn selected_group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Whether the last load succeeded
    #[inline]
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    /// Loaded schema document
    pub fn schema(&self) -> Result<&Schema, EditorError> {
        Ok(&self.loaded()?.schema)
    }

    /// Subject's values
    pub fn values(&self) -> Result<&ValueStore, EditorError> {
        Ok(&self.loaded()?.store)
    }

    /// Owners the subject inherits from
    pub fn chain(&self) -> Result<&OwnershipChain, EditorError> {
        Ok(&self.loaded()?.chain)
    }

    /// Reload values, chain and snapshot, dropping unsaved edits
    ///
    /// A failed reload leaves the session unavailable until a later refresh
    /// succeeds.
    pub fn refresh(&mut self) -> Result<(), EditorError> {
        match load(&self.subject, &self.config, &self.collaborators, &self.resolver) {
            Ok(loaded) => {
                self.phase = Phase::Ready(Box::new(loaded));
                let groups = self.groups()?;
                let still_visible = self
                    .group
                    .as_deref()
                    .is_some_and(|current| groups.iter().any(|g| g.name == current));
                if !still_visible {
                    self.group = groups.into_iter().next().map(|g| g.name);
                }
                tracing::info!("Refreshed settings of {}", self.subject.id);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Refresh of {} failed: {}", self.subject.id, err);
                self.phase = Phase::Failed {
                    reason: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// Groups offered to the subject, in document order
    pub fn groups(&self) -> Result<Vec<GroupSummary>, EditorError> {
        let loaded = self.loaded()?;
        Ok(visible_groups(
            &loaded.schema,
            self.subject.category,
            self.subject.options.shared_profile,
        )?)
    }

    /// Select a group
    ///
    /// When `state` is given, the current group's form state is validated
    /// and reconciled first so edits survive navigation. Returns the changes
    /// of that pass. An invalid field keeps the current group selected and
    /// leaves the value store untouched.
    pub fn select_group(
        &mut self,
        group: &str,
        state: Option<&FormState>,
    ) -> Result<SettingDiff, EditorError> {
        if !self.groups()?.iter().any(|g| g.name == group) {
            return Err(FormError::UnknownGroup {
                category: self.subject.category.schema_category_name().to_string(),
                group: group.to_string(),
            }
            .into());
        }

        let diff = match state {
            Some(state) if self.group.is_some() => {
                self.validate(state)?;
                self.apply(state, &ReconcileTrigger::GroupSwitch)?
            }
            _ => SettingDiff::new(),
        };
        self.group = Some(group.to_string());
        tracing::debug!("Selected group {} for {}", group, self.subject.id);
        Ok(diff)
    }

    /// Render the selected group
    pub fn render(&self) -> Result<RenderedForm, EditorError> {
        let loaded = self.loaded()?;
        let group = self.group.as_deref().ok_or(EditorError::NoGroupSelected)?;

        let mut renderer = FormRenderer::new(&loaded.schema);
        if self.subject.shows_inherited() {
            renderer = renderer.with_inherited(InheritedColumn {
                resolver: &self.resolver,
                chain: &loaded.chain,
                lookup: &loaded.snapshot,
            });
        }
        let mut form = renderer.render(self.subject.category, group, self.view, &loaded.store)?;
        form.read_only = !self.subject.options.can_save;
        Ok(form)
    }

    /// Reconcile form state of the selected group into the value store
    pub fn apply(
        &mut self,
        state: &FormState,
        trigger: &ReconcileTrigger,
    ) -> Result<SettingDiff, EditorError> {
        let group = self.group.clone().ok_or(EditorError::NoGroupSelected)?;
        let category = self.subject.category;
        let view = self.view;
        let ids = Arc::clone(&self.collaborators.ids);
        let loaded = self.loaded_mut()?;
        let schema = Arc::clone(&loaded.schema);

        let settings = group_settings(&schema, category, &group, view)?;
        Ok(Reconciler::new(ids.as_ref()).apply(settings, state, trigger, &mut loaded.store))
    }

    /// Switch a setting's toggle on and re-render
    ///
    /// The setting takes its existing value back, or the enabled default,
    /// whatever its control held in `state`.
    pub fn enable_setting(
        &mut self,
        setting_id: &str,
        state: &FormState,
    ) -> Result<RenderedForm, EditorError> {
        let group = self.group.clone().ok_or(EditorError::NoGroupSelected)?;
        let schema = Arc::clone(&self.loaded()?.schema);
        let setting = group_settings(&schema, self.subject.category, &group, self.view)?
            .into_iter()
            .find(|s| s.id == setting_id)
            .ok_or_else(|| FormError::UnknownSetting {
                group: group.clone(),
                setting_id: setting_id.to_string(),
            })?;

        let mut state = state.clone();
        state.set(setting.key.clone(), FieldState::just_enabled());
        self.apply(&state, &ReconcileTrigger::enabled(setting_id))?;
        self.render()
    }

    /// Validate, reconcile and commit the selected group, then reload
    ///
    /// Nothing is written when a field fails validation. On a version
    /// conflict local edits are kept and the caller must refresh.
    pub fn save(&mut self, state: &FormState) -> Result<SaveOutcome, EditorError> {
        if !self.subject.options.can_save {
            return Err(EditorError::Unavailable {
                reason: format!("saving settings of {} is not permitted", self.subject.id),
            });
        }

        self.validate(state)?;
        self.apply(state, &ReconcileTrigger::Save)?;
        let persistence = Arc::clone(&self.collaborators.persistence);
        let receipt = self.loaded_mut()?.store.commit(persistence.as_ref())?;

        self.refresh()?;
        let form = self.render()?;

        let event = CommitEvent::new(
            self.subject.id.clone(),
            self.subject.category,
            receipt.version,
            &receipt.diff,
        );
        self.notify(&event);

        Ok(SaveOutcome {
            version: receipt.version,
            diff: receipt.diff,
            form,
        })
    }

    /// End the session, returning the changes that were never saved
    #[must_use]
    pub fn close(self) -> SettingDiff {
        let discarded = match &self.phase {
            Phase::Ready(loaded) => loaded.store.pending_diff(),
            Phase::Failed { .. } => SettingDiff::new(),
        };
        if !discarded.is_empty() {
            tracing::info!(
                "Closing settings of {} with {} unsaved change(s)",
                self.subject.id,
                discarded.len()
            );
        }
        discarded
    }

    fn validate(&self, state: &FormState) -> Result<(), EditorError> {
        let violations = validate_form(&self.render()?, state);
        if violations.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            "{} invalid field(s) in group {:?} of {}",
            violations.len(),
            self.group,
            self.subject.id
        );
        Err(EditorError::ValidationFailed { violations })
    }

    fn notify(&self, event: &CommitEvent) {
        let boot = self.subject.category.is_boot();
        let reconstruct = self.subject.options.reconstruct_global_config;
        for observer in &self.observers {
            observer.committed(event);
            if boot {
                observer.boot_settings_saved(event);
            }
            if reconstruct {
                observer.global_config_requested(event);
            }
        }
    }

    fn loaded(&self) -> Result<&Loaded, EditorError> {
        match &self.phase {
            Phase::Ready(loaded) => Ok(loaded),
            Phase::Failed { reason } => Err(EditorError::Unavailable {
                reason: reason.clone(),
            }),
        }
    }

    fn loaded_mut(&mut self) -> Result<&mut Loaded, EditorError> {
        match &mut self.phase {
            Phase::Ready(loaded) => Ok(loaded),
            Phase::Failed { reason } => Err(EditorError::Unavailable {
                reason: reason.clone(),
            }),
        }
    }
}

fn group_settings<'s>(
    schema: &'s Schema,
    category: SettingCategory,
    group: &str,
    view: ViewMode,
) -> Result<Vec<&'s SchemaSetting>, EditorError> {
    Ok(schema
        .find_category(category.schema_category_name())?
        .find_group(group)?
        .list_settings_for(view))
}

fn load(
    subject: &Subject,
    config: &EditorConfig,
    collaborators: &Collaborators,
    resolver: &InheritanceResolver,
) -> Result<Loaded, EditorError> {
    let schema = collaborators
        .schemas
        .load_schema(subject.category.document_name())?;
    schema.find_category(subject.category.schema_category_name())?;

    let persistence = collaborators.persistence.as_ref();
    let store = ValueStore::load(persistence, &subject.id, subject.category)?;

    let chain = build_chain(subject, config, collaborators.ownership.as_ref()).map_err(
        |source| EditorError::ValueLoadFailed {
            owner: subject.id.clone(),
            source,
        },
    )?;
    let snapshot = load_snapshot(&chain, resolver, persistence)?;

    tracing::debug!(
        "Loaded {} inherited values from {} owners for {}",
        snapshot.value_count(),
        snapshot.owner_count(),
        subject.id
    );
    Ok(Loaded {
        schema,
        store,
        chain,
        snapshot,
    })
}

fn build_chain(
    subject: &Subject,
    config: &EditorConfig,
    ownership: &dyn OwnershipProvider,
) -> Result<OwnershipChain, PersistenceError> {
    let id = &subject.id;
    let chain = OwnershipChain::new(id.clone(), subject.category);
    let chain = match subject.category.merged() {
        SettingCategory::TerminalBoot => chain
            .with_model(ownership.model(id)?)
            .with_specific_zone(ownership.specific_zone(id)?)
            .with_system_zone(ownership.system_zone(&config.system_zone_name)?),
        SettingCategory::TpoBoot => chain
            .with_cluster_node(ownership.cluster_node(id)?)
            .with_specific_zone(ownership.specific_zone(id)?)
            .with_system_zone(ownership.system_zone(&config.system_zone_name)?),
        SettingCategory::TerminalProfile if subject.shows_inherited() => {
            let profiles = ownership
                .shared_profiles(id)?
                .into_iter()
                .map(|p| {
                    let kind = ProfileKind::from_application(
                        &p.application_name,
                        &config.tpo_application_name,
                    );
                    OwnerRef::shared_profile(p.profile, &p.name, kind)
                })
                .collect();
            chain.with_shared_profiles(profiles)
        }
        _ => chain,
    };
    Ok(chain)
}

fn load_snapshot(
    chain: &OwnershipChain,
    resolver: &InheritanceResolver,
    persistence: &dyn ValuePersistence,
) -> Result<InheritanceSnapshot, EditorError> {
    let failed = |owner: &OwnerId| {
        let owner = owner.clone();
        move |source: PersistenceError| EditorError::ValueLoadFailed { owner, source }
    };

    let mut snapshot = InheritanceSnapshot::new();
    for strategy in resolver.strategies().iter() {
        let Some(owner) = strategy.select(chain) else {
            continue;
        };
        let category = strategy.lookup_category(chain.category());
        let loaded = persistence
            .fetch_values(&owner.profile, category)
            .map_err(failed(&owner.profile))?;
        snapshot.extend(loaded.values);
    }

    let shared: Vec<OwnerId> = chain
        .shared_profiles()
        .iter()
        .map(|p| p.profile.clone())
        .collect();
    if !shared.is_empty() {
        let values = persistence
            .fetch_values_across_owners(&shared)
            .map_err(failed(chain.subject()))?;
        snapshot.extend(values);
    }
    Ok(snapshot)
}

//! Ownership chain of a subject

use turret_model::{OwnerId, OwnerKind, OwnerRef, SettingCategory};

/// Owners a subject may inherit settings from
///
/// Holds at most one owner per single-owner layer and any number of shared
/// profiles. Which layers are populated depends on the subject's category;
/// the session decides that when it loads the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipChain {
    subject: OwnerId,
    category: SettingCategory,
    cluster_node: Option<OwnerRef>,
    specific_zone: Option<OwnerRef>,
    model: Option<OwnerRef>,
    system_zone: Option<OwnerRef>,
    shared_profiles: Vec<OwnerRef>,
}

impl OwnershipChain {
    /// Empty chain for a subject
    #[must_use]
    pub fn new(subject: OwnerId, category: SettingCategory) -> Self {
        Self {
            subject,
            category,
            cluster_node: None,
            specific_zone: None,
            model: None,
            system_zone: None,
            shared_profiles: Vec::new(),
        }
    }

    /// Set cluster node owner
    #[must_use]
    pub fn with_cluster_node(mut self, owner: Option<OwnerRef>) -> Self {
        self.cluster_node = owner;
        self
    }

    /// Set specific zone owner
    #[must_use]
    pub fn with_specific_zone(mut self, owner: Option<OwnerRef>) -> Self {
        self.specific_zone = owner;
        self
    }

    /// Set device model owner
    #[must_use]
    pub fn with_model(mut self, owner: Option<OwnerRef>) -> Self {
        self.model = owner;
        self
    }

    /// Set system zone owner
    #[must_use]
    pub fn with_system_zone(mut self, owner: Option<OwnerRef>) -> Self {
        self.system_zone = owner;
        self
    }

    /// Set attached shared profiles; repeated profiles are kept once
    #[must_use]
    pub fn with_shared_profiles(mut self, profiles: Vec<OwnerRef>) -> Self {
        self.shared_profiles.clear();
        for profile in profiles {
            if !self.shared_profiles.iter().any(|p| p.profile == profile.profile) {
                self.shared_profiles.push(profile);
            }
        }
        self
    }

    /// Subject the chain belongs to
    #[inline]
    #[must_use]
    pub fn subject(&self) -> &OwnerId {
        &self.subject
    }

    /// Subject's (unmerged) category
    #[inline]
    #[must_use]
    pub fn category(&self) -> SettingCategory {
        self.category
    }

    /// Owner of a single-owner layer
    #[must_use]
    pub fn owner(&self, kind: OwnerKind) -> Option<&OwnerRef> {
        match kind {
            OwnerKind::ClusterNode => self.cluster_node.as_ref(),
            OwnerKind::SpecificZone => self.specific_zone.as_ref(),
            OwnerKind::Model => self.model.as_ref(),
            OwnerKind::SystemZone => self.system_zone.as_ref(),
            OwnerKind::SharedProfile(_) => None,
        }
    }

    /// Attached shared profiles
    #[inline]
    #[must_use]
    pub fn shared_profiles(&self) -> &[OwnerRef] {
        &self.shared_profiles
    }

    /// Every owner in the chain, single-owner layers first
    pub fn owners(&self) -> impl Iterator<Item = &OwnerRef> {
        [
            &self.cluster_node,
            &self.specific_zone,
            &self.model,
            &self.system_zone,
        ]
        .into_iter()
        .flatten()
        .chain(self.shared_profiles.iter())
    }

    /// Whether no layer has an owner
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners().next().is_none()
    }
}

//! Ownership layers
//!
//! Higher-level entities a subject can inherit settings from. Each one owns
//! its settings through a profile uid, but is linked to by its own entity id.

use crate::ids::OwnerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of profile a shared profile is attached as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Trading-application (TPO) profile
    Tpo,
    /// Turret profile
    Turret,
}

impl ProfileKind {
    /// Classify from the owning application's name
    #[inline]
    #[must_use]
    pub fn from_application(application_name: &str, tpo_application_name: &str) -> Self {
        if application_name == tpo_application_name {
            Self::Tpo
        } else {
            Self::Turret
        }
    }

    /// Type code used by the profile edition page
    #[inline]
    #[must_use]
    pub fn type_code(self) -> &'static str {
        match self {
            Self::Tpo => "tpoprofile",
            Self::Turret => "turretprofile",
        }
    }
}

/// Which layer an owner sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "layer", content = "profile")]
pub enum OwnerKind {
    /// Cluster the TPO node belongs to
    ClusterNode,
    /// Zone the subject is assigned to
    SpecificZone,
    /// Device model of the turret
    Model,
    /// The fallback `System` zone
    SystemZone,
    /// Shared profile explicitly attached to the subject
    SharedProfile(ProfileKind),
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClusterNode => f.write_str("cluster node"),
            Self::SpecificZone => f.write_str("zone"),
            Self::Model => f.write_str("model"),
            Self::SystemZone => f.write_str("system zone"),
            Self::SharedProfile(kind) => write!(f, "shared {}", kind.type_code()),
        }
    }
}

/// One concrete owner a setting may be inherited from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    /// Layer of the owner
    pub kind: OwnerKind,
    /// Id of the entity itself (zone uid, model id, profile uid)
    pub entity_id: String,
    /// Profile uid holding the owner's settings
    pub profile: OwnerId,
    /// Name shown to the operator
    pub display_name: String,
}

impl OwnerRef {
    /// Cluster profile of a TPO node
    #[must_use]
    pub fn cluster_node(cluster_profile: OwnerId, name: &str) -> Self {
        Self {
            kind: OwnerKind::ClusterNode,
            entity_id: cluster_profile.to_string(),
            profile: cluster_profile,
            display_name: name.trim().to_string(),
        }
    }

    /// Zone the subject is assigned to
    #[must_use]
    pub fn specific_zone(zone_uid: impl Into<String>, profile: OwnerId, name: &str) -> Self {
        Self {
            kind: OwnerKind::SpecificZone,
            entity_id: zone_uid.into(),
            profile,
            display_name: name.trim().to_string(),
        }
    }

    /// The fallback system zone
    #[must_use]
    pub fn system_zone(zone_uid: impl Into<String>, profile: OwnerId, name: &str) -> Self {
        Self {
            kind: OwnerKind::SystemZone,
            entity_id: zone_uid.into(),
            profile,
            display_name: name.trim().to_string(),
        }
    }

    /// Device model
    #[must_use]
    pub fn model(model_id: impl Into<String>, profile: OwnerId, external_name: &str) -> Self {
        Self {
            kind: OwnerKind::Model,
            entity_id: model_id.into(),
            profile,
            display_name: external_name.trim().to_string(),
        }
    }

    /// Shared profile attached to the subject
    #[must_use]
    pub fn shared_profile(profile: OwnerId, name: &str, kind: ProfileKind) -> Self {
        Self {
            kind: OwnerKind::SharedProfile(kind),
            entity_id: profile.to_string(),
            profile,
            display_name: name.trim().to_string(),
        }
    }
}

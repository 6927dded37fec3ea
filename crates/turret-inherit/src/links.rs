//! Deep links to the pages editing each owner

use serde::{Deserialize, Serialize};
use turret_model::{OwnerKind, OwnerRef, ProfileKind};

/// URL templates for owner pages
///
/// `{type}` is replaced with the profile type code and `{id}` with the
/// owner's entity id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkTemplates {
    /// Profile page (cluster nodes and shared profiles)
    pub profile: String,
    /// Zone page
    pub zone: String,
    /// Model page
    pub model: String,
}

impl Default for LinkTemplates {
    fn default() -> Self {
        Self {
            profile: "GeneralEditionForm.aspx?action=edit&type={type}&item={id}".to_string(),
            zone: "ZoneEditionForm.aspx?action=edit&item={id}".to_string(),
            model: "ModelEditionForm.aspx?action=edit&item={id}".to_string(),
        }
    }
}

impl LinkTemplates {
    /// Link to the page of an owner
    #[must_use]
    pub fn link_for(&self, owner: &OwnerRef) -> String {
        let (template, profile_kind) = match owner.kind {
            OwnerKind::ClusterNode => (&self.profile, Some(ProfileKind::Tpo)),
            OwnerKind::SharedProfile(kind) => (&self.profile, Some(kind)),
            OwnerKind::SpecificZone | OwnerKind::SystemZone => (&self.zone, None),
            OwnerKind::Model => (&self.model, None),
        };
        let type_code = profile_kind.map_or("", ProfileKind::type_code);
        template
            .replace("{type}", type_code)
            .replace("{id}", &owner.entity_id)
    }
}

use super::ChainStrategy;
use turret_model::{OwnerKind, SettingCategory};

/// Zone the subject is assigned to
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecificZoneStrategy;

impl ChainStrategy for SpecificZoneStrategy {
    fn name(&self) -> &'static str {
        "specific_zone"
    }

    fn layer(&self) -> OwnerKind {
        OwnerKind::SpecificZone
    }

    fn lookup_category(&self, subject: SettingCategory) -> SettingCategory {
        subject.merged()
    }
}

/// Fallback `System` zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemZoneStrategy;

impl ChainStrategy for SystemZoneStrategy {
    fn name(&self) -> &'static str {
        "system_zone"
    }

    fn layer(&self) -> OwnerKind {
        OwnerKind::SystemZone
    }

    fn lookup_category(&self, subject: SettingCategory) -> SettingCategory {
        subject.merged()
    }
}

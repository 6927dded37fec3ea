use super::ChainStrategy;
use turret_model::{OwnerKind, SettingCategory};

/// Cluster profile of a TPO node
///
/// Boot subjects read the cluster's boot values; everything else reads
/// the cluster's shared TPO values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterNodeStrategy;

impl ChainStrategy for ClusterNodeStrategy {
    fn name(&self) -> &'static str {
        "cluster_node"
    }

    fn layer(&self) -> OwnerKind {
        OwnerKind::ClusterNode
    }

    fn lookup_category(&self, subject: SettingCategory) -> SettingCategory {
        if subject == SettingCategory::TpoBoot {
            SettingCategory::TpoBoot
        } else {
            SettingCategory::TpoShared
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_subjects_read_boot_values() {
        let s = ClusterNodeStrategy;
        assert_eq!(s.lookup_category(SettingCategory::TpoBoot), SettingCategory::TpoBoot);
        assert_eq!(s.lookup_category(SettingCategory::TpoPrivate), SettingCategory::TpoShared);
    }
}

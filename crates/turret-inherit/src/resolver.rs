//! Inheritance resolver
//!
//! Resolution is two independent steps:
//!
//! 1. walk the single-owner strategies in priority order and keep the first
//!    persisted value found;
//! 2. fan out over every attached shared profile and keep all values found.
//!
//! More than one entry overall is a conflict. Conflicts are advisory: they
//! never block saving.

use crate::chain::OwnershipChain;
use crate::fan_out::SharedProfileFanOut;
use crate::html;
use crate::links::LinkTemplates;
use crate::registry::StrategyRegistry;
use crate::snapshot::ValueLookup;
use serde::Serialize;
use turret_model::OwnerKind;

/// One place a key's value is inherited from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritedEntry {
    /// Display name of the owner
    pub source_label: String,
    /// Link to the owner's page
    pub source_link: String,
    /// Value the owner defines
    pub value: String,
    /// Layer of the owner
    pub source: OwnerKind,
}

/// Every source of a key and whether they conflict
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InheritanceResult {
    /// Chain hit first (if any), then shared profiles in attachment order
    pub entries: Vec<InheritedEntry>,
    /// More than one source defines the key
    pub conflict: bool,
}

impl InheritanceResult {
    /// Whether nothing is inherited
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry that applies when the subject has no value of its own
    #[inline]
    #[must_use]
    pub fn effective(&self) -> Option<&InheritedEntry> {
        self.entries.first()
    }

    /// HTML summary, see [`html::render_heritage`]
    #[must_use]
    pub fn to_html(&self, key_redefined: bool, div_id: &str) -> Option<String> {
        html::render_heritage(self, key_redefined, div_id)
    }
}

/// Resolves keys against an ownership chain
#[derive(Debug)]
pub struct InheritanceResolver {
    strategies: StrategyRegistry,
    fan_out: SharedProfileFanOut,
    links: LinkTemplates,
}

impl Default for InheritanceResolver {
    fn default() -> Self {
        Self::new(LinkTemplates::default())
    }
}

impl InheritanceResolver {
    /// Resolver with the default strategy order
    #[must_use]
    pub fn new(links: LinkTemplates) -> Self {
        Self::with_strategies(StrategyRegistry::with_defaults(), links)
    }

    /// Resolver with a custom strategy order
    #[must_use]
    pub fn with_strategies(strategies: StrategyRegistry, links: LinkTemplates) -> Self {
        Self {
            strategies,
            fan_out: SharedProfileFanOut,
            links,
        }
    }

    /// Strategies in priority order
    #[inline]
    #[must_use]
    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    /// Link templates
    #[inline]
    #[must_use]
    pub fn links(&self) -> &LinkTemplates {
        &self.links
    }

    /// Resolve where `key` is inherited from
    pub fn resolve<L>(&self, key: &str, chain: &OwnershipChain, lookup: &L) -> InheritanceResult
    where
        L: ValueLookup + ?Sized,
    {
        let mut entries = Vec::new();

        for strategy in self.strategies.iter() {
            let Some(owner) = strategy.select(chain) else {
                continue;
            };
            let category = strategy.lookup_category(chain.category());
            if let Some(value) = lookup.lookup(&owner.profile, Some(category), key) {
                entries.push(InheritedEntry {
                    source_label: owner.display_name.clone(),
                    source_link: self.links.link_for(owner),
                    value: value.value().to_string(),
                    source: owner.kind,
                });
                break;
            }
        }

        for (profile, value) in self.fan_out.collect(chain, key, lookup) {
            entries.push(InheritedEntry {
                source_label: profile.display_name.clone(),
                source_link: self.links.link_for(profile),
                value: value.value().to_string(),
                source: profile.kind,
            });
        }

        let conflict = entries.len() > 1;
        if conflict {
            tracing::debug!(
                "Inheritance conflict on {} for {}: {} sources",
                key,
                chain.subject(),
                entries.len()
            );
        }
        InheritanceResult { entries, conflict }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::InheritanceSnapshot;
    use pretty_assertions::assert_eq;
    use turret_model::{
        OwnerId, OwnerRef, ProfileKind, SettingCategory, SettingUid, SettingValue, Version,
    };

    fn persisted(owner: &str, category: SettingCategory, key: &str, value: &str) -> SettingValue {
        SettingValue::loaded(
            SettingUid::new(),
            OwnerId::new(owner),
            category,
            key,
            value,
            Version(1),
        )
    }

    fn boot_chain() -> OwnershipChain {
        OwnershipChain::new(OwnerId::new("T1"), SettingCategory::NetrixBoot)
            .with_specific_zone(Some(OwnerRef::specific_zone("Z1", OwnerId::new("ZP1"), "Zone A")))
            .with_model(Some(OwnerRef::model("M1", OwnerId::new("MP1"), "T-100")))
            .with_system_zone(Some(OwnerRef::system_zone("Z0", OwnerId::new("ZP0"), "System")))
    }

    #[test]
    fn first_chain_hit_stops_the_walk() {
        let snapshot = InheritanceSnapshot::from_values([
            persisted("MP1", SettingCategory::TerminalBoot, "vlan", "20"),
            persisted("ZP0", SettingCategory::TerminalBoot, "vlan", "30"),
        ]);
        let result = InheritanceResolver::default().resolve("vlan", &boot_chain(), &snapshot);

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].source, OwnerKind::Model);
        assert_eq!(result.entries[0].value, "20");
        assert!(!result.conflict);
    }

    #[test]
    fn chain_reads_merged_category() {
        let snapshot = InheritanceSnapshot::from_values([persisted(
            "ZP1",
            SettingCategory::NetrixBoot,
            "vlan",
            "10",
        )]);
        let result = InheritanceResolver::default().resolve("vlan", &boot_chain(), &snapshot);
        assert!(result.is_empty());
    }

    #[test]
    fn cluster_node_wins_over_zone() {
        let chain = OwnershipChain::new(OwnerId::new("N1"), SettingCategory::TpoBoot)
            .with_cluster_node(Some(OwnerRef::cluster_node(OwnerId::new("CP"), "Cluster 1")))
            .with_specific_zone(Some(OwnerRef::specific_zone("Z1", OwnerId::new("ZP1"), "A")));
        let snapshot = InheritanceSnapshot::from_values([
            persisted("CP", SettingCategory::TpoBoot, "port", "5000"),
            persisted("ZP1", SettingCategory::TpoBoot, "port", "6000"),
        ]);

        let result = InheritanceResolver::default().resolve("port", &chain, &snapshot);
        assert_eq!(result.effective().map(|e| e.value.as_str()), Some("5000"));
        assert_eq!(
            result.entries[0].source_link,
            "GeneralEditionForm.aspx?action=edit&type=tpoprofile&item=CP"
        );
    }

    #[test]
    fn shared_profiles_all_contribute() {
        let chain = OwnershipChain::new(OwnerId::new("P"), SettingCategory::TerminalProfile)
            .with_specific_zone(Some(OwnerRef::specific_zone("ZA", OwnerId::new("ZPA"), "Zone A")))
            .with_shared_profiles(vec![
                OwnerRef::shared_profile(OwnerId::new("S1"), "Desk", ProfileKind::Turret),
                OwnerRef::shared_profile(OwnerId::new("S2"), "Trader", ProfileKind::Tpo),
            ]);
        let snapshot = InheritanceSnapshot::from_values([
            persisted("ZPA", SettingCategory::TerminalProfile, "ringtone", "chime1"),
            persisted("S1", SettingCategory::TerminalProfile, "ringtone", "chime2"),
            persisted("S2", SettingCategory::TpoShared, "ringtone", "chime3"),
        ]);

        let result = InheritanceResolver::default().resolve("ringtone", &chain, &snapshot);
        let values: Vec<_> = result.entries.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["chime1", "chime2", "chime3"]);
        assert!(result.conflict);
        assert_eq!(
            result.entries[2].source,
            OwnerKind::SharedProfile(ProfileKind::Tpo)
        );
    }

    #[test]
    fn custom_strategy_order() {
        let mut strategies = StrategyRegistry::new();
        strategies.register(crate::strategies::SystemZoneStrategy);
        strategies.register(crate::strategies::ModelStrategy);
        let resolver = InheritanceResolver::with_strategies(strategies, LinkTemplates::default());
        let snapshot = InheritanceSnapshot::from_values([
            persisted("MP1", SettingCategory::TerminalBoot, "vlan", "20"),
            persisted("ZP0", SettingCategory::TerminalBoot, "vlan", "30"),
        ]);

        let result = resolver.resolve("vlan", &boot_chain(), &snapshot);
        assert_eq!(result.entries[0].source, OwnerKind::SystemZone);
    }
}

//! Shared-profile fan-out
//!
//! Unlike the single-owner chain, every attached shared profile is checked:
//! any number of them may define the same key.

use crate::chain::OwnershipChain;
use crate::snapshot::ValueLookup;
use turret_model::{OwnerRef, SettingValue};

/// Collects a key's value from all attached shared profiles
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedProfileFanOut;

impl SharedProfileFanOut {
    /// Shared profiles holding a persisted value for `key`, in attachment order
    pub fn collect<'c, 'l, L>(
        &self,
        chain: &'c OwnershipChain,
        key: &str,
        lookup: &'l L,
    ) -> Vec<(&'c OwnerRef, &'l SettingValue)>
    where
        L: ValueLookup + ?Sized,
    {
        chain
            .shared_profiles()
            .iter()
            .filter_map(|profile| {
                lookup
                    .lookup(&profile.profile, None, key)
                    .map(|value| (profile, value))
            })
            .collect()
    }
}

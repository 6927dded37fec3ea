//! Single-owner chain strategies
//!
//! Each strategy picks one owner out of an [`OwnershipChain`] and names the
//! category its values are stored under. The resolver walks them in
//! registry order and stops at the first one that yields a value.

use crate::chain::OwnershipChain;
use turret_model::{OwnerKind, OwnerRef, SettingCategory};

mod cluster;
mod model;
mod zone;

pub use cluster::ClusterNodeStrategy;
pub use model::ModelStrategy;
pub use zone::{SpecificZoneStrategy, SystemZoneStrategy};

/// One layer of the single-owner chain
pub trait ChainStrategy: Send + Sync + std::fmt::Debug {
    /// Strategy name (for debugging and logs)
    fn name(&self) -> &'static str;

    /// Layer this strategy reads
    fn layer(&self) -> OwnerKind;

    /// Owner to look the key up under, if the chain has one
    fn select<'c>(&self, chain: &'c OwnershipChain) -> Option<&'c OwnerRef> {
        chain.owner(self.layer())
    }

    /// Category the owner's values are stored under
    fn lookup_category(&self, subject: SettingCategory) -> SettingCategory;
}

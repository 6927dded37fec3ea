//! Turret Settings Inheritance
//!
//! Works out which higher-level owners define a setting for a subject and
//! whether they disagree.
//!
//! # Core Concepts
//!
//! - [`OwnershipChain`]: cluster node, zone, model, system zone and shared profiles of a subject
//! - [`ChainStrategy`]: one single-owner layer; [`StrategyRegistry`] orders them
//! - [`SharedProfileFanOut`]: all-match lookup over shared profiles
//! - [`InheritanceResolver`]: combines both into an [`InheritanceResult`]
//!
//! # Example
//!
//! ```rust
//! use turret_inherit::{InheritanceResolver, InheritanceSnapshot, OwnershipChain};
//! use turret_model::{OwnerId, OwnerRef, SettingCategory, SettingUid, SettingValue, Version};
//!
//! let chain = OwnershipChain::new(OwnerId::new("T1"), SettingCategory::TerminalProfile)
//!     .with_specific_zone(Some(OwnerRef::specific_zone("Z1", OwnerId::new("ZP1"), "Zone A")));
//! let snapshot = InheritanceSnapshot::from_values([SettingValue::loaded(
//!     SettingUid::new(),
//!     OwnerId::new("ZP1"),
//!     SettingCategory::TerminalProfile,
//!     "ringtone",
//!     "chime1",
//!     Version(1),
//! )]);
//!
//! let result = InheritanceResolver::default().resolve("ringtone", &chain, &snapshot);
//! assert_eq!(result.entries.len(), 1);
//! assert!(!result.conflict);
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod chain;
mod fan_out;
mod html;
mod links;
mod registry;
mod resolver;
mod snapshot;
mod strategies;

pub use chain::OwnershipChain;
pub use fan_out::SharedProfileFanOut;
pub use html::{escape, render_heritage, CONFLICT_TEXT};
pub use links::LinkTemplates;
pub use registry::StrategyRegistry;
pub use resolver::{InheritanceResolver, InheritanceResult, InheritedEntry};
pub use snapshot::{InheritanceSnapshot, ValueLookup};
pub use strategies::{
    ChainStrategy, ClusterNodeStrategy, ModelStrategy, SpecificZoneStrategy, SystemZoneStrategy,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

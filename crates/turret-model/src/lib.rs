//! Turret Settings Model
//!
//! Data types shared by every layer of the settings editor.
//!
//! # Core Concepts
//!
//! - [`SettingCategory`]: kind of subject, with merged storage category and schema document
//! - [`SettingValue`]: one `(key, value)` row owned by a profile, with soft-delete state
//! - [`OwnerRef`]: a zone, model, cluster node or shared profile values are inherited from
//! - [`SettingDiff`]: add/update/delete sets produced by reconciliation
//!
//! # Example
//!
//! ```rust
//! use turret_model::{OwnerId, SettingCategory, SettingUid, SettingValue, Version};
//!
//! let value = SettingValue::created(
//!     SettingUid::new(),
//!     Version(1),
//!     OwnerId::new("P-1"),
//!     SettingCategory::NetrixProfile.merged(),
//!     "maxVolume",
//!     "50",
//! );
//! assert_eq!(value.category(), SettingCategory::TerminalProfile);
//! assert!(!value.is_persisted());
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod category;
mod diff;
mod ids;
mod owner;
mod value;

pub use category::{
    SettingCategory, UnknownCategory, NETRIX_DOCUMENT, TERMINAL_DOCUMENT, TPO_DOCUMENT,
};
pub use diff::{DiffOperation, SettingDiff};
pub use ids::{OwnerId, SettingUid, Version};
pub use owner::{OwnerKind, OwnerRef, ProfileKind};
pub use value::SettingValue;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

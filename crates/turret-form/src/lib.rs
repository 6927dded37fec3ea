//! Turret Settings Form
//!
//! Turns a schema group plus the subject's values into typed, validated
//! controls, and checks submitted field states.
//!
//! # Core Concepts
//!
//! - [`FormRenderer`]: renders one group into a [`RenderedForm`]
//! - [`RenderedControl`]: one widget per [`turret_schema::SettingType`] variant
//! - [`Validator`]: required / range / regex checks attached per setting
//! - [`FormState`]: toggles and control values as submitted
//!
//! # Example
//!
//! ```rust
//! use turret_form::{validate_form, FormRenderer, FormState};
//! use turret_model::{SettingCategory, SettingValue};
//! use turret_schema::{Schema, SchemaCategory, SchemaGroup, SchemaSetting, SettingType};
//!
//! let mut schema = Schema::new("SettingsTerminal.xml");
//! schema.categories.push(SchemaCategory {
//!     name: "profile".into(),
//!     uid: String::new(),
//!     groups: vec![SchemaGroup {
//!         name: "Audio".into(),
//!         id: "1".into(),
//!         settings: vec![SchemaSetting::new("1", "maxVolume", SettingType::Text, "50")],
//!     }],
//! });
//!
//! let values: Vec<SettingValue> = Vec::new();
//! let form = FormRenderer::new(&schema)
//!     .render_basic(SettingCategory::TerminalProfile, "Audio", true, values.as_slice())
//!     .unwrap();
//! let volume = form.setting("maxVolume").unwrap();
//! assert!(!volume.available);
//! assert_eq!(volume.control.value(), Some("50"));
//! assert!(validate_form(&form, &FormState::from_rendered(&form)).is_empty());
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod controls;
mod error;
mod groups;
mod related;
mod renderer;
mod state;
mod validators;

pub use controls::{ControlData, ControlKind, ElementIds, ListItem, RenderedControl};
pub use error::{FieldViolation, FormError, ViolationKind};
pub use groups::{is_group_visible, visible_groups, GroupSummary, TPO_GROUP};
pub use related::{related_descriptions, RelatedDescription};
pub use renderer::{
    CurrentValues, Description, FormRenderer, InheritedColumn, RenderedForm, RenderedSetting,
};
pub use state::{validate_form, FieldState, FormState};
pub use validators::{
    validators_for, RangeRule, RangeType, RegexRule, Validator, REGEX_MESSAGE, REQUIRED_MESSAGE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Form renderer
//!
//! Walks one group of the schema and produces, per setting, the toggle
//! state, a typed control, its validators, the description block and,
//! when requested, the inherited-value column.

use crate::controls::{ElementIds, RenderedControl};
use crate::error::FormError;
use crate::groups::to_form_error;
use crate::related::{related_descriptions, RelatedDescription};
use crate::validators::{validators_for, Validator};
use serde::Serialize;
use turret_inherit::{InheritanceResolver, InheritanceResult, OwnershipChain, ValueLookup};
use turret_model::{SettingCategory, SettingValue};
use turret_schema::{Schema, SchemaSetting, ViewMode};

/// The subject's own values, as seen by the renderer
pub trait CurrentValues {
    /// Live (not soft-deleted) value for a key
    fn current(&self, key: &str) -> Option<&SettingValue>;
}

impl CurrentValues for [SettingValue] {
    fn current(&self, key: &str) -> Option<&SettingValue> {
        self.iter().find(|v| v.key() == key && !v.is_deleted())
    }
}

/// Inputs of the inherited-value column
#[derive(Clone, Copy)]
pub struct InheritedColumn<'a> {
    /// Resolver to use
    pub resolver: &'a InheritanceResolver,
    /// Subject's ownership chain
    pub chain: &'a OwnershipChain,
    /// Values of the chain's owners
    pub lookup: &'a dyn ValueLookup,
}

impl std::fmt::Debug for InheritedColumn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InheritedColumn")
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

/// Description block of a setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    /// Tooltip; double quotes replaced with single quotes
    pub short: String,
    /// Full description
    pub long: String,
    /// Accepted values
    pub constraint: String,
    /// Setting is mandatory
    pub mandatory: bool,
    /// Descriptions of related settings
    pub related: Vec<RelatedDescription>,
}

impl Description {
    fn build(schema: &Schema, setting: &SchemaSetting) -> Self {
        Self {
            short: setting.short_description.replace('"', "'"),
            long: setting.long_description.clone(),
            constraint: setting.constraint_description.clone(),
            mandatory: setting.mandatory,
            related: related_descriptions(schema, setting),
        }
    }

    /// Related descriptions, one line each
    #[must_use]
    pub fn related_text(&self) -> String {
        self.related
            .iter()
            .map(RelatedDescription::line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One setting as rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSetting {
    /// Definition
    pub schema: SchemaSetting,
    /// Subject's own value; `None` means the setting inherits or defaults
    pub current_value: Option<SettingValue>,
    /// Availability toggle checked (subject overrides the default)
    pub available: bool,
    /// Element ids
    pub ids: ElementIds,
    /// Value control
    pub control: RenderedControl,
    /// Validators attached to the control
    pub validators: Vec<Validator>,
    /// Description block
    pub description: Description,
    /// Inheritance sources, when the inherited column is shown
    pub inherited: Option<InheritanceResult>,
    /// HTML summary of the inheritance sources
    pub inherited_text: Option<String>,
    /// More than one source defines the key
    pub has_conflict: bool,
}

/// One group as rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedForm {
    /// Schema document
    pub document: String,
    /// Subject category
    pub category: SettingCategory,
    /// Group name
    pub group: String,
    /// Setting filter
    pub view: ViewMode,
    /// Inherited column present
    pub show_inherited: bool,
    /// Saving is not permitted
    pub read_only: bool,
    /// Settings in document order
    pub settings: Vec<RenderedSetting>,
}

impl RenderedForm {
    /// Rendered setting by key
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&RenderedSetting> {
        self.settings.iter().find(|s| s.schema.key == key)
    }

    /// Number of available settings
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.settings.iter().filter(|s| s.available).count()
    }

    /// Number of settings with conflicting sources
    #[must_use]
    pub fn conflict_count(&self) -> usize {
        self.settings.iter().filter(|s| s.has_conflict).count()
    }
}

/// Renders groups of one schema document
#[derive(Debug, Clone, Copy)]
pub struct FormRenderer<'a> {
    schema: &'a Schema,
    inherited: Option<InheritedColumn<'a>>,
}

impl<'a> FormRenderer<'a> {
    /// Renderer without inherited column
    #[must_use]
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            inherited: None,
        }
    }

    /// Add the inherited-value column
    #[must_use]
    pub fn with_inherited(mut self, column: InheritedColumn<'a>) -> Self {
        self.inherited = Some(column);
        self
    }

    /// Render with the boolean basic/expert filter
    pub fn render_basic<V>(
        &self,
        category: SettingCategory,
        group: &str,
        basic_level: bool,
        values: &V,
    ) -> Result<RenderedForm, FormError>
    where
        V: CurrentValues + ?Sized,
    {
        self.render(category, group, ViewMode::from_basic_level(basic_level), values)
    }

    /// Render a group of the subject category's schema category
    pub fn render<V>(
        &self,
        category: SettingCategory,
        group: &str,
        view: ViewMode,
        values: &V,
    ) -> Result<RenderedForm, FormError>
    where
        V: CurrentValues + ?Sized,
    {
        let schema_group = self
            .schema
            .find_category(category.schema_category_name())
            .and_then(|c| c.find_group(group))
            .map_err(to_form_error)?;

        let settings = schema_group
            .list_settings_for(view)
            .into_iter()
            .map(|setting| self.render_setting(setting, values.current(&setting.key)))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Rendered {}/{} ({:?}): {} settings",
            category,
            group,
            view,
            settings.len()
        );

        Ok(RenderedForm {
            document: self.schema.document.clone(),
            category,
            group: group.to_string(),
            view,
            show_inherited: self.inherited.is_some(),
            read_only: false,
            settings,
        })
    }

    fn render_setting(
        &self,
        setting: &SchemaSetting,
        current: Option<&SettingValue>,
    ) -> Result<RenderedSetting, FormError> {
        let available = current.is_some();
        let ids = ElementIds::for_setting(setting);
        let control = RenderedControl::build(setting, &ids, current.map(SettingValue::value));
        let validators = validators_for(setting, available)?;

        let (inherited, inherited_text, has_conflict) = match &self.inherited {
            Some(column) => {
                let result = column.resolver.resolve(&setting.key, column.chain, column.lookup);
                let text = result.to_html(available, &ids.conflict);
                let conflict = result.conflict;
                (Some(result), text, conflict)
            }
            None => (None, None, false),
        };

        Ok(RenderedSetting {
            description: Description::build(self.schema, setting),
            schema: setting.clone(),
            current_value: current.cloned(),
            available,
            ids,
            control,
            validators,
            inherited,
            inherited_text,
            has_conflict,
        })
    }
}

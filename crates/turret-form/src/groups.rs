//! Group listing for a subject

use crate::error::FormError;
use serde::Serialize;
use turret_model::SettingCategory;
use turret_schema::{Schema, SchemaError};

/// Group hidden from shared TPO profiles
pub const TPO_GROUP: &str = "TPO";

/// A group offered for selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    /// Group name
    pub name: String,
    /// Group id
    pub id: String,
    /// Number of settings in the group
    pub setting_count: usize,
}

/// Whether a group is offered to a subject
///
/// TPO subjects that are shared profiles do not see the `TPO` group.
#[must_use]
pub fn is_group_visible(category: SettingCategory, shared_profile: bool, group: &str) -> bool {
    !(category.is_tpo() && shared_profile && group.eq_ignore_ascii_case(TPO_GROUP))
}

/// Groups of the subject's schema category, in document order
pub fn visible_groups(
    schema: &Schema,
    category: SettingCategory,
    shared_profile: bool,
) -> Result<Vec<GroupSummary>, FormError> {
    let schema_category = schema
        .find_category(category.schema_category_name())
        .map_err(to_form_error)?;
    Ok(schema_category
        .groups
        .iter()
        .filter(|g| is_group_visible(category, shared_profile, &g.name))
        .map(|g| GroupSummary {
            name: g.name.clone(),
            id: g.id.clone(),
            setting_count: g.settings.len(),
        })
        .collect())
}

pub(crate) fn to_form_error(err: SchemaError) -> FormError {
    match err {
        SchemaError::GroupNotFound { category, group } => FormError::UnknownGroup { category, group },
        SchemaError::CategoryNotFound(name) => FormError::UnknownCategory(name),
        other => FormError::UnknownCategory(other.to_string()),
    }
}

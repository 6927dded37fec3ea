//! Related-settings descriptions
//!
//! A setting may point at other keys whose descriptions help explain it.
//! References are resolved against the whole document, followed
//! recursively, and skipped silently when they do not exist.

use serde::Serialize;
use std::collections::HashSet;
use turret_schema::{Schema, SchemaSetting};

/// Description of one related setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedDescription {
    /// Related key
    pub key: String,
    /// Friendly name, or the key when the schema has none
    pub name: String,
    /// Short description of the related setting
    pub description: String,
    /// Accepted values of the related setting
    pub constraint: String,
}

impl RelatedDescription {
    /// `name: description` line
    #[must_use]
    pub fn line(&self) -> String {
        if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.description)
        }
    }
}

/// Descriptions of every setting reachable through related keys
///
/// Depth-first in declaration order; each key appears once and the setting
/// itself never appears.
#[must_use]
pub fn related_descriptions(schema: &Schema, setting: &SchemaSetting) -> Vec<RelatedDescription> {
    let mut seen = HashSet::from([setting.key.as_str()]);
    let mut out = Vec::new();
    collect(schema, setting, &mut seen, &mut out);
    out
}

fn collect<'s>(
    schema: &'s Schema,
    setting: &'s SchemaSetting,
    seen: &mut HashSet<&'s str>,
    out: &mut Vec<RelatedDescription>,
) {
    for key in &setting.related_setting_keys {
        if !seen.insert(key.as_str()) {
            continue;
        }
        let Some(related) = schema.find_setting(key) else {
            tracing::debug!("Related setting {} of {} not in schema", key, setting.key);
            continue;
        };
        out.push(RelatedDescription {
            key: related.key.clone(),
            name: if related.friendly_name.is_empty() {
                related.key.clone()
            } else {
                related.friendly_name.clone()
            },
            description: related.short_description.clone(),
            constraint: related.constraint_description.clone(),
        });
        collect(schema, related, seen, out);
    }
}

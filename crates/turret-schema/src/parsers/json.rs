//! JSON schema documents, in the shape the dashboard is served
//!
//! Flags keep their `"Y"`/`"N"` string form and choices use `Text`/`Value`.

use super::{flag, non_empty, SchemaParser};
use crate::error::SchemaError;
use crate::model::{Choice, Schema, SchemaCategory, SchemaGroup, SchemaSetting, SettingType};
use serde::Deserialize;

/// Parser for `.json` schema documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaParser;

impl SchemaParser for JsonSchemaParser {
    fn parse(&self, document: &str, content: &str) -> Result<Schema, SchemaError> {
        let raw: RawDocument = serde_json::from_str(content)
            .map_err(|e| SchemaError::syntax(document, e.to_string()))?;

        let mut schema = Schema::new(document);
        for category in raw.categories {
            let mut groups = Vec::with_capacity(category.groups.len());
            for group in category.groups {
                let settings = group
                    .settings
                    .into_iter()
                    .map(RawSetting::into_setting)
                    .collect::<Result<Vec<_>, _>>()?;
                groups.push(SchemaGroup {
                    name: group.name,
                    id: group.id,
                    settings,
                });
            }
            schema.categories.push(SchemaCategory {
                name: category.name,
                uid: category.uid,
                groups,
            });
        }
        Ok(schema)
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}

#[derive(Deserialize)]
struct RawDocument {
    categories: Vec<RawCategory>,
}

#[derive(Deserialize)]
struct RawCategory {
    name: String,
    #[serde(default)]
    uid: String,
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Deserialize)]
struct RawGroup {
    name: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    settings: Vec<RawSetting>,
}

#[derive(Deserialize)]
struct RawChoice {
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "Text", default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct RawSetting {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(rename = "type")]
    setting_type: String,
    #[serde(default)]
    default_value: String,
    #[serde(default)]
    default_value_code: Option<String>,
    #[serde(default)]
    mandatory: String,
    #[serde(default)]
    validator_require: String,
    #[serde(default)]
    validator_range: Option<String>,
    #[serde(default)]
    validator_regex: Option<String>,
    #[serde(default)]
    friendly_name: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    long_description: String,
    #[serde(default, alias = "constraint_description")]
    contraint_description: String,
    #[serde(default)]
    basic_level: String,
    #[serde(default)]
    choices: Option<Vec<RawChoice>>,
    #[serde(default, rename = "settingsSettings", alias = "settings_settings")]
    related: Vec<String>,
}

impl RawSetting {
    fn into_setting(self) -> Result<SchemaSetting, SchemaError> {
        let setting_type = SettingType::from_code(&self.name, &self.setting_type)?;
        let mut setting = SchemaSetting::new(self.id, self.name, setting_type, self.default_value);
        setting.default_value_code = non_empty(self.default_value_code);
        setting.mandatory = flag(&self.mandatory);
        setting.validator_require = flag(&self.validator_require);
        setting.validator_range = non_empty(self.validator_range);
        setting.validator_regex = non_empty(self.validator_regex);
        setting.friendly_name = self.friendly_name;
        setting.short_description = self.short_description;
        setting.long_description = self.long_description;
        setting.constraint_description = self.contraint_description;
        setting.basic_level = flag(&self.basic_level);
        setting.related_setting_keys = self.related;
        setting.choices = self
            .choices
            .unwrap_or_default()
            .into_iter()
            .map(|c| match non_empty(c.text) {
                Some(text) => Choice::labeled(c.value, text),
                None => Choice::new(c.value),
            })
            .collect();
        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
      "categories": [{
        "name": "shared",
        "uid": "C9",
        "groups": [{
          "name": "TPO",
          "id": "4",
          "settings": [
            {
              "id": "40", "name": "hotkey", "type": "rb", "default_value": "F1",
              "basic_level": "Y", "mandatory": "N",
              "choices": [{"Text": "Function 1", "Value": "F1"}, {"Value": "F2"}],
              "constraint_description": "one key"
            },
            {
              "id": "41", "name": "autoAnswer", "type": "bl",
              "default_value": "true", "default_value_code": "False",
              "basic_level": "N", "mandatory": "Y", "choices": null,
              "settingsSettings": ["hotkey"]
            }
          ]
        }]
      }]
    }"#;

    #[test]
    fn parses_dashboard_shape() {
        let schema = JsonSchemaParser.parse("SettingsTPO.json", DOC).unwrap();
        let group = schema.find_category("shared").unwrap().find_group("TPO").unwrap();
        assert_eq!(group.settings.len(), 2);

        let hotkey = &group.settings[0];
        assert_eq!(hotkey.setting_type, SettingType::Radio);
        assert_eq!(hotkey.choices[0].display_text(), "Function 1");
        assert_eq!(hotkey.choices[1].display_text(), "F2");
        assert_eq!(hotkey.constraint_description, "one key");

        let auto = &group.settings[1];
        assert_eq!(auto.default_value_code.as_deref(), Some("False"));
        assert_eq!(auto.disabled_default(), "false");
        assert_eq!(auto.related_setting_keys, vec!["hotkey"]);
        assert!(auto.choices.is_empty());
    }

    #[test]
    fn invalid_json_is_a_syntax_error() {
        let err = JsonSchemaParser.parse("x.json", "{").unwrap_err();
        assert!(matches!(err, SchemaError::Syntax { .. }));
    }
}

//! XML schema documents
//!
//! ```xml
//! <categories>
//!   <category name="profile" uid="...">
//!     <groups>
//!       <group name="Audio" id="1">
//!         <settings>
//!           <setting id="10" name="ringtone" type="dd" default_value="chime1" basic_level="Y" ...>
//!             <choices><choice value="chime1" text="Chime 1"/></choices>
//!             <settingsSettings><settingsSetting name="maxVolume"/></settingsSettings>
//!           </setting>
//!         </settings>
//!       </group>
//!     </groups>
//!   </category>
//! </categories>
//! ```

use super::{flag, non_empty, SchemaParser};
use crate::error::SchemaError;
use crate::model::{Choice, Schema, SchemaCategory, SchemaGroup, SchemaSetting, SettingType};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// Parser for `.xml` schema documents
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSchemaParser;

impl SchemaParser for XmlSchemaParser {
    fn parse(&self, document: &str, content: &str) -> Result<Schema, SchemaError> {
        let mut reader = Reader::from_str(content);
        let mut builder = SchemaBuilder::new(document);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => builder.open(e)?,
                Ok(Event::Empty(ref e)) => {
                    builder.open(e)?;
                    builder.close(e.name().as_ref());
                }
                Ok(Event::End(ref e)) => builder.close(e.name().as_ref()),
                Ok(Event::Eof) => break,
                Err(e) => {
                    let pos = reader.buffer_position();
                    return Err(SchemaError::syntax(
                        document,
                        format!("XML parse error at byte {pos}: {e}"),
                    ));
                }
                _ => {}
            }
        }

        builder.finish()
    }

    fn extensions(&self) -> &[&str] {
        &["xml"]
    }
}

/// Accumulates elements while the reader walks the document
struct SchemaBuilder {
    schema: Schema,
    category: Option<SchemaCategory>,
    group: Option<SchemaGroup>,
    setting: Option<SchemaSetting>,
}

impl SchemaBuilder {
    fn new(document: &str) -> Self {
        Self {
            schema: Schema::new(document),
            category: None,
            group: None,
            setting: None,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), SchemaError> {
        match e.name().as_ref() {
            b"category" => {
                let mut attrs = self.attributes(e)?;
                self.category = Some(SchemaCategory {
                    name: required(&mut attrs, "category", "name")?,
                    uid: attrs.remove("uid").unwrap_or_default(),
                    groups: Vec::new(),
                });
            }
            b"group" if self.category.is_some() => {
                let mut attrs = self.attributes(e)?;
                self.group = Some(SchemaGroup {
                    name: required(&mut attrs, "group", "name")?,
                    id: attrs.remove("id").unwrap_or_default(),
                    settings: Vec::new(),
                });
            }
            b"setting" if self.group.is_some() => {
                let attrs = self.attributes(e)?;
                self.setting = Some(setting_from(attrs)?);
            }
            b"choice" => {
                if let Some(setting) = self.setting.as_mut() {
                    let mut attrs = attributes(&self.schema.document, e)?;
                    let value = attrs.remove("value").unwrap_or_default();
                    let choice = match non_empty(attrs.remove("text")) {
                        Some(text) => Choice::labeled(value, text),
                        None => Choice::new(value),
                    };
                    setting.choices.push(choice);
                }
            }
            b"settingsSetting" => {
                if let Some(setting) = self.setting.as_mut() {
                    let mut attrs = attributes(&self.schema.document, e)?;
                    if let Some(key) = non_empty(attrs.remove("name")) {
                        setting.related_setting_keys.push(key);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"setting" => {
                if let (Some(setting), Some(group)) = (self.setting.take(), self.group.as_mut()) {
                    group.settings.push(setting);
                }
            }
            b"group" => {
                if let (Some(group), Some(category)) = (self.group.take(), self.category.as_mut())
                {
                    category.groups.push(group);
                }
            }
            b"category" => {
                if let Some(category) = self.category.take() {
                    self.schema.categories.push(category);
                }
            }
            _ => {}
        }
    }

    fn attributes(&self, e: &BytesStart<'_>) -> Result<HashMap<String, String>, SchemaError> {
        attributes(&self.schema.document, e)
    }

    fn finish(self) -> Result<Schema, SchemaError> {
        if self.category.is_some() || self.group.is_some() || self.setting.is_some() {
            return Err(SchemaError::syntax(
                self.schema.document,
                "unexpected end of document inside an open element",
            ));
        }
        Ok(self.schema)
    }
}

fn attributes(document: &str, e: &BytesStart<'_>) -> Result<HashMap<String, String>, SchemaError> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SchemaError::syntax(document, err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| SchemaError::syntax(document, err.to_string()))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn required(
    attrs: &mut HashMap<String, String>,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, SchemaError> {
    attrs
        .remove(attribute)
        .ok_or(SchemaError::MissingAttribute { element, attribute })
}

fn setting_from(mut attrs: HashMap<String, String>) -> Result<SchemaSetting, SchemaError> {
    let key = required(&mut attrs, "setting", "name")?;
    let code = required(&mut attrs, "setting", "type")?;
    let setting_type = SettingType::from_code(&key, &code)?;
    let mut take = |name: &str| attrs.remove(name).unwrap_or_default();

    let id = take("id");
    let default_value = take("default_value");
    let mut setting = SchemaSetting::new(id, key, setting_type, default_value);
    setting.friendly_name = take("friendly_name");
    setting.short_description = take("short_description");
    setting.long_description = take("long_description");
    setting.mandatory = flag(&take("mandatory"));
    setting.validator_require = flag(&take("validator_require"));
    setting.basic_level = flag(&take("basic_level"));

    let constraint = take("contraint_description");
    setting.constraint_description = if constraint.is_empty() {
        take("constraint_description")
    } else {
        constraint
    };
    setting.default_value_code = non_empty(attrs.remove("default_value_code"));
    setting.validator_range = non_empty(attrs.remove("validator_range"));
    setting.validator_regex = non_empty(attrs.remove("validator_regex"));
    Ok(setting)
}

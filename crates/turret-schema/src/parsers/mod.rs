//! Schema document parsers
//!
//! - XML documents (`SettingsTerminal.xml` and friends) via quick-xml
//! - JSON documents in the dashboard's shape via serde

use crate::error::SchemaError;
use crate::model::Schema;
use std::path::Path;

mod json;
mod xml;

pub use json::JsonSchemaParser;
pub use xml::XmlSchemaParser;

/// Parser turning document text into a [`Schema`]
///
/// Implement this trait to support another document format.
pub trait SchemaParser: Send + Sync + 'static {
    /// Parse a document; `document` is its name, used in errors
    fn parse(&self, document: &str, content: &str) -> Result<Schema, SchemaError>;

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];

    /// Check if this parser can handle the named document
    fn can_parse(&self, document: &str) -> bool {
        Path::new(document)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

/// Parsers selectable by document extension
pub struct ParserRegistry {
    parsers: Vec<Box<dyn SchemaParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        default_parsers()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parser_count", &self.parsers.len())
            .field("extensions", &self.all_extensions())
            .finish()
    }
}

impl ParserRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Register a parser; later registrations win on shared extensions
    pub fn register<P: SchemaParser>(&mut self, parser: P) {
        self.parsers.insert(0, Box::new(parser));
    }

    /// Find parser for a document name
    #[must_use]
    pub fn find_for(&self, document: &str) -> Option<&dyn SchemaParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(document))
            .map(|p| &**p)
    }

    /// Parse with whichever parser handles the document
    pub fn parse(&self, document: &str, content: &str) -> Result<Schema, SchemaError> {
        self.find_for(document)
            .ok_or_else(|| SchemaError::NoParserForExtension(document.to_string()))?
            .parse(document, content)
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.extensions())
            .copied()
            .collect()
    }
}

/// Registry with the XML and JSON parsers
#[inline]
#[must_use]
pub fn default_parsers() -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(JsonSchemaParser);
    registry.register(XmlSchemaParser);
    registry
}

/// Interpret a `Y`/`N` flag
pub(crate) fn flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("y")
}

/// `None` for blank attributes
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_selects_by_extension() {
        let registry = default_parsers();
        assert!(registry.find_for("SettingsTerminal.xml").is_some());
        assert!(registry.find_for("settings.JSON").is_some());
        assert!(registry.find_for("settings.yaml").is_none());
        assert!(registry.find_for("noextension").is_none());
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = default_parsers().parse("settings.ini", "").unwrap_err();
        assert!(matches!(err, SchemaError::NoParserForExtension(_)));
    }

    #[test]
    fn flags() {
        assert!(flag("Y"));
        assert!(flag(" y"));
        assert!(!flag("N"));
        assert!(!flag(""));
    }
}

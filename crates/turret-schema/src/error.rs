//! Error types for schema loading and lookup

use std::path::PathBuf;

/// Errors raised while loading or querying a schema document
///
/// `NotFound` is fatal for a rendering session: no form can be built
/// without the document, so it is surfaced rather than retried.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Document id does not map to a known document
    #[error("schema document not found: '{document}'")]
    NotFound { document: String },

    /// IO error while reading a document
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not well formed
    #[error("syntax error in {document}: {message}")]
    Syntax { document: String, message: String },

    /// Required attribute missing on an element
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// Setting declares a type code outside tb/pw/rb/bl/dd
    #[error("unknown setting type '{code}' for setting '{key}'")]
    UnknownSettingType { key: String, code: String },

    /// No parser handles the document's extension
    #[error("no schema parser registered for '{0}'")]
    NoParserForExtension(String),

    /// Category name not present in the document
    #[error("category '{0}' not found in schema")]
    CategoryNotFound(String),

    /// Group name not present in the category
    #[error("group '{group}' not found in category '{category}'")]
    GroupNotFound { category: String, group: String },
}

impl SchemaError {
    /// Create syntax error for a document
    pub fn syntax(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Syntax {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Create IO error for a path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the document itself could not be found
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

//! Render-time and field-level errors

use serde::Serialize;
use std::fmt;

/// Errors that prevent a form from being rendered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// Range encoding is not `min;max;typeCode` with a known type code and
    /// bounds of that type
    #[error("invalid range '{encoding}' on setting '{key}': {reason}")]
    InvalidRangeEncoding {
        key: String,
        encoding: String,
        reason: String,
    },

    /// Regex does not compile
    #[error("invalid regex '{pattern}' on setting '{key}': {reason}")]
    InvalidRegex {
        key: String,
        pattern: String,
        reason: String,
    },

    /// Category missing from the schema
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    /// Group missing from the category
    #[error("unknown group '{group}' in category '{category}'")]
    UnknownGroup { category: String, group: String },

    /// Setting id missing from the rendered group
    #[error("unknown setting '{setting_id}' in group '{group}'")]
    UnknownSetting { group: String, setting_id: String },
}

/// Which validator rejected a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Empty value on a required field
    Required,
    /// Value outside the range, or not of the range's type
    Range,
    /// Value does not match the pattern
    Regex,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Required => "required",
            Self::Range => "range",
            Self::Regex => "regex",
        })
    }
}

/// One field that failed validation
///
/// Recovered locally: the form highlights the control and saving is blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Setting key
    pub key: String,
    /// Element id of the offending control
    pub control_id: String,
    /// Validator that failed
    pub kind: ViolationKind,
    /// Message shown next to the control
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.key, self.kind, self.message)
    }
}

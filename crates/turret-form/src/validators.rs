//! Field validators
//!
//! Three kinds, attached per setting at render time:
//! - required: only while the setting's toggle is checked
//! - range: `min;max;typeCode`, compared with the semantics of the type code
//! - regex: the whole value must match
//!
//! Range and regex pass on empty input; emptiness is the required
//! validator's concern.

use crate::error::{FieldViolation, FormError, ViolationKind};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use turret_schema::SchemaSetting;

/// Message of the required validator
pub const REQUIRED_MESSAGE: &str = "This field cannot be empty!";
/// Message of the regex validator
pub const REGEX_MESSAGE: &str = "Format is incorrect!";

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Comparison semantics of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeType {
    /// Ordinal string comparison (code `0`)
    String,
    /// Whole numbers (code `1`)
    Integer,
    /// Floating point numbers (code `2`)
    Double,
    /// Calendar dates (code `3`)
    Date,
    /// Amounts with at most two decimals (code `4`)
    Currency,
}

impl RangeType {
    /// Range type from its numeric code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Self::String),
            "1" => Some(Self::Integer),
            "2" => Some(Self::Double),
            "3" => Some(Self::Date),
            "4" => Some(Self::Currency),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Bounds {
    Text(String, String),
    Integer(i64, i64),
    Number(f64, f64),
    Date(NaiveDate, NaiveDate),
}

/// Parsed `min;max;typeCode` range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeRule {
    /// Lower bound as written
    pub min: String,
    /// Upper bound as written
    pub max: String,
    /// Comparison semantics
    pub range_type: RangeType,
    #[serde(skip)]
    bounds: Bounds,
}

impl RangeRule {
    /// Parse a range encoding
    ///
    /// Encodings with fewer than three parts or an empty bound carry no
    /// range and yield `Ok(None)`. An unknown type code or a bound that is
    /// not of the declared type is an error.
    pub fn parse(key: &str, encoding: &str) -> Result<Option<Self>, FormError> {
        let parts: Vec<&str> = encoding.split(';').collect();
        if parts.len() <= 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Ok(None);
        }
        let invalid = |reason: String| FormError::InvalidRangeEncoding {
            key: key.to_string(),
            encoding: encoding.to_string(),
            reason,
        };

        let range_type = RangeType::from_code(parts[2])
            .ok_or_else(|| invalid(format!("unknown type code '{}'", parts[2])))?;
        let (min, max) = (parts[0].trim(), parts[1].trim());

        let bounds = match range_type {
            RangeType::String => Bounds::Text(min.to_string(), max.to_string()),
            RangeType::Integer => Bounds::Integer(
                parse_integer(min).ok_or_else(|| invalid(format!("'{min}' is not an integer")))?,
                parse_integer(max).ok_or_else(|| invalid(format!("'{max}' is not an integer")))?,
            ),
            RangeType::Double => Bounds::Number(
                parse_double(min).ok_or_else(|| invalid(format!("'{min}' is not a number")))?,
                parse_double(max).ok_or_else(|| invalid(format!("'{max}' is not a number")))?,
            ),
            RangeType::Currency => Bounds::Number(
                parse_currency(min).ok_or_else(|| invalid(format!("'{min}' is not an amount")))?,
                parse_currency(max).ok_or_else(|| invalid(format!("'{max}' is not an amount")))?,
            ),
            RangeType::Date => Bounds::Date(
                parse_date(min).ok_or_else(|| invalid(format!("'{min}' is not a date")))?,
                parse_date(max).ok_or_else(|| invalid(format!("'{max}' is not a date")))?,
            ),
        };

        Ok(Some(Self {
            min: min.to_string(),
            max: max.to_string(),
            range_type,
            bounds,
        }))
    }

    /// Whether a value lies within the range
    ///
    /// Empty values pass; values not of the range's type fail.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        match &self.bounds {
            Bounds::Text(min, max) => min.as_str() <= value && value <= max.as_str(),
            Bounds::Integer(min, max) => parse_integer(value).is_some_and(|v| *min <= v && v <= *max),
            Bounds::Number(min, max) => {
                let parsed = if self.range_type == RangeType::Currency {
                    parse_currency(value)
                } else {
                    parse_double(value)
                };
                parsed.is_some_and(|v| *min <= v && v <= *max)
            }
            Bounds::Date(min, max) => parse_date(value).is_some_and(|v| *min <= v && v <= *max),
        }
    }

    /// Message shown when a value is out of range
    #[must_use]
    pub fn message(&self) -> String {
        format!("Value must lie between {} and {}!", self.min, self.max)
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

fn parse_double(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_currency(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', "");
    if let Some((_, fraction)) = s.split_once('.') {
        if fraction.len() > 2 {
            return None;
        }
    }
    parse_double(&s)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s.trim(), format).ok())
}

/// Regex applied to the whole value
#[derive(Debug, Clone, Serialize)]
pub struct RegexRule {
    /// Pattern as written in the schema
    pub pattern: String,
    #[serde(skip)]
    compiled: Regex,
}

impl RegexRule {
    /// Compile a pattern anchored to the whole value
    pub fn compile(key: &str, pattern: &str) -> Result<Self, FormError> {
        let compiled = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            FormError::InvalidRegex {
                key: key.to_string(),
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            compiled,
        })
    }

    /// Whether a value matches; empty values pass
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        value.is_empty() || self.compiled.is_match(value)
    }
}

impl PartialEq for RegexRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

/// A validator attached to a control
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// Value must not be empty
    Required,
    /// Value must lie within a range
    Range(RangeRule),
    /// Value must match a pattern
    Regex(RegexRule),
}

impl Validator {
    /// Violation kind this validator reports
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::Required => ViolationKind::Required,
            Self::Range(_) => ViolationKind::Range,
            Self::Regex(_) => ViolationKind::Regex,
        }
    }

    /// Message shown when the validator fails
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Required => REQUIRED_MESSAGE.to_string(),
            Self::Range(rule) => rule.message(),
            Self::Regex(_) => REGEX_MESSAGE.to_string(),
        }
    }

    /// Whether a value passes
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Required => !value.trim().is_empty(),
            Self::Range(rule) => rule.contains(value),
            Self::Regex(rule) => rule.matches(value),
        }
    }

    /// Check a value, reporting a violation against `control_id`
    pub fn validate(&self, key: &str, control_id: &str, value: &str) -> Result<(), FieldViolation> {
        if self.accepts(value) {
            return Ok(());
        }
        Err(FieldViolation {
            key: key.to_string(),
            control_id: control_id.to_string(),
            kind: self.kind(),
            message: self.message(),
        })
    }
}

/// Validators for a setting given the state of its toggle
///
/// Required is attached only when the schema asks for it and the toggle is
/// checked; range and regex are attached whenever the schema declares them.
pub fn validators_for(setting: &SchemaSetting, available: bool) -> Result<Vec<Validator>, FormError> {
    let mut validators = Vec::new();
    if setting.validator_require && available {
        validators.push(Validator::Required);
    }
    if let Some(encoding) = &setting.validator_range {
        if let Some(rule) = RangeRule::parse(&setting.key, encoding)? {
            validators.push(Validator::Range(rule));
        }
    }
    if let Some(pattern) = &setting.validator_regex {
        validators.push(Validator::Regex(RegexRule::compile(&setting.key, pattern)?));
    }
    Ok(validators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use turret_schema::SettingType;

    #[test]
    fn short_or_blank_encodings_carry_no_range() {
        assert_eq!(RangeRule::parse("k", "1;100").unwrap(), None);
        assert_eq!(RangeRule::parse("k", ";100;1").unwrap(), None);
        assert_eq!(RangeRule::parse("k", "1;;1").unwrap(), None);
    }

    #[test]
    fn unknown_type_code_is_rejected() {
        let err = RangeRule::parse("k", "1;100;9").unwrap_err();
        assert!(matches!(err, FormError::InvalidRangeEncoding { .. }));
        assert!(RangeRule::parse("k", "1;100;x").is_err());
    }

    #[test]
    fn bounds_must_match_type() {
        assert!(RangeRule::parse("k", "a;100;1").is_err());
        assert!(RangeRule::parse("k", "2024-01-01;soon;3").is_err());
    }

    #[test]
    fn integer_range() {
        let rule = RangeRule::parse("k", "1;100;1").unwrap().unwrap();
        assert!(rule.contains("1"));
        assert!(rule.contains("100"));
        assert!(rule.contains(""));
        assert!(!rule.contains("150"));
        assert!(!rule.contains("0"));
        assert!(!rule.contains("5.5"));
        assert_eq!(rule.message(), "Value must lie between 1 and 100!");
    }

    #[test]
    fn double_and_currency_ranges() {
        let double = RangeRule::parse("k", "0.5;1.5;2").unwrap().unwrap();
        assert!(double.contains("1.25"));
        assert!(!double.contains("2"));

        let currency = RangeRule::parse("k", "0;1,000;4").unwrap().unwrap();
        assert!(currency.contains("999.99"));
        assert!(!currency.contains("9.999"));
        assert!(!currency.contains("1000.01"));
    }

    #[test]
    fn date_range_accepts_both_formats() {
        let rule = RangeRule::parse("k", "2024-01-01;12/31/2024;3").unwrap().unwrap();
        assert!(rule.contains("2024-06-15"));
        assert!(rule.contains("06/15/2024"));
        assert!(!rule.contains("2025-01-01"));
        assert!(!rule.contains("not a date"));
    }

    #[test]
    fn string_range_is_ordinal() {
        let rule = RangeRule::parse("k", "b;d;0").unwrap().unwrap();
        assert!(rule.contains("c"));
        assert!(!rule.contains("a"));
    }

    #[test]
    fn regex_matches_whole_value() {
        let rule = RegexRule::compile("k", r"\d{3}").unwrap();
        assert!(rule.matches("123"));
        assert!(!rule.matches("1234"));
        assert!(!rule.matches("a123"));
        assert!(rule.matches(""));
        assert!(RegexRule::compile("k", "(").is_err());
    }

    #[test]
    fn required_depends_on_toggle() {
        let mut setting = SchemaSetting::new("1", "name", SettingType::Text, "");
        setting.validator_require = true;
        setting.validator_regex = Some("[a-z]+".into());

        let on = validators_for(&setting, true).unwrap();
        assert_eq!(on.len(), 2);
        assert_eq!(on[0], Validator::Required);

        let off = validators_for(&setting, false).unwrap();
        assert_eq!(off.len(), 1);
        assert_eq!(off[0].kind(), ViolationKind::Regex);
    }

    #[test]
    fn validate_reports_control() {
        let violation = Validator::Required
            .validate("name", "setting_name", " ")
            .unwrap_err();
        assert_eq!(violation.control_id, "setting_name");
        assert_eq!(violation.message, REQUIRED_MESSAGE);
    }
}

//! Field type tags and value validation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Calendar format shared by `date` and `date_interval` values.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The value kinds a table field can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    /// Whole numbers: JSON numbers or integer-parseable text.
    Integer,
    /// Floating point numbers: JSON numbers or float-parseable text.
    Real,
    /// Exactly one character of text.
    Char,
    /// Any value; everything has a textual form.
    String,
    /// A `YYYY-MM-DD` calendar date.
    Date,
    /// Two dates joined by `/`. Start and end are not ordered.
    DateInterval,
}

impl TypeTag {
    /// Check whether a raw value is acceptable for this tag.
    ///
    /// Validation coerces only to check: callers store the original
    /// representation, not the parsed form. Anything that fails to parse is
    /// invalid; parse errors never escape this function.
    pub fn validates(&self, value: &Value) -> bool {
        match self {
            TypeTag::Integer => match value {
                // Any JSON number coerces to an integer (truncating).
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            TypeTag::Real => match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            TypeTag::Char => {
                matches!(value, Value::String(s) if s.chars().count() == 1)
            }
            TypeTag::String => true,
            TypeTag::Date => {
                matches!(value, Value::String(s) if is_date(s))
            }
            TypeTag::DateInterval => {
                matches!(value, Value::String(s) if is_date_interval(s))
            }
        }
    }

    /// The textual tag used in schemas and persisted files.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Integer => "integer",
            TypeTag::Real => "real",
            TypeTag::Char => "char",
            TypeTag::String => "string",
            TypeTag::Date => "date",
            TypeTag::DateInterval => "date_interval",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error for textual tags that name no known type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown type tag: {0}")]
pub struct UnknownTypeTag(pub String);

impl FromStr for TypeTag {
    type Err = UnknownTypeTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integer" => Ok(TypeTag::Integer),
            "real" => Ok(TypeTag::Real),
            "char" => Ok(TypeTag::Char),
            "string" => Ok(TypeTag::String),
            "date" => Ok(TypeTag::Date),
            "date_interval" => Ok(TypeTag::DateInterval),
            other => Err(UnknownTypeTag(other.to_string())),
        }
    }
}

/// Validate a value against a textual type tag.
///
/// An unrecognized tag is always invalid.
pub fn validate(value: &Value, tag: &str) -> bool {
    tag.parse::<TypeTag>()
        .map(|t| t.validates(value))
        .unwrap_or(false)
}

fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
}

fn is_date_interval(s: &str) -> bool {
    let mut parts = s.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(start), Some(end), None) => is_date(start) && is_date(end),
        _ => false,
    }
}

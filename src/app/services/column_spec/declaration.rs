//! Serde model of the declarative column mapping file
//!
//! The declaration is loose: indices and sentinels may be written
//! as numbers or strings, and every structural rule is enforced afterwards by
//! [`super::ColumnSpecification::from_declaration`] so that each problem can be
//! reported against the file it came from.

use serde::Deserialize;
use std::fmt;

/// Top-level column mapping document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecDeclaration {
    /// Standard output fields
    #[serde(default, rename = "column")]
    pub columns: Vec<ColumnDeclaration>,

    /// Date/time structure; exactly one is required
    #[serde(default)]
    pub date_time: Option<DateTimeDeclaration>,
}

/// One `[[column]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDeclaration {
    pub field: String,
    pub input_index: DeclaredValue,
    pub input_name: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub missing_value: Option<DeclaredValue>,
    #[serde(default)]
    pub converter: Option<String>,
}

/// The `[date_time]` table: an ordered list of child elements
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateTimeDeclaration {
    pub elements: Vec<DateElementDeclaration>,
}

/// One child element of the date/time structure
///
/// Column elements carry `index` and `column`; the day-one offset element
/// carries `value` instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateElementDeclaration {
    pub element: String,
    #[serde(default)]
    pub index: Option<DeclaredValue>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub missing_value: Option<DeclaredValue>,
    #[serde(default)]
    pub value: Option<DeclaredValue>,
}

/// A scalar that may be written as an integer, a float or a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DeclaredValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl DeclaredValue {
    /// Interpret as a 1-based column index
    pub fn as_index(&self) -> Option<usize> {
        match self.as_integer()? {
            i if i >= 1 => usize::try_from(i).ok(),
            _ => None,
        }
    }

    /// Interpret as an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DeclaredValue::Integer(i) => Some(*i),
            DeclaredValue::Float(_) => None,
            DeclaredValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for DeclaredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredValue::Integer(i) => write!(f, "{}", i),
            DeclaredValue::Float(v) => write!(f, "{}", v),
            DeclaredValue::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

//! Instrument type descriptors.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered enumeration keys. Insertion order is the external ordering.
pub type EnumerationCollection = IndexMap<String, Option<Enumeration>>;

/// Base type of a field, column, or named type.
///
/// RIOS allows a type to derive from another named type, so any unknown
/// string is kept as [`BaseType::Named`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BaseType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    Enumeration,
    EnumerationSet,
    RecordList,
    Matrix,
    Named(String),
}

impl BaseType {
    /// Parse a base type name. Never fails: unknown names are named types.
    pub fn parse(value: &str) -> Self {
        match value {
            "text" => Self::Text,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "time" => Self::Time,
            "dateTime" => Self::DateTime,
            "enumeration" => Self::Enumeration,
            "enumerationSet" => Self::EnumerationSet,
            "recordList" => Self::RecordList,
            "matrix" => Self::Matrix,
            other => Self::Named(other.to_string()),
        }
    }

    /// RIOS spelling of the base type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "dateTime",
            Self::Enumeration => "enumeration",
            Self::EnumerationSet => "enumerationSet",
            Self::RecordList => "recordList",
            Self::Matrix => "matrix",
            Self::Named(name) => name,
        }
    }

    /// Returns true for `enumeration` and `enumerationSet`.
    pub fn is_enumerated(&self) -> bool {
        matches!(self, Self::Enumeration | Self::EnumerationSet)
    }
}

impl From<String> for BaseType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<BaseType> for String {
    fn from(value: BaseType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `type` member of a field or column: a type name or an inline type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldType {
    Named(BaseType),
    Inline(Box<TypeObject>),
}

impl FieldType {
    /// Base type as written, without resolving named types.
    pub fn base(&self) -> &BaseType {
        match self {
            Self::Named(base) => base,
            Self::Inline(object) => &object.base,
        }
    }
}

impl From<BaseType> for FieldType {
    fn from(value: BaseType) -> Self {
        Self::Named(value)
    }
}

impl From<TypeObject> for FieldType {
    fn from(value: TypeObject) -> Self {
        Self::Inline(Box::new(value))
    }
}

/// A single range bound. Dates and times are kept as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Bound {
    /// Numeric value of the bound, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// `{min?, max?}` constraint. RIOS requires at least one member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
}

impl BoundConstraint {
    pub fn new(min: Option<Bound>, max: Option<Bound>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Enumeration entry metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Enumeration {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Column of a matrix type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub identifiable: bool,
}

/// Row of a matrix type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
}

/// Full type descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeObject {
    pub base: BaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<BoundConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumerations: Option<EnumerationCollection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,
}

impl TypeObject {
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            range: None,
            enumerations: None,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// `enumeration` type over the given keys.
    pub fn enumeration(enumerations: EnumerationCollection) -> Self {
        Self {
            enumerations: Some(enumerations),
            ..Self::new(BaseType::Enumeration)
        }
    }

    /// `enumerationSet` type over the given keys.
    pub fn enumeration_set(enumerations: EnumerationCollection) -> Self {
        Self {
            enumerations: Some(enumerations),
            ..Self::new(BaseType::EnumerationSet)
        }
    }

    /// Empty `matrix` type; columns and rows are appended by the assembler.
    pub fn matrix() -> Self {
        Self::new(BaseType::Matrix)
    }

    #[must_use]
    pub fn with_range(mut self, range: BoundConstraint) -> Self {
        self.range = (!range.is_empty()).then_some(range);
        self
    }

    pub fn add_enumeration(&mut self, key: impl Into<String>, entry: Option<Enumeration>) {
        self.enumerations
            .get_or_insert_with(EnumerationCollection::new)
            .insert(key.into(), entry);
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::types::{BaseType, FieldType, TypeObject, is_false};

/// `{id, version}` pointer from a Form or CalculationSet to its Instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentReference {
    pub id: String,
    pub version: String,
}

impl InstrumentReference {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for InstrumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

/// One entry of the instrument record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
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

impl Field {
    pub fn new(id: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            field_type: field_type.into(),
            required: false,
            identifiable: false,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_identifiable(mut self, identifiable: bool) -> Self {
        self.identifiable = identifiable;
        self
    }
}

/// RIOS Instrument definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub version: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub types: BTreeMap<String, TypeObject>,
    #[serde(default)]
    pub record: Vec<Field>,
}

impl Instrument {
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Reference used by the Form and CalculationSet built from this instrument.
    pub fn reference(&self) -> InstrumentReference {
        InstrumentReference::new(&self.id, &self.version)
    }

    pub fn add_field(&mut self, field: Field) {
        self.record.push(field);
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.record.iter().find(|field| field.id == id)
    }

    pub fn try_field(&self, id: &str) -> Result<&Field> {
        self.field(id).ok_or_else(|| ModelError::UnknownField { id: id.into() })
    }

    pub fn has_field(&self, id: &str) -> bool {
        self.field(id).is_some()
    }

    /// Resolves a field type into a full descriptor whose base is a built-in type.
    ///
    /// Named types are followed through `types`; members set on a derived
    /// type override those inherited from its base.
    pub fn resolve_type(&self, field_type: &FieldType) -> Result<TypeObject> {
        let start = match field_type {
            FieldType::Named(base) => TypeObject::new(base.clone()),
            FieldType::Inline(object) => object.as_ref().clone(),
        };
        self.resolve_object(start, 0)
    }

    fn resolve_object(&self, object: TypeObject, depth: usize) -> Result<TypeObject> {
        let BaseType::Named(name) = &object.base else {
            return Ok(object);
        };
        if depth > self.types.len() {
            return Err(ModelError::CyclicType { name: name.clone() });
        }
        let parent = self
            .types
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownType { name: name.clone() })?;
        let parent = self.resolve_object(parent, depth + 1)?;
        Ok(TypeObject {
            base: parent.base,
            range: object.range.or(parent.range),
            enumerations: object.enumerations.or(parent.enumerations),
            columns: if object.columns.is_empty() {
                parent.columns
            } else {
                object.columns
            },
            rows: if object.rows.is_empty() {
                parent.rows
            } else {
                object.rows
            },
        })
    }
}

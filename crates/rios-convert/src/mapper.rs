//! Field type and widget inference for REDCap rows.

use tracing::debug;

use rios_ingest::CanonicalRecord;
use rios_model::naming::{CHOICES, TEXT_VALIDATION_TYPE, canonical_enumeration_key};
use rios_model::{
    BaseType, Bound, BoundConstraint, Descriptor, Enumeration, EnumerationCollection, FieldType,
    LocalizedString, TypeObject, WidgetType,
};

use crate::error::MappingError;

pub(crate) const FIELD_TYPE: &str = "field_type";
const VALIDATION_MIN: &str = "text_validation_min";
const VALIDATION_MAX: &str = "text_validation_max";

/// Fixed range of REDCap sliders.
const SLIDER_MIN: f64 = 0.0;
const SLIDER_MAX: f64 = 100.0;

/// What a row contributes once its type is known.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedField {
    /// An instrument field presented by a question.
    Field(FieldMapping),
    /// A calculation; carries the REDCap formula untouched.
    Calculation { formula: String },
    /// Display-only text; no field.
    Descriptive,
}

/// Type of the field plus the question settings that go with it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub field_type: FieldType,
    pub widget: WidgetType,
    pub enumerations: Vec<Descriptor>,
}

impl FieldMapping {
    fn new(field_type: impl Into<FieldType>, widget: WidgetType) -> Self {
        Self {
            field_type: field_type.into(),
            widget,
            enumerations: Vec::new(),
        }
    }

    /// Returns true if the field type is an enumeration or enumeration set.
    pub fn is_enumerated(&self) -> bool {
        self.field_type.base().is_enumerated()
    }
}

/// Maps one record to a RIOS type, widget and form enumerations.
pub fn map_record(
    record: &CanonicalRecord,
    localization: &str,
) -> Result<MappedField, MappingError> {
    let tag = record.trimmed(FIELD_TYPE).to_ascii_lowercase();
    let mapped = match tag.as_str() {
        "text" => MappedField::Field(map_text(record)?),
        "notes" => MappedField::Field(FieldMapping::new(BaseType::Text, WidgetType::TextArea)),
        "dropdown" => MappedField::Field(map_choices(
            record,
            localization,
            BaseType::Enumeration,
            WidgetType::DropDown,
        )?),
        "radio" => MappedField::Field(map_choices(
            record,
            localization,
            BaseType::Enumeration,
            WidgetType::RadioGroup,
        )?),
        "checkbox" => MappedField::Field(map_choices(
            record,
            localization,
            BaseType::EnumerationSet,
            WidgetType::CheckGroup,
        )?),
        "slider" => {
            let range = BoundConstraint::new(
                Some(Bound::Float(SLIDER_MIN)),
                Some(Bound::Float(SLIDER_MAX)),
            );
            MappedField::Field(FieldMapping::new(
                TypeObject::new(BaseType::Float).with_range(range),
                WidgetType::InputNumber,
            ))
        }
        "truefalse" => MappedField::Field(fixed_choices(
            localization,
            &[("true", "True"), ("false", "False")],
        )),
        "yesno" => MappedField::Field(fixed_choices(
            localization,
            &[("yes", "Yes"), ("no", "No")],
        )),
        "calc" => MappedField::Calculation {
            formula: record.trimmed(CHOICES).to_string(),
        },
        "descriptive" => MappedField::Descriptive,
        _ => return Err(MappingError::UnknownFieldType { tag }),
    };
    debug!(line = record.line(), field_type = %tag, "mapped field type");
    Ok(mapped)
}

/// RIOS base type of a REDCap text validation subtype.
pub fn text_base(validation: &str) -> BaseType {
    let validation = validation.trim().to_ascii_lowercase();
    if validation.starts_with("date") {
        BaseType::DateTime
    } else if validation == "integer" {
        BaseType::Integer
    } else if validation.starts_with("number") {
        BaseType::Float
    } else {
        BaseType::Text
    }
}

fn map_text(record: &CanonicalRecord) -> Result<FieldMapping, MappingError> {
    let base = text_base(record.get(TEXT_VALIDATION_TYPE));
    let widget = match base {
        BaseType::Integer | BaseType::Float => WidgetType::InputNumber,
        BaseType::DateTime => WidgetType::DateTimePicker,
        _ => WidgetType::InputText,
    };
    if base == BaseType::Text {
        return Ok(FieldMapping::new(base, widget));
    }
    let min = parse_bound(record.trimmed(VALIDATION_MIN), &base)?;
    let max = parse_bound(record.trimmed(VALIDATION_MAX), &base)?;
    if min.is_none() && max.is_none() {
        return Ok(FieldMapping::new(base, widget));
    }
    let object = TypeObject::new(base).with_range(BoundConstraint::new(min, max));
    Ok(FieldMapping::new(object, widget))
}

fn parse_bound(value: &str, base: &BaseType) -> Result<Option<Bound>, MappingError> {
    if value.is_empty() {
        return Ok(None);
    }
    let invalid = || MappingError::InvalidBound {
        value: value.to_string(),
        base: base.to_string(),
    };
    let bound = match base {
        BaseType::Integer => Bound::Integer(value.parse().map_err(|_| invalid())?),
        BaseType::Float => {
            let parsed: f64 = value.parse().map_err(|_| invalid())?;
            if !parsed.is_finite() {
                return Err(invalid());
            }
            Bound::Float(parsed)
        }
        _ => Bound::Text(value.to_string()),
    };
    Ok(Some(bound))
}

fn map_choices(
    record: &CanonicalRecord,
    localization: &str,
    base: BaseType,
    widget: WidgetType,
) -> Result<FieldMapping, MappingError> {
    let (collection, descriptors) = parse_choices(record.get(CHOICES), localization)?;
    let object = if base == BaseType::EnumerationSet {
        TypeObject::enumeration_set(collection)
    } else {
        TypeObject::enumeration(collection)
    };
    let mut mapping = FieldMapping::new(object, widget);
    mapping.enumerations = descriptors;
    Ok(mapping)
}

fn fixed_choices(localization: &str, choices: &[(&str, &str)]) -> FieldMapping {
    let mut collection = EnumerationCollection::new();
    let mut descriptors = Vec::with_capacity(choices.len());
    for (key, label) in choices {
        collection.insert((*key).to_string(), Some(Enumeration::new(*label)));
        descriptors.push(Descriptor::new(
            *key,
            LocalizedString::new(localization, *label),
        ));
    }
    let mut mapping = FieldMapping::new(
        TypeObject::enumeration(collection),
        WidgetType::RadioGroup,
    );
    mapping.enumerations = descriptors;
    mapping
}

/// Parses `key, label | key, label | ...`.
///
/// Each entry splits at its first comma; a missing label reuses the key.
/// Blank entries (a trailing `|`) are ignored.
pub fn parse_choices(
    raw: &str,
    localization: &str,
) -> Result<(EnumerationCollection, Vec<Descriptor>), MappingError> {
    let malformed = |reason: String| MappingError::MalformedChoices {
        choices: raw.to_string(),
        reason,
    };
    let mut collection = EnumerationCollection::new();
    let mut descriptors = Vec::new();
    for entry in raw.split('|').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (raw_key, label) = match entry.split_once(',') {
            Some((key, label)) => (key.trim(), label.trim()),
            None => (entry, ""),
        };
        let key = canonical_enumeration_key(raw_key);
        if key.is_empty() {
            return Err(malformed(format!("entry '{entry}' has no key")));
        }
        if collection.contains_key(&key) {
            return Err(malformed(format!("duplicate key '{key}'")));
        }
        let label = if label.is_empty() { raw_key } else { label };
        descriptors.push(Descriptor::new(
            key.clone(),
            LocalizedString::new(localization, label),
        ));
        collection.insert(key, None);
    }
    if collection.is_empty() {
        return Err(malformed("no choices".to_string()));
    }
    Ok((collection, descriptors))
}

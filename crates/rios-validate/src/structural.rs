//! Structural checks for RIOS documents.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use rios_model::naming::{is_enumeration_key, is_identifier};
use rios_model::{
    BaseType, Bound, BoundConstraint, CalculationSet, Element, Form, Instrument,
    InstrumentReference, Question, TypeObject,
};

use crate::error::{DocumentKind, Issue, ValidationError};
use crate::validator::Validator;

/// Calculation methods RIOS understands.
const METHODS: &[&str] = &["python", "htsql"];

/// Validator for the structural rules of the RIOS definitions.
///
/// Collects every issue in a document instead of stopping at the first.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for StructuralValidator {
    fn validate_instrument(&self, instrument: &Instrument) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        require_text(&mut issues, "id", &instrument.id);
        require_text(&mut issues, "version", &instrument.version);
        require_text(&mut issues, "title", &instrument.title);
        if instrument.record.is_empty() {
            issues.push(Issue::new("record", "must contain at least one field"));
        }

        let mut seen = BTreeSet::new();
        for (idx, field) in instrument.record.iter().enumerate() {
            let path = format!("record[{idx}]");
            if !is_identifier(&field.id) {
                issues.push(Issue::new(
                    format!("{path}.id"),
                    format!("'{}' is not a valid identifier", field.id),
                ));
            }
            if !seen.insert(field.id.as_str()) {
                issues.push(Issue::new(
                    format!("{path}.id"),
                    format!("duplicate field id '{}'", field.id),
                ));
            }
            match instrument.resolve_type(&field.field_type) {
                Ok(resolved) => check_type(&mut issues, &format!("{path}.type"), &resolved),
                Err(err) => issues.push(Issue::new(format!("{path}.type"), err.to_string())),
            }
        }

        debug!(
            instrument = %instrument.id,
            fields = instrument.record.len(),
            issues = issues.len(),
            "validated instrument"
        );
        ValidationError::check(DocumentKind::Instrument, issues)
    }

    fn validate_form(&self, form: &Form, instrument: &Instrument) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_reference(&mut issues, &form.instrument, instrument);
        require_text(&mut issues, "defaultLocalization", &form.default_localization);
        if form.pages.is_empty() {
            issues.push(Issue::new("pages", "must contain at least one page"));
        }

        let fields: BTreeMap<&str, _> = instrument
            .record
            .iter()
            .map(|field| (field.id.as_str(), field))
            .collect();
        let mut page_ids = BTreeSet::new();
        let mut presented = BTreeSet::new();
        for (page_idx, page) in form.pages.iter().enumerate() {
            let path = format!("pages[{page_idx}]");
            if !is_identifier(&page.id) {
                issues.push(Issue::new(
                    format!("{path}.id"),
                    format!("'{}' is not a valid identifier", page.id),
                ));
            }
            if !page_ids.insert(page.id.as_str()) {
                issues.push(Issue::new(
                    format!("{path}.id"),
                    format!("duplicate page id '{}'", page.id),
                ));
            }
            if page.elements.is_empty() {
                issues.push(Issue::new(
                    format!("{path}.elements"),
                    "must contain at least one element",
                ));
            }
            for (element_idx, element) in page.elements.iter().enumerate() {
                let path = format!("{path}.elements[{element_idx}].options");
                let Element::Question(question) = element else {
                    continue;
                };
                if !presented.insert(question.field_id.as_str()) {
                    issues.push(Issue::new(
                        format!("{path}.fieldId"),
                        format!("field '{}' is presented more than once", question.field_id),
                    ));
                }
                match fields.get(question.field_id.as_str()) {
                    Some(field) => match instrument.resolve_type(&field.field_type) {
                        Ok(resolved) => check_question(
                            &mut issues,
                            &path,
                            question,
                            &resolved,
                            &form.default_localization,
                        ),
                        Err(err) => issues.push(Issue::new(format!("{path}.fieldId"), err.to_string())),
                    },
                    None => issues.push(Issue::new(
                        format!("{path}.fieldId"),
                        format!("field '{}' is not in the instrument", question.field_id),
                    )),
                }
            }
        }

        debug!(pages = form.pages.len(), issues = issues.len(), "validated form");
        ValidationError::check(DocumentKind::Form, issues)
    }

    fn validate_calculation_set(
        &self,
        calculations: &CalculationSet,
        instrument: &Instrument,
    ) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_reference(&mut issues, &calculations.instrument, instrument);
        if calculations.calculations.is_empty() {
            issues.push(Issue::new("calculations", "must contain at least one calculation"));
        }
        let mut seen = BTreeSet::new();
        for (idx, calculation) in calculations.calculations.iter().enumerate() {
            let path = format!("calculations[{idx}]");
            if !is_identifier(&calculation.id) {
                issues.push(Issue::new(
                    format!("{path}.id"),
                    format!("'{}' is not a valid identifier", calculation.id),
                ));
            }
            if !seen.insert(calculation.id.as_str()) {
                issues.push(Issue::new(
                    format!("{path}.id"),
                    format!("duplicate calculation id '{}'", calculation.id),
                ));
            }
            if instrument.has_field(&calculation.id) {
                issues.push(Issue::new(
                    format!("{path}.id"),
                    format!("'{}' is also an instrument field", calculation.id),
                ));
            }
            if !METHODS.contains(&calculation.method.as_str()) {
                issues.push(Issue::new(
                    format!("{path}.method"),
                    format!("unknown method '{}'", calculation.method),
                ));
            }
            if calculation.expression().trim().is_empty() {
                issues.push(Issue::new(
                    format!("{path}.options.expression"),
                    "must not be empty",
                ));
            }
        }

        debug!(
            calculations = calculations.calculations.len(),
            issues = issues.len(),
            "validated calculation set"
        );
        ValidationError::check(DocumentKind::CalculationSet, issues)
    }
}

fn require_text(issues: &mut Vec<Issue>, path: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(Issue::new(path, "must not be empty"));
    }
}

fn check_reference(issues: &mut Vec<Issue>, reference: &InstrumentReference, instrument: &Instrument) {
    let expected = instrument.reference();
    if *reference != expected {
        issues.push(Issue::new(
            "instrument",
            format!("references {reference} but the instrument is {expected}"),
        ));
    }
}

fn check_type(issues: &mut Vec<Issue>, path: &str, resolved: &TypeObject) {
    if let Some(range) = &resolved.range {
        check_range(issues, &format!("{path}.range"), range);
    }
    match resolved.base {
        BaseType::Enumeration | BaseType::EnumerationSet => {
            let keys = resolved.enumerations.as_ref();
            if keys.is_none_or(|keys| keys.is_empty()) {
                issues.push(Issue::new(
                    format!("{path}.enumerations"),
                    "must contain at least one enumeration",
                ));
            }
            for key in keys.into_iter().flat_map(|keys| keys.keys()) {
                if !is_enumeration_key(key) {
                    issues.push(Issue::new(
                        format!("{path}.enumerations"),
                        format!("'{key}' is not a valid enumeration id"),
                    ));
                }
            }
        }
        BaseType::Matrix => {
            if resolved.columns.is_empty() {
                issues.push(Issue::new(
                    format!("{path}.columns"),
                    "must contain at least one column",
                ));
            }
            if resolved.rows.is_empty() {
                issues.push(Issue::new(format!("{path}.rows"), "must contain at least one row"));
            }
            for (idx, column) in resolved.columns.iter().enumerate() {
                if !is_identifier(&column.id) {
                    issues.push(Issue::new(
                        format!("{path}.columns[{idx}].id"),
                        format!("'{}' is not a valid identifier", column.id),
                    ));
                }
            }
            for (idx, row) in resolved.rows.iter().enumerate() {
                if !is_identifier(&row.id) {
                    issues.push(Issue::new(
                        format!("{path}.rows[{idx}].id"),
                        format!("'{}' is not a valid identifier", row.id),
                    ));
                }
            }
        }
        _ => {}
    }
}

fn check_range(issues: &mut Vec<Issue>, path: &str, range: &BoundConstraint) {
    let (Some(min), Some(max)) = (&range.min, &range.max) else {
        return;
    };
    let inverted = match (min, max) {
        (Bound::Text(min), Bound::Text(max)) => min > max,
        _ => matches!((min.as_f64(), max.as_f64()), (Some(min), Some(max)) if min > max),
    };
    if inverted {
        issues.push(Issue::new(path, format!("min {min} is greater than max {max}")));
    }
}

fn check_question(
    issues: &mut Vec<Issue>,
    path: &str,
    question: &Question,
    resolved: &TypeObject,
    localization: &str,
) {
    if !question.text.has_locale(localization) {
        issues.push(Issue::new(
            format!("{path}.text"),
            format!("missing '{localization}' translation"),
        ));
    }
    for (idx, descriptor) in question.enumerations.iter().enumerate() {
        let known = resolved
            .enumerations
            .as_ref()
            .is_some_and(|keys| keys.contains_key(&descriptor.id));
        if !known {
            issues.push(Issue::new(
                format!("{path}.enumerations[{idx}].id"),
                format!("'{}' is not an enumeration of the field", descriptor.id),
            ));
        }
    }
    if resolved.base == BaseType::Matrix {
        for (idx, sub) in question.questions.iter().enumerate() {
            if !resolved.columns.iter().any(|column| column.id == sub.field_id) {
                issues.push(Issue::new(
                    format!("{path}.questions[{idx}].fieldId"),
                    format!("'{}' is not a column of the matrix", sub.field_id),
                ));
            }
        }
        for (idx, row) in question.rows.iter().enumerate() {
            if !resolved.rows.iter().any(|known| known.id == row.id) {
                issues.push(Issue::new(
                    format!("{path}.rows[{idx}].id"),
                    format!("'{}' is not a row of the matrix", row.id),
                ));
            }
        }
    }
}

//! RIOS documents back to REDCap data dictionary rows.

use tracing::debug;

use rios_expr::{expression_to_source, trigger_to_source};
use rios_model::{
    BaseType, Bound, Calculation, Descriptor, Element, Field, LocalizedString, Question,
    TypeObject, WidgetType,
};

use crate::error::RowError;
use crate::log::ConversionLog;
use crate::options::RiosDocuments;

/// REDCap data dictionary header row.
pub const COLUMNS: [&str; 18] = [
    "Variable / Field Name",
    "Form Name",
    "Section Header",
    "Field Type",
    "Field Label",
    "Choices, Calculations, OR Slider Labels",
    "Field Note",
    "Text Validation Type OR Show Slider Number",
    "Text Validation Min",
    "Text Validation Max",
    "Identifier?",
    "Branching Logic (Show field only if...)",
    "Required Field?",
    "Custom Alignment",
    "Question Number (surveys only)",
    "Matrix Group Name",
    "Matrix Ranking?",
    "Field Annotation",
];

/// Form name given to calculation rows.
pub const CALCULATION_FORM: &str = "calculations";

/// One REDCap row under construction; unset cells stay empty.
#[derive(Debug, Default)]
struct RowCells {
    variable: String,
    form: String,
    section_header: String,
    field_type: String,
    label: String,
    choices: String,
    note: String,
    validation: String,
    min: String,
    max: String,
    identifier: bool,
    branching: String,
    required: bool,
    matrix_group: String,
    matrix_ranking: bool,
}

impl RowCells {
    fn into_row(self) -> Vec<String> {
        let flag = |set: bool| if set { "y".to_string() } else { String::new() };
        vec![
            self.variable,
            self.form,
            self.section_header,
            self.field_type,
            self.label,
            self.choices,
            self.note,
            self.validation,
            self.min,
            self.max,
            flag(self.identifier),
            self.branching,
            flag(self.required),
            String::new(),
            String::new(),
            self.matrix_group,
            flag(self.matrix_ranking),
            String::new(),
        ]
    }
}

/// REDCap field type and validation subtype of a resolved RIOS base type.
pub fn type_tuple(base: &BaseType, widget: Option<&WidgetType>) -> (&'static str, &'static str) {
    match base {
        BaseType::Float => ("text", "number"),
        BaseType::Integer => ("text", "integer"),
        BaseType::Date | BaseType::DateTime => ("text", "date_ymd"),
        BaseType::Text if widget == Some(&WidgetType::TextArea) => ("notes", ""),
        BaseType::Enumeration => match widget {
            Some(WidgetType::RadioGroup) => ("radio", ""),
            _ => ("dropdown", ""),
        },
        BaseType::EnumerationSet => ("checkbox", ""),
        _ => ("text", ""),
    }
}

/// Walks a Form (and CalculationSet) into REDCap rows, header row first.
pub struct ReverseAssembler<'a> {
    documents: &'a RiosDocuments,
    localization: &'a str,
    section_header: String,
    rows: Vec<Vec<String>>,
}

impl<'a> ReverseAssembler<'a> {
    pub fn new(documents: &'a RiosDocuments, localization: &'a str) -> Self {
        Self {
            documents,
            localization,
            section_header: String::new(),
            rows: vec![COLUMNS.iter().map(ToString::to_string).collect()],
        }
    }

    /// Builds every row. Questions that cannot be expressed are logged and
    /// skipped.
    pub fn assemble(mut self, log: &mut ConversionLog) -> Vec<Vec<String>> {
        let documents = self.documents;
        for page in &documents.form.pages {
            for element in &page.elements {
                match element {
                    Element::Header(options) | Element::Text(options) => {
                        self.section_header = self.local(&options.text).to_string();
                    }
                    Element::Question(question) => {
                        if let Err(err) = self.question(&page.id, question) {
                            log.warn(err.to_string());
                        }
                        self.section_header.clear();
                    }
                }
            }
        }
        if let Some(calculations) = &documents.calculations {
            for calculation in &calculations.calculations {
                match self.calculation(calculation) {
                    Ok(row) => self.rows.push(row),
                    Err(err) => log.warn(format!(
                        "calculation '{}': {err}. Calculation ignored",
                        calculation.id
                    )),
                }
            }
        }
        debug!(rows = self.rows.len() - 1, "REDCap rows assembled");
        self.rows
    }

    fn local<'s>(&self, text: &'s LocalizedString) -> &'s str {
        text.get_local_text(self.localization)
    }

    fn choices(&self, enumerations: &[Descriptor]) -> String {
        enumerations
            .iter()
            .map(|descriptor| format!("{}, {}", descriptor.id, self.local(&descriptor.text)))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn field(&self, id: &str) -> Result<(&'a Field, TypeObject), RowError> {
        let instrument = &self.documents.instrument;
        let field = instrument.try_field(id)?;
        let resolved = instrument.resolve_type(&field.field_type)?;
        Ok((field, resolved))
    }

    fn question(&mut self, page_id: &str, question: &Question) -> Result<(), RowError> {
        if question.is_matrix() {
            return self.matrix(page_id, question);
        }
        let (field, resolved) = self.field(&question.field_id)?;
        let (field_type, validation) = type_tuple(&resolved.base, question.widget_type());
        let branching = match question.events.first() {
            Some(event) => trigger_to_source(&event.trigger)?,
            None => String::new(),
        };
        let range = resolved.range.as_ref();
        let bound = |bound: Option<&Bound>| bound.map(ToString::to_string).unwrap_or_default();
        let cells = RowCells {
            variable: question.field_id.clone(),
            form: page_id.to_string(),
            section_header: self.section_header.clone(),
            field_type: field_type.to_string(),
            label: self.local(&question.text).to_string(),
            choices: self.choices(&question.enumerations),
            note: question
                .help
                .as_ref()
                .map(|help| self.local(help).to_string())
                .unwrap_or_default(),
            validation: validation.to_string(),
            min: bound(range.and_then(|range| range.min.as_ref())),
            max: bound(range.and_then(|range| range.max.as_ref())),
            identifier: field.identifiable,
            branching,
            required: field.required,
            ..RowCells::default()
        };
        self.rows.push(cells.into_row());
        Ok(())
    }

    fn matrix(&mut self, page_id: &str, question: &Question) -> Result<(), RowError> {
        let unsupported = |reason: &str| RowError::UnsupportedMatrix {
            field_id: question.field_id.clone(),
            reason: reason.to_string(),
        };
        let [column_question] = question.questions.as_slice() else {
            return Err(unsupported("REDCap matrices support only one question"));
        };
        let (_, resolved) = self.field(&question.field_id)?;
        let column = resolved
            .columns
            .iter()
            .find(|column| column.id == column_question.field_id)
            .or_else(|| resolved.columns.first())
            .ok_or_else(|| unsupported("REDCap matrix column must be an enumeration"))?;
        let column_type = self.documents.instrument.resolve_type(&column.field_type)?;
        if !column_type.base.is_enumerated() {
            return Err(unsupported("REDCap matrix column must be an enumeration"));
        }

        let choices = if column_question.enumerations.is_empty() {
            column_type
                .enumerations
                .iter()
                .flat_map(|keys| keys.keys())
                .map(|key| format!("{key}, {key}"))
                .collect::<Vec<_>>()
                .join(" | ")
        } else {
            self.choices(&column_question.enumerations)
        };
        let (field_type, validation) =
            type_tuple(&column_type.base, column_question.widget_type());
        let mut section_header = self.section_header.clone();
        for row in &question.rows {
            let required = resolved
                .rows
                .iter()
                .find(|known| known.id == row.id)
                .map_or(column.required, |known| known.required);
            let cells = RowCells {
                variable: row.id.clone(),
                form: page_id.to_string(),
                section_header: std::mem::take(&mut section_header),
                field_type: field_type.to_string(),
                label: self.local(&row.text).to_string(),
                choices: choices.clone(),
                note: row
                    .help
                    .as_ref()
                    .map(|help| self.local(help).to_string())
                    .unwrap_or_default(),
                validation: validation.to_string(),
                identifier: column.identifiable,
                required,
                matrix_group: question.field_id.clone(),
                matrix_ranking: true,
                ..RowCells::default()
            };
            self.rows.push(cells.into_row());
        }
        Ok(())
    }

    fn calculation(&self, calculation: &Calculation) -> Result<Vec<String>, RowError> {
        let expression = if calculation.is_python() {
            expression_to_source(calculation.expression())?
        } else {
            calculation.expression().to_string()
        };
        Ok(RowCells {
            variable: calculation.id.clone(),
            form: CALCULATION_FORM.to_string(),
            field_type: "calc".to_string(),
            label: calculation.description.clone(),
            choices: expression,
            ..RowCells::default()
        }
        .into_row())
    }
}

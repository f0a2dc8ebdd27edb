//! Row by row assembly of pages, questions and matrices.
//!
//! Each row is first planned against the current context: the type is
//! mapped, expressions are transpiled and identifiers are checked. Only a
//! plan that succeeded is applied, so a failing row leaves no trace in the
//! documents (its section header included).

use tracing::{debug, info, info_span};

use rios_expr::{CalculationScope, calculation_to_target, trigger_to_target};
use rios_ingest::{CanonicalRecord, RecordSource, check_redcap_headers};
use rios_model::naming::{BRANCHING_LOGIC, canonical_identifier};
use rios_model::{
    Calculation, Column, Descriptor, Element, Event, Field, FieldType, LocalizedString, Page,
    Question, Row, TypeObject,
};
use rios_validate::Validator;

use crate::context::{AssemblerState, ConversionContext, MatrixState};
use crate::error::{Result, RowError};
use crate::log::ConversionLog;
use crate::mapper::{FIELD_TYPE, MappedField, map_record};
use crate::options::{ConversionStats, RiosDocuments, ToRiosOptions};

const VARIABLE_FIELD_NAME: &str = "variable_field_name";
const FORM_NAME: &str = "form_name";
const SECTION_HEADER: &str = "section_header";
const FIELD_LABEL: &str = "field_label";
const FIELD_NOTE: &str = "field_note";
const MATRIX_GROUP_NAME: &str = "matrix_group_name";
const REQUIRED_FIELD: &str = "required_field";
const IDENTIFIER: &str = "identifier";

/// Page a row is added to.
#[derive(Debug)]
enum PageTarget {
    Current(usize),
    /// A page seen earlier; switching back to it ends any live matrix.
    Existing(usize),
    New(String),
}

#[derive(Debug)]
enum RowAction {
    Field {
        field: Field,
        question: Question,
    },
    Text(LocalizedString),
    Calculation(Calculation),
    MatrixStart {
        group: String,
        row_id: String,
        field: Field,
        question: Question,
    },
    MatrixRow {
        row: Row,
        descriptor: Descriptor,
    },
}

#[derive(Debug)]
struct RowPlan {
    line: u64,
    field_id: String,
    page: PageTarget,
    header: Option<LocalizedString>,
    action: RowAction,
    /// Calculation scope after transpiling this row's expressions.
    scope: Option<CalculationScope>,
    /// Branching logic present on a row that cannot carry it.
    ignored_logic: bool,
}

/// Turns a REDCap row stream into RIOS documents.
#[derive(Debug)]
pub struct PageAssembler {
    context: ConversionContext,
}

impl PageAssembler {
    pub fn new(options: &ToRiosOptions) -> Self {
        Self {
            context: ConversionContext::new(options),
        }
    }

    pub fn context(&self) -> &ConversionContext {
        &self.context
    }

    /// Consumes `source` and returns the checked documents.
    pub fn run(
        &mut self,
        source: &mut dyn RecordSource,
        validator: &dyn Validator,
    ) -> Result<RiosDocuments> {
        check_redcap_headers(source.headers())?;
        info_span!("assemble").in_scope(|| -> Result<()> {
            for record in source {
                self.process(&record?)?;
            }
            Ok(())
        })?;
        self.collect_stats();
        let stats = self.context.stats;
        info!(
            rows = stats.rows,
            skipped = stats.skipped,
            fields = stats.fields,
            pages = stats.pages,
            calculations = stats.calculations,
            "rows assembled"
        );
        std::mem::take(&mut self.context.documents).finish(validator)
    }

    /// Adds one row. Row-level failures are logged and the row is dropped;
    /// only fatal errors are returned.
    pub fn process(&mut self, record: &CanonicalRecord) -> Result<()> {
        self.context.stats.rows += 1;
        match self.plan(record) {
            Ok(plan) => self.apply(plan),
            Err(err) => {
                self.context.stats.skipped += 1;
                self.context.log.row_warning(
                    record.line(),
                    record.trimmed(VARIABLE_FIELD_NAME),
                    format!("{err}. Row ignored"),
                );
                Ok(())
            }
        }
    }

    /// Counts and log gathered so far.
    pub fn into_report(self) -> (ConversionStats, ConversionLog) {
        (self.context.stats, self.context.log)
    }

    fn collect_stats(&mut self) {
        let documents = &self.context.documents;
        let stats = &mut self.context.stats;
        stats.fields = documents.instrument().record.len();
        stats.pages = documents
            .form()
            .pages
            .iter()
            .filter(|page| !page.elements.is_empty())
            .count();
        stats.questions = documents.form().questions().count();
        stats.calculations = documents.calculations().calculations.len();
    }

    fn text(&self, value: &str) -> LocalizedString {
        LocalizedString::new(&self.context.localization, value)
    }

    fn plan(&self, record: &CanonicalRecord) -> std::result::Result<RowPlan, RowError> {
        let field_id = canonical_identifier(record.get(VARIABLE_FIELD_NAME));
        if field_id.is_empty() {
            return Err(RowError::MissingFieldId);
        }
        let page = self.plan_page(record)?;
        let header = record
            .has(SECTION_HEADER)
            .then(|| self.text(record.trimmed(SECTION_HEADER)));
        let group = canonical_identifier(record.get(MATRIX_GROUP_NAME));
        let live_group = match page {
            PageTarget::Current(_) => self.context.state.matrix().map(|matrix| matrix.group.as_str()),
            PageTarget::Existing(_) | PageTarget::New(_) => None,
        };

        let mut plan = RowPlan {
            line: record.line(),
            field_id,
            page,
            header,
            action: RowAction::Text(LocalizedString::default()),
            scope: None,
            ignored_logic: false,
        };
        if group.is_empty() {
            self.plan_ordinary(record, &mut plan)?;
        } else if live_group == Some(group.as_str()) {
            self.plan_matrix_row(record, &group, &mut plan)?;
        } else {
            self.plan_matrix_start(record, group, &mut plan)?;
        }
        Ok(plan)
    }

    fn plan_page(&self, record: &CanonicalRecord) -> std::result::Result<PageTarget, RowError> {
        let current = self.context.state.page_index();
        let page_id = canonical_identifier(record.get(FORM_NAME));
        if page_id.is_empty() {
            return current.map(PageTarget::Current).ok_or(RowError::NoPage);
        }
        Ok(match self.context.pages.get(&page_id) {
            Some(&index) if current == Some(index) => PageTarget::Current(index),
            Some(&index) => PageTarget::Existing(index),
            None => PageTarget::New(page_id),
        })
    }

    fn check_unused(&self, id: &str) -> std::result::Result<(), RowError> {
        if self.context.is_identifier_used(id) {
            return Err(RowError::DuplicateId { id: id.to_string() });
        }
        Ok(())
    }

    fn plan_ordinary(
        &self,
        record: &CanonicalRecord,
        plan: &mut RowPlan,
    ) -> std::result::Result<(), RowError> {
        let label = record.trimmed(FIELD_LABEL);
        let has_logic = record.has(BRANCHING_LOGIC);
        plan.action = match map_record(record, &self.context.localization)? {
            MappedField::Field(mapping) => {
                self.check_unused(&plan.field_id)?;
                let field = Field::new(&plan.field_id, mapping.field_type)
                    .with_description(label)
                    .with_required(record.has(REQUIRED_FIELD))
                    .with_identifiable(record.has(IDENTIFIER));
                let mut question = Question::new(&plan.field_id, self.text(label))
                    .with_help(self.text(record.trimmed(FIELD_NOTE)))
                    .with_widget(mapping.widget)
                    .with_enumerations(mapping.enumerations);
                if has_logic {
                    let mut scope = self.context.scope.clone();
                    let trigger = trigger_to_target(record.trimmed(BRANCHING_LOGIC), &mut scope)?;
                    question.add_event(Event::disable(trigger));
                    plan.scope = Some(scope);
                }
                RowAction::Field { field, question }
            }
            MappedField::Calculation { formula } => {
                // A repeated calculation id is fatal and reported on apply.
                if !self.context.documents.has_calculation(&plan.field_id) {
                    self.check_unused(&plan.field_id)?;
                }
                if formula.is_empty() {
                    return Err(RowError::EmptyCalculation);
                }
                let mut scope = self.context.scope.clone();
                let expression = calculation_to_target(&formula, &mut scope)?;
                plan.scope = Some(scope);
                plan.ignored_logic = has_logic;
                RowAction::Calculation(Calculation::python(&plan.field_id, label, expression))
            }
            MappedField::Descriptive => {
                plan.ignored_logic = has_logic;
                RowAction::Text(self.text(label))
            }
        };
        Ok(())
    }

    fn plan_matrix_start(
        &self,
        record: &CanonicalRecord,
        group: String,
        plan: &mut RowPlan,
    ) -> std::result::Result<(), RowError> {
        let live_elsewhere = self
            .context
            .state
            .matrix()
            .is_some_and(|matrix| matrix.group == group);
        if live_elsewhere || self.context.finished_groups.contains(&group) {
            return Err(RowError::MatrixResumed { group });
        }
        self.check_unused(&group)?;
        self.check_unused(&plan.field_id)?;
        if group == plan.field_id {
            return Err(RowError::DuplicateId { id: group });
        }
        let mapping = match map_record(record, &self.context.localization)? {
            MappedField::Field(mapping) => mapping,
            MappedField::Calculation { .. } => {
                return Err(RowError::MatrixCalculation { group });
            }
            MappedField::Descriptive => {
                return Err(RowError::UnsupportedMatrix {
                    field_id: plan.field_id.clone(),
                    reason: "Descriptive rows cannot form a matrix".to_string(),
                });
            }
        };

        let tag = record.trimmed(FIELD_TYPE).to_ascii_lowercase();
        let label = record.trimmed(FIELD_LABEL);
        let required = record.has(REQUIRED_FIELD);
        let mut matrix = TypeObject::matrix();
        matrix.add_column(Column {
            id: tag.clone(),
            description: tag.clone(),
            field_type: mapping.field_type,
            required,
            identifiable: record.has(IDENTIFIER),
        });
        matrix.add_row(Row {
            id: plan.field_id.clone(),
            description: label.to_string(),
            required,
        });
        let field =
            Field::new(&group, matrix).with_description(record.trimmed(SECTION_HEADER));

        let mut question = Question::new(&group, self.text(label))
            .with_help(self.text(record.trimmed(FIELD_NOTE)));
        question.add_question(
            Question::new(tag, self.text(label))
                .with_widget(mapping.widget)
                .with_enumerations(mapping.enumerations),
        );
        question.add_row(Descriptor::new(&plan.field_id, self.text(label)));

        plan.ignored_logic = record.has(BRANCHING_LOGIC);
        plan.action = RowAction::MatrixStart {
            group,
            row_id: plan.field_id.clone(),
            field,
            question,
        };
        Ok(())
    }

    fn plan_matrix_row(
        &self,
        record: &CanonicalRecord,
        group: &str,
        plan: &mut RowPlan,
    ) -> std::result::Result<(), RowError> {
        if record.trimmed(FIELD_TYPE).eq_ignore_ascii_case("calc") {
            return Err(RowError::MatrixCalculation {
                group: group.to_string(),
            });
        }
        self.check_unused(&plan.field_id)?;
        let label = record.trimmed(FIELD_LABEL);
        plan.ignored_logic = record.has(BRANCHING_LOGIC);
        plan.action = RowAction::MatrixRow {
            row: Row {
                id: plan.field_id.clone(),
                description: label.to_string(),
                required: record.has(REQUIRED_FIELD),
            },
            descriptor: Descriptor::new(&plan.field_id, self.text(label)),
        };
        Ok(())
    }

    fn apply(&mut self, plan: RowPlan) -> Result<()> {
        let context = &mut self.context;
        let page_index = match plan.page {
            PageTarget::Current(index) => index,
            PageTarget::Existing(index) => {
                context.flush_matrix();
                context.state = AssemblerState::InPage { page_index: index };
                index
            }
            PageTarget::New(id) => {
                context.flush_matrix();
                let index = context.documents.add_page(Page::new(&id));
                context.pages.insert(id, index);
                context.state = AssemblerState::InPage { page_index: index };
                index
            }
        };
        if !matches!(plan.action, RowAction::MatrixRow { .. }) {
            context.flush_matrix();
        }
        if let Some(scope) = plan.scope {
            context.scope = scope;
        }
        if let Some(header) = plan.header {
            push_element(context, page_index, Element::header(header));
        }

        match plan.action {
            RowAction::Field { field, question } => {
                context.identifiers.insert(field.id.clone());
                context.documents.add_field(field);
                push_element(context, page_index, Element::question(question));
            }
            RowAction::Text(text) => {
                push_element(context, page_index, Element::text(text));
            }
            RowAction::Calculation(calculation) => {
                let id = calculation.id.clone();
                context.documents.add_calculation(calculation)?;
                context.scope.register(id.clone());
                context.identifiers.insert(id);
            }
            RowAction::MatrixStart {
                group,
                row_id,
                field,
                question,
            } => {
                debug!(line = plan.line, group = %group, "matrix started");
                context.identifiers.insert(group.clone());
                context.identifiers.insert(row_id);
                let field_index = context.documents.add_field(field);
                let element_index =
                    push_element(context, page_index, Element::question(question));
                context.state = AssemblerState::InMatrix(MatrixState {
                    group,
                    field_index,
                    page_index,
                    element_index,
                });
            }
            RowAction::MatrixRow { row, descriptor } => {
                let Some(matrix) = context.state.matrix().cloned() else {
                    return Ok(());
                };
                context.identifiers.insert(row.id.clone());
                if let Some(field) = context.documents.field_mut(matrix.field_index)
                    && let FieldType::Inline(object) = &mut field.field_type
                {
                    object.add_row(row);
                }
                if let Some(question) = context
                    .documents
                    .page_mut(matrix.page_index)
                    .and_then(|page| page.elements.get_mut(matrix.element_index))
                    .and_then(Element::as_question_mut)
                {
                    question.add_row(descriptor);
                }
            }
        }

        if plan.ignored_logic {
            context.log.row_warning(
                plan.line,
                &plan.field_id,
                "branching logic is only supported on ordinary questions and was ignored",
            );
        }
        Ok(())
    }
}

/// Appends `element` to a page and returns its index on the page.
fn push_element(context: &mut ConversionContext, page_index: usize, element: Element) -> usize {
    context
        .documents
        .page_mut(page_index)
        .map(|page| {
            page.add_element(element);
            page.elements.len() - 1
        })
        .unwrap_or_default()
}

//! Accumulation and checking of the three RIOS documents.

use tracing::{debug, info};

use rios_model::{
    Calculation, CalculationSet, Field, Form, Instrument, LocalizedString, Page,
};
use rios_validate::{DocumentKind, Validator};

use crate::error::{ConversionError, Result};
use crate::options::{RiosDocuments, ToRiosOptions};

/// In-progress Instrument, Form and CalculationSet.
///
/// Form and CalculationSet are created from the Instrument's reference and
/// keep it for the whole run.
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    instrument: Instrument,
    form: Form,
    calculations: CalculationSet,
}

impl DocumentAssembler {
    pub fn new(options: &ToRiosOptions) -> Self {
        let instrument = Instrument::new(&options.id, &options.instrument_version, &options.title)
            .with_description(&options.description);
        let form = Form::new(instrument.reference(), &options.localization)
            .with_title(LocalizedString::new(&options.localization, &options.title));
        let calculations = CalculationSet::new(instrument.reference());
        Self {
            instrument,
            form,
            calculations,
        }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn calculations(&self) -> &CalculationSet {
        &self.calculations
    }

    /// Appends `field` to the record and returns its index.
    pub fn add_field(&mut self, field: Field) -> usize {
        debug!(field_id = %field.id, "add field");
        self.instrument.add_field(field);
        self.instrument.record.len() - 1
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut Field> {
        self.instrument.record.get_mut(index)
    }

    /// Appends `page` to the form and returns its index.
    pub fn add_page(&mut self, page: Page) -> usize {
        debug!(page_id = %page.id, "add page");
        self.form.add_page(page);
        self.form.pages.len() - 1
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.form.pages.get_mut(index)
    }

    /// Appends a calculation. Calculation ids must be unique.
    pub fn add_calculation(&mut self, calculation: Calculation) -> Result<()> {
        if self.calculations.contains(&calculation.id) {
            return Err(ConversionError::DuplicateCalculation { id: calculation.id });
        }
        debug!(calculation = %calculation.id, "add calculation");
        self.calculations.add(calculation);
        Ok(())
    }

    pub fn has_calculation(&self, id: &str) -> bool {
        self.calculations.contains(id)
    }

    /// Checks the documents and hands them out.
    ///
    /// An empty CalculationSet is dropped, as are pages that only ever held
    /// calculation rows.
    pub fn finish(mut self, validator: &dyn Validator) -> Result<RiosDocuments> {
        let pages = self.form.pages.len();
        self.form.pages.retain(|page| !page.elements.is_empty());
        if self.form.pages.len() < pages {
            debug!(dropped = pages - self.form.pages.len(), "dropped empty pages");
        }
        let calculations = (!self.calculations.is_empty()).then_some(self.calculations);
        let documents =
            RiosDocuments::new(self.instrument, self.form).with_calculations(calculations);
        check_documents(&documents, validator)?;
        info!(
            fields = documents.instrument.record.len(),
            pages = documents.form.pages.len(),
            calculations = documents
                .calculations
                .as_ref()
                .map_or(0, |set| set.calculations.len()),
            "documents assembled"
        );
        Ok(documents)
    }
}

/// Fails unless Form and CalculationSet reference the Instrument.
pub fn check_relationships(documents: &RiosDocuments) -> Result<()> {
    let expected = documents.instrument.reference();
    if documents.form.instrument != expected {
        return Err(ConversionError::Relationship {
            document: DocumentKind::Form,
            expected,
            found: documents.form.instrument.clone(),
        });
    }
    if let Some(calculations) = &documents.calculations
        && calculations.instrument != expected
    {
        return Err(ConversionError::Relationship {
            document: DocumentKind::CalculationSet,
            expected,
            found: calculations.instrument.clone(),
        });
    }
    Ok(())
}

/// Relationship check followed by validation of every document.
pub fn check_documents(documents: &RiosDocuments, validator: &dyn Validator) -> Result<()> {
    check_relationships(documents)?;
    let instrument = &documents.instrument;
    validator
        .validate_instrument(instrument)
        .map_err(ConversionError::validation)?;
    validator
        .validate_form(&documents.form, instrument)
        .map_err(ConversionError::validation)?;
    if let Some(calculations) = documents
        .calculations
        .as_ref()
        .filter(|set| !set.is_empty())
    {
        validator
            .validate_calculation_set(calculations, instrument)
            .map_err(ConversionError::validation)?;
    }
    Ok(())
}

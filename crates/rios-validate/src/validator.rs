use rios_model::{CalculationSet, Form, Instrument};

use crate::error::ValidationError;

/// Checks documents before they are emitted or converted.
///
/// Forms and calculation sets are validated against the instrument they
/// reference.
pub trait Validator {
    fn validate_instrument(&self, instrument: &Instrument) -> Result<(), ValidationError>;

    fn validate_form(&self, form: &Form, instrument: &Instrument) -> Result<(), ValidationError>;

    fn validate_calculation_set(
        &self,
        calculations: &CalculationSet,
        instrument: &Instrument,
    ) -> Result<(), ValidationError>;
}

use serde::{Deserialize, Serialize};

use crate::instrument::InstrumentReference;

/// Method name of expressions produced by the transpiler.
pub const PYTHON_METHOD: &str = "python";

/// RIOS CalculationSet definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationSet {
    pub instrument: InstrumentReference,
    #[serde(default)]
    pub calculations: Vec<Calculation>,
}

impl CalculationSet {
    pub fn new(instrument: InstrumentReference) -> Self {
        Self {
            instrument,
            calculations: Vec::new(),
        }
    }

    pub fn add(&mut self, calculation: Calculation) {
        self.calculations.push(calculation);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.calculations.iter().any(|calc| calc.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.calculations.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOptions {
    pub expression: String,
}

/// A derived value computed from an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub method: String,
    pub options: CalculationOptions,
}

impl Calculation {
    /// Float-valued python calculation.
    pub fn python(
        id: impl Into<String>,
        description: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            value_type: "float".to_string(),
            method: PYTHON_METHOD.to_string(),
            options: CalculationOptions {
                expression: expression.into(),
            },
        }
    }

    pub fn expression(&self) -> &str {
        &self.options.expression
    }

    pub fn is_python(&self) -> bool {
        self.method == PYTHON_METHOD
    }
}

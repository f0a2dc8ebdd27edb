//! Conversion requests and responses.

use serde::{Deserialize, Serialize};

use rios_model::{
    CalculationSet, DEFAULT_LOCALIZATION, DEFAULT_VERSION, Form, Instrument,
};

use crate::log::ConversionLog;

/// Options for REDCap to RIOS conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToRiosOptions {
    /// Instrument id, usually a `urn:` name.
    pub id: String,
    pub title: String,
    pub description: String,
    /// RFC 5646 tag used for every localized string.
    pub localization: String,
    pub instrument_version: String,
    /// Report fatal errors in [`ToRiosResponse::failure`] instead of
    /// returning them.
    pub suppress: bool,
}

impl Default for ToRiosOptions {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            localization: DEFAULT_LOCALIZATION.to_string(),
            instrument_version: DEFAULT_VERSION.to_string(),
            suppress: false,
        }
    }
}

impl ToRiosOptions {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the localization; `None` keeps the default.
    #[must_use]
    pub fn with_localization(mut self, localization: Option<String>) -> Self {
        if let Some(localization) = localization {
            self.localization = localization;
        }
        self
    }

    /// Sets the instrument version; `None` keeps the default.
    #[must_use]
    pub fn with_instrument_version(mut self, version: Option<String>) -> Self {
        if let Some(version) = version {
            self.instrument_version = version;
        }
        self
    }

    #[must_use]
    pub fn with_suppress(mut self, suppress: bool) -> Self {
        self.suppress = suppress;
        self
    }
}

/// Options for RIOS to REDCap conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromRiosOptions {
    /// Locale whose text is written to the CSV.
    pub localization: String,
    pub suppress: bool,
}

impl Default for FromRiosOptions {
    fn default() -> Self {
        Self {
            localization: DEFAULT_LOCALIZATION.to_string(),
            suppress: false,
        }
    }
}

impl FromRiosOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_localization(mut self, localization: Option<String>) -> Self {
        if let Some(localization) = localization {
            self.localization = localization;
        }
        self
    }

    #[must_use]
    pub fn with_suppress(mut self, suppress: bool) -> Self {
        self.suppress = suppress;
        self
    }
}

/// The three RIOS documents that travel together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiosDocuments {
    pub instrument: Instrument,
    pub form: Form,
    #[serde(
        default,
        rename = "calculationset",
        skip_serializing_if = "Option::is_none"
    )]
    pub calculations: Option<CalculationSet>,
}

impl RiosDocuments {
    pub fn new(instrument: Instrument, form: Form) -> Self {
        Self {
            instrument,
            form,
            calculations: None,
        }
    }

    #[must_use]
    pub fn with_calculations(mut self, calculations: Option<CalculationSet>) -> Self {
        self.calculations = calculations;
        self
    }
}

/// Counts reported after a REDCap to RIOS conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Data rows read.
    pub rows: usize,
    /// Rows discarded by row-level errors.
    pub skipped: usize,
    pub fields: usize,
    pub pages: usize,
    pub questions: usize,
    pub calculations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToRiosResponse {
    /// `None` when a suppressed fatal error stopped the conversion.
    pub documents: Option<RiosDocuments>,
    pub stats: ConversionStats,
    pub logs: ConversionLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ToRiosResponse {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FromRiosResponse {
    /// Rows written, header row first. Empty on failure.
    pub rows: Vec<Vec<String>>,
    pub logs: ConversionLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl FromRiosResponse {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        let options = ToRiosOptions::new("urn:demo", "Demo")
            .with_localization(None)
            .with_instrument_version(Some("2.0".to_string()));
        assert_eq!(options.localization, "en");
        assert_eq!(options.instrument_version, "2.0");
        assert!(!options.suppress);
        assert_eq!(FromRiosOptions::new().localization, "en");
    }

    #[test]
    fn test_documents_serialize_calculationset_key() {
        let instrument = Instrument::new("urn:demo", "1.0", "Demo");
        let form = Form::new(instrument.reference(), "en");
        let calculations = CalculationSet::new(instrument.reference());
        let documents = RiosDocuments::new(instrument, form);
        let value = serde_json::to_value(&documents).unwrap();
        assert!(value.get("calculationset").is_none());

        let value = serde_json::to_value(documents.with_calculations(Some(calculations))).unwrap();
        assert_eq!(value["calculationset"]["instrument"]["id"], "urn:demo");
    }
}

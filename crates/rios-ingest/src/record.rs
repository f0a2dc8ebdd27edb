use rios_model::naming::canonical_name;

use crate::error::Result;

/// One data row keyed by canonical header names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRecord {
    line: u64,
    cells: Vec<(String, String)>,
}

impl CanonicalRecord {
    /// Creates a record from already canonical `(header, value)` pairs.
    pub fn new(line: u64, cells: Vec<(String, String)>) -> Self {
        Self { line, cells }
    }

    /// Creates a record from raw header names, canonicalizing each one.
    pub fn from_raw<'a>(line: u64, cells: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            line,
            cells: cells
                .into_iter()
                .map(|(name, value)| (canonical_name(name), value.to_string()))
                .collect(),
        }
    }

    /// 1-based physical line number of the row in its source.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Raw cell for `name`; absent columns read as "".
    pub fn get(&self, name: &str) -> &str {
        self.cells
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Trimmed cell for `name`.
    pub fn trimmed(&self, name: &str) -> &str {
        self.get(name).trim()
    }

    /// Returns true if the cell for `name` holds any non-blank text.
    pub fn has(&self, name: &str) -> bool {
        !self.trimmed(name).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.trim().is_empty())
    }
}

/// A stream of canonical records.
///
/// [`crate::RecordReader`] implements this for CSV input; other ingesters
/// plug in by implementing it too.
pub trait RecordSource: Iterator<Item = Result<CanonicalRecord>> {
    /// Canonical header names in source order.
    fn headers(&self) -> &[String];
}

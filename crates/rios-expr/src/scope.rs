use std::collections::BTreeSet;

use tracing::debug;

/// Scope of directly collected field values.
pub const ASSESSMENT_SCOPE: &str = "assessment";
/// Scope of previously computed calculation values.
pub const CALCULATION_SCOPE: &str = "calculations";

/// Calculation names registered so far in row order.
///
/// Also remembers which bare references resolved to the assessment scope,
/// so a calculation defined after being referenced can be reported.
#[derive(Debug, Clone, Default)]
pub struct CalculationScope {
    calculations: BTreeSet<String>,
    field_references: BTreeSet<String>,
}

impl CalculationScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a calculation output. Returns false if it was already
    /// registered.
    pub fn register(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.field_references.contains(&name) {
            debug!(
                calculation = %name,
                "calculation referenced before its definition; earlier references resolved to {ASSESSMENT_SCOPE}"
            );
        }
        self.calculations.insert(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.calculations.contains(name)
    }

    /// Returns true if `name` was resolved as a field reference earlier.
    pub fn referenced_as_field(&self, name: &str) -> bool {
        self.field_references.contains(name)
    }

    pub fn len(&self) -> usize {
        self.calculations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculations.is_empty()
    }

    /// Scope a bare reference to `name` resolves to.
    pub(crate) fn resolve(&mut self, name: &str) -> &'static str {
        if self.contains(name) {
            CALCULATION_SCOPE
        } else {
            self.field_references.insert(name.to_string());
            ASSESSMENT_SCOPE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_follows_registration_order() {
        let mut scope = CalculationScope::new();
        assert_eq!(scope.resolve("total"), ASSESSMENT_SCOPE);
        assert!(scope.register("total"));
        assert!(!scope.register("total"));
        assert_eq!(scope.resolve("total"), CALCULATION_SCOPE);
        assert!(scope.referenced_as_field("total"));
        assert_eq!(scope.len(), 1);
    }
}

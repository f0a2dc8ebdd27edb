use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Localization used when the caller does not supply one (RFC 5646 tag).
pub const DEFAULT_LOCALIZATION: &str = "en";

/// A string with one translation per locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedString(pub BTreeMap<String, String>);

impl LocalizedString {
    /// Creates a localized string with a single translation.
    pub fn new(locale: impl Into<String>, text: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(locale.into(), text.into());
        Self(map)
    }

    /// Flattens the localized string to plain text for `locale`.
    ///
    /// Returns an empty string when no translation exists.
    pub fn get_local_text(&self, locale: &str) -> &str {
        self.0.get(locale).map(String::as_str).unwrap_or("")
    }

    /// Returns true if a translation exists for `locale`.
    pub fn has_locale(&self, locale: &str) -> bool {
        self.0.contains_key(locale)
    }

    /// Returns true if every translation is blank.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|text| text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_local_text() {
        let text = LocalizedString::new("en", "Age");
        assert_eq!(text.get_local_text("en"), "Age");
        assert_eq!(text.get_local_text("fr"), "");
        assert!(text.has_locale("en"));
    }

    #[test]
    fn test_blank() {
        assert!(LocalizedString::default().is_blank());
        assert!(LocalizedString::new("en", "  ").is_blank());
        assert!(!LocalizedString::new("en", "x").is_blank());
    }
}

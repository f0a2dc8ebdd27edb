//! Name canonicalization for headers, identifiers, and enumeration keys.
//!
//! REDCap exports use several spellings for the same column ("Choices,
//! Calculations, OR Slider Labels", "Choices OR Calculations", ...). Every
//! header is folded to one canonical name so later stages can look columns
//! up by a fixed key. The same collapsing rules produce RIOS identifiers from
//! free-text cell values.
//!
//! All functions are pure and idempotent.

/// Canonical name of the choices / calculation column.
pub const CHOICES: &str = "choices_or_calculations";
/// Canonical name of the branching logic column.
pub const BRANCHING_LOGIC: &str = "branching_logic_show_field_only_if";
/// Canonical name of the text validation type column.
pub const TEXT_VALIDATION_TYPE: &str = "text_validation_type_or_show_slider_number";

/// Prefix added to names that would otherwise start with a digit.
pub const DIGIT_PREFIX: &str = "v_";

/// Header prefixes folded onto a single canonical column name.
const HEADER_SYNONYMS: &[(&str, &str)] = &[
    ("choices", CHOICES),
    ("branching_logic", BRANCHING_LOGIC),
    ("text_validation_type", TEXT_VALIDATION_TYPE),
];

/// Canonical form of a column header.
///
/// Lowercases, collapses runs of non-alphanumeric characters to `_`, strips
/// outer underscores, folds known header synonyms, and prefixes names that
/// start with a digit.
pub fn canonical_name(raw: &str) -> String {
    let collapsed = collapse(raw);
    let folded = HEADER_SYNONYMS
        .iter()
        .find(|(prefix, _)| collapsed.starts_with(prefix))
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(collapsed);
    prefix_digit(folded)
}

/// Canonical form of an identifier-bearing cell (field ids, page ids,
/// matrix group names, expression references).
pub fn canonical_identifier(raw: &str) -> String {
    prefix_digit(collapse(raw))
}

/// Canonical form of an enumeration key. Keys may start with a digit.
pub fn canonical_enumeration_key(raw: &str) -> String {
    collapse(raw)
}

/// Returns true when `value` is a valid RIOS identifier
/// (`^[a-z](?:[a-z0-9]|_(?!_))*[a-z0-9]$`).
pub fn is_identifier(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 2 {
        return false;
    }
    if !bytes[0].is_ascii_lowercase() {
        return false;
    }
    let last = bytes[bytes.len() - 1];
    if !(last.is_ascii_lowercase() || last.is_ascii_digit()) {
        return false;
    }
    bytes.windows(2).all(|pair| !(pair[0] == b'_' && pair[1] == b'_'))
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'_')
}

/// Returns true when `value` is a valid RIOS enumeration key.
pub fn is_enumeration_key(value: &str) -> bool {
    let bytes = value.as_bytes();
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    match bytes.len() {
        0 => false,
        1 | 2 => bytes.iter().all(alnum),
        len => {
            alnum(&bytes[0])
                && alnum(&bytes[len - 1])
                && bytes
                    .iter()
                    .all(|b| alnum(b) || *b == b'_' || *b == b'-')
                && bytes.windows(2).all(|pair| {
                    let sep = |b: u8| b == b'_' || b == b'-';
                    !(sep(pair[0]) && sep(pair[1]))
                })
        }
    }
}

/// Lowercase, collapse non-alphanumeric runs to one `_`, strip outer `_`.
fn collapse(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }
    out
}

fn prefix_digit(name: String) -> String {
    if name.starts_with(|ch: char| ch.is_ascii_digit()) {
        format!("{DIGIT_PREFIX}{name}")
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redcap_headers() {
        assert_eq!(canonical_name("Variable / Field Name"), "variable_field_name");
        assert_eq!(canonical_name("Form Name"), "form_name");
        assert_eq!(canonical_name("Identifier?"), "identifier");
        assert_eq!(canonical_name("Required Field?"), "required_field");
        assert_eq!(canonical_name("Text Validation Min"), "text_validation_min");
        assert_eq!(
            canonical_name("Question Number (surveys only)"),
            "question_number_surveys_only"
        );
    }

    #[test]
    fn test_header_synonyms() {
        assert_eq!(canonical_name("Choices, Calculations, OR Slider Labels"), CHOICES);
        assert_eq!(canonical_name("Choices OR Calculations"), CHOICES);
        assert_eq!(
            canonical_name("Branching Logic (Show field only if...)"),
            BRANCHING_LOGIC
        );
        assert_eq!(canonical_name("Branching logic"), BRANCHING_LOGIC);
        assert_eq!(
            canonical_name("Text Validation Type OR Show Slider Number"),
            TEXT_VALIDATION_TYPE
        );
    }

    #[test]
    fn test_collapse_and_strip() {
        assert_eq!(canonical_identifier("  __Hello,   World!__ "), "hello_world");
        assert_eq!(canonical_identifier("a__b"), "a_b");
        assert_eq!(canonical_identifier("***"), "");
    }

    #[test]
    fn test_digit_prefix() {
        assert_eq!(canonical_identifier("1st visit"), "v_1st_visit");
        assert_eq!(canonical_enumeration_key("1"), "1");
        assert_eq!(canonical_name("2 Choices"), "v_2_choices");
    }

    #[test]
    fn test_identifier_shape() {
        assert!(is_identifier("age"));
        assert!(is_identifier("a1"));
        assert!(!is_identifier("a"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("a__b"));
        assert!(!is_identifier("ab_"));
    }

    #[test]
    fn test_enumeration_key_shape() {
        assert!(is_enumeration_key("1"));
        assert!(is_enumeration_key("yes"));
        assert!(is_enumeration_key("a-b"));
        assert!(!is_enumeration_key(""));
        assert!(!is_enumeration_key("a--b"));
        assert!(!is_enumeration_key("-ab"));
    }
}

//! Function name table.

/// `(REDCap name, RIOS python name)` pairs.
pub const FUNCTIONS: &[(&str, &str)] = &[
    ("min", "min"),
    ("max", "max"),
    ("mean", "rios.conversion.redcap.math.mean"),
    ("median", "rios.conversion.redcap.math.median"),
    ("sum", "rios.conversion.redcap.math.sum_"),
    ("stdev", "rios.conversion.redcap.math.stdev"),
    ("round", "rios.conversion.redcap.math.round_"),
    ("roundup", "rios.conversion.redcap.math.roundup"),
    ("rounddown", "rios.conversion.redcap.math.rounddown"),
    ("sqrt", "math.sqrt"),
    ("abs", "abs"),
    ("datediff", "rios.conversion.redcap.date.datediff"),
];

/// Python function emitted for exponentiation.
pub(crate) const POW_FUNCTION: &str = "math.pow";

/// Boolean keywords that may be followed by a parenthesis.
pub(crate) const KEYWORDS: &[&str] = &["and", "or", "not"];

/// RIOS python name for a REDCap function.
pub fn target_function(source: &str) -> Option<&'static str> {
    FUNCTIONS
        .iter()
        .find(|(name, _)| *name == source)
        .map(|(_, target)| *target)
}

/// REDCap name for a RIOS python function.
pub fn source_function(target: &str) -> Option<&'static str> {
    FUNCTIONS
        .iter()
        .find(|(_, name)| *name == target)
        .map(|(source, _)| *source)
}

/// Alternation of `names`, longest first, for use inside a regex group.
pub(crate) fn alternation<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut names: Vec<&str> = names.collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    names
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_directions() {
        assert_eq!(target_function("sum"), Some("rios.conversion.redcap.math.sum_"));
        assert_eq!(target_function("abs"), Some("abs"));
        assert_eq!(target_function("if"), None);
        assert_eq!(source_function("math.sqrt"), Some("sqrt"));
        assert_eq!(source_function("rios.conversion.redcap.math.round_"), Some("round"));
    }

    #[test]
    fn test_alternation_longest_first() {
        let pattern = alternation(["round", "rounddown", "a.b"].into_iter());
        assert_eq!(pattern, r"rounddown|round|a\.b");
    }
}

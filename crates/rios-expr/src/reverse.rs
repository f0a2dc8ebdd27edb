//! RIOS python expression to REDCap formula.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::forward::TARGET_REFERENCE;
use crate::functions::{FUNCTIONS, alternation, source_function};
use crate::lexical::{
    literal_mask, matching_close, replace_outside_literals, reverse_operators,
};
use crate::power::rewrite_power_calls;
use crate::scope::{ASSESSMENT_SCOPE, CALCULATION_SCOPE};

static TARGET_CALL: LazyLock<Regex> = LazyLock::new(|| {
    let names = alternation(FUNCTIONS.iter().map(|(_, target)| *target));
    Regex::new(&format!(r"\b({names})\s*\(")).expect("Invalid function call regex")
});

/// Rewrites a RIOS python expression into a REDCap formula.
pub fn expression_to_source(expression: &str) -> Result<String> {
    let rewritten = reverse_operators(expression);
    let rewritten = rewrite_power_calls(&rewritten)?;
    let rewritten = replace_outside_literals(&TARGET_CALL, &rewritten, |caps| {
        match source_function(&caps[1]) {
            Some(source) => format!("{source}("),
            None => caps[0].to_string(),
        }
    });
    let rewritten = replace_outside_literals(&TARGET_REFERENCE, &rewritten, |caps| {
        let table = &caps[1];
        let field = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map_or("", |field| field.as_str());
        if table == ASSESSMENT_SCOPE || table == CALCULATION_SCOPE {
            format!("[{field}]")
        } else {
            format!("[{table}][{field}]")
        }
    });
    Ok(rewritten)
}

/// Rewrites a RIOS trigger into REDCap branching logic.
///
/// One negation spanning the whole trigger is removed before rewriting.
pub fn trigger_to_source(trigger: &str) -> Result<String> {
    let trimmed = trigger.trim();
    if let Some(rest) = trimmed.strip_prefix('!') {
        let mask = literal_mask(rest);
        if rest.starts_with('(') && matching_close(rest, &mask, 0) == Some(rest.len() - 1) {
            return expression_to_source(rest[1..rest.len() - 1].trim());
        }
    }
    expression_to_source(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references() {
        assert_eq!(
            expression_to_source("calculations[\"c\"] + assessment['a'] * t[\"f\"]").unwrap(),
            "[c] + [a] * [t][f]"
        );
    }

    #[test]
    fn test_functions_and_power() {
        assert_eq!(
            expression_to_source("rios.conversion.redcap.math.round_(math.pow(assessment[\"a\"], 2), 1)")
                .unwrap(),
            "round(([a])^(2), 1)"
        );
        assert_eq!(
            expression_to_source("math.sqrt(abs(assessment[\"a\"]))").unwrap(),
            "sqrt(abs([a]))"
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            expression_to_source("assessment[\"a\"] != 1 and assessment[\"b\"] == 2").unwrap(),
            "[a] <> 1 and [b] = 2"
        );
    }

    #[test]
    fn test_literals_are_kept() {
        assert_eq!(
            expression_to_source("assessment[\"a\"] == 'x[\"y\"] math.sqrt('").unwrap(),
            "[a] = 'x[\"y\"] math.sqrt('"
        );
    }

    #[test]
    fn test_trigger_negation_removed() {
        assert_eq!(
            trigger_to_source("!(assessment[\"a\"] == 1)").unwrap(),
            "[a] = 1"
        );
        assert_eq!(
            trigger_to_source("!(assessment[\"a\"]) or !(assessment[\"b\"])").unwrap(),
            "!([a]) or !([b])"
        );
        assert_eq!(trigger_to_source("").unwrap(), "");
    }
}

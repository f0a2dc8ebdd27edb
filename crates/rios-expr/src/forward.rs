//! REDCap formula to RIOS python expression.

use std::sync::LazyLock;

use regex::Regex;

use rios_model::naming::canonical_identifier;

use crate::error::{ExpressionError, Result};
use crate::functions::{FUNCTIONS, KEYWORDS, POW_FUNCTION, alternation, target_function};
use crate::lexical::{
    forward_operators, is_name_byte, literal_mask, mask_literals, replace_outside_literals,
};
use crate::power::rewrite_exponentiation;
use crate::scope::CalculationScope;

/// `[table][field]`
static TABLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*([A-Za-z0-9_]+)\s*\]\[\s*([A-Za-z0-9_]+)\s*\]")
        .expect("Invalid table reference regex")
});

/// `[name]`
static BARE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*([A-Za-z0-9_]+)\s*\]").expect("Invalid bare reference regex")
});

/// `name(` for every REDCap function, matched at a word boundary.
static SOURCE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    let names = alternation(FUNCTIONS.iter().map(|(source, _)| *source));
    Regex::new(&format!(r"\b({names})\s*\(")).expect("Invalid function call regex")
});

/// `scope["field"]` or `scope['field']` in rewritten output.
pub(crate) static TARGET_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b([A-Za-z_][A-Za-z0-9_]*)\[\s*(?:"([^"]*)"|'([^']*)')\s*\]"#)
        .expect("Invalid target reference regex")
});

/// Any `name(` in rewritten output.
static ANY_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_.]*)\s*\(").expect("Invalid call regex")
});

/// Rewrites a REDCap calculation into a RIOS python expression.
///
/// Bare references to names registered in `scope` become
/// `calculations["name"]`; all others become `assessment["name"]` and are
/// remembered by the scope.
pub fn calculation_to_target(expression: &str, scope: &mut CalculationScope) -> Result<String> {
    let rewritten = rewrite_references(expression, scope);
    let rewritten = replace_outside_literals(&SOURCE_CALL, &rewritten, |caps| {
        match target_function(&caps[1]) {
            Some(target) => format!("{target}("),
            None => caps[0].to_string(),
        }
    });
    let rewritten = rewrite_exponentiation(&rewritten).map_err(|err| {
        ExpressionError::value(err.fragment(), expression, "unbalanced parentheses")
    })?;
    let rewritten = forward_operators(&rewritten);
    check_target(expression, &rewritten)?;
    Ok(rewritten)
}

/// Rewrites REDCap branching logic into a RIOS trigger.
///
/// "Show field only if" is the inverse of "disable if", so the rewritten
/// expression is negated.
pub fn trigger_to_target(expression: &str, scope: &mut CalculationScope) -> Result<String> {
    Ok(format!("!({})", calculation_to_target(expression, scope)?))
}

fn rewrite_references(expression: &str, scope: &mut CalculationScope) -> String {
    let tables = replace_outside_literals(&TABLE_REFERENCE, expression, |caps| {
        format!(
            "{}[\"{}\"]",
            canonical_identifier(&caps[1]),
            canonical_identifier(&caps[2])
        )
    });
    replace_outside_literals(&BARE_REFERENCE, &tables, |caps| {
        let name = canonical_identifier(&caps[1]);
        format!("{}[\"{name}\"]", scope.resolve(&name))
    })
}

/// Rejects leftover bracket syntax, juxtaposed references and calls to
/// unknown functions.
fn check_target(expression: &str, rewritten: &str) -> Result<()> {
    let mask = literal_mask(rewritten);
    for found in TARGET_REFERENCE.find_iter(rewritten) {
        if mask[found.start()] {
            continue;
        }
        let rest = &rewritten[found.end()..];
        if rest
            .bytes()
            .next()
            .is_some_and(|next| is_name_byte(next) || next == b'[')
        {
            let end = rest
                .find(char::is_whitespace)
                .map_or(rewritten.len(), |offset| found.end() + offset);
            return Err(ExpressionError::value(
                &rewritten[found.start()..end],
                expression,
                "malformed bracket reference",
            ));
        }
    }
    let code = TARGET_REFERENCE.replace_all(rewritten, "0");
    let code = mask_literals(&code);
    if let Some(pos) = code.find(['[', ']']) {
        let end = code[pos..]
            .find(']')
            .map_or(code.len(), |offset| pos + offset + 1);
        return Err(ExpressionError::value(
            code[pos..end].trim(),
            expression,
            "malformed bracket reference",
        ));
    }
    for caps in ANY_CALL.captures_iter(&code) {
        let name = &caps[1];
        let known = name == POW_FUNCTION
            || KEYWORDS.contains(&name)
            || FUNCTIONS.iter().any(|(_, target)| *target == name);
        if !known {
            return Err(ExpressionError::value(
                format!("{name}("),
                expression,
                "unknown function",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(expression: &str) -> Result<String> {
        calculation_to_target(expression, &mut CalculationScope::new())
    }

    #[test]
    fn test_table_reference() {
        assert_eq!(forward("[visit][weight]").unwrap(), "visit[\"weight\"]");
    }

    #[test]
    fn test_bare_reference_scopes() {
        let mut scope = CalculationScope::new();
        scope.register("c1");
        assert_eq!(
            calculation_to_target("[c1] + [z]", &mut scope).unwrap(),
            "calculations[\"c1\"] + assessment[\"z\"]"
        );
    }

    #[test]
    fn test_reference_names_are_canonical() {
        assert_eq!(forward("[Age]").unwrap(), "assessment[\"age\"]");
        assert_eq!(forward("[2nd]").unwrap(), "assessment[\"v_2nd\"]");
    }

    #[test]
    fn test_functions_at_word_boundaries() {
        assert_eq!(
            forward("round([a], 2) + rounddown([b]) + sum([a], [b])").unwrap(),
            "rios.conversion.redcap.math.round_(assessment[\"a\"], 2) + \
             rios.conversion.redcap.math.rounddown(assessment[\"b\"]) + \
             rios.conversion.redcap.math.sum_(assessment[\"a\"], assessment[\"b\"])"
        );
        assert_eq!(
            forward("max([a], abs([b]))").unwrap(),
            "max(assessment[\"a\"], abs(assessment[\"b\"]))"
        );
    }

    #[test]
    fn test_exponentiation_with_call_base() {
        assert_eq!(
            forward("sqrt([a])^(2)").unwrap(),
            "math.pow(math.sqrt(assessment[\"a\"]), 2)"
        );
        assert_eq!(
            forward("([a]+1)^(2)").unwrap(),
            "math.pow(assessment[\"a\"]+1, 2)"
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(forward("[a] <> 1").unwrap(), "assessment[\"a\"] != 1");
        assert_eq!(forward("[a] = '1'").unwrap(), "assessment[\"a\"] == '1'");
        assert_eq!(forward("[a] >= 1").unwrap(), "assessment[\"a\"] >= 1");
    }

    #[test]
    fn test_trigger_is_negated() {
        assert_eq!(
            trigger_to_target("[a] = 1 and [b] <> 2", &mut CalculationScope::new()).unwrap(),
            "!(assessment[\"a\"] == 1 and assessment[\"b\"] != 2)"
        );
    }

    #[test]
    fn test_unknown_function() {
        let err = forward("if([a] > 1, 1, 0)").unwrap_err();
        assert_eq!(
            err,
            ExpressionError::ValueExpression {
                fragment: "if(".into(),
                expression: "if([a] > 1, 1, 0)".into(),
                reason: "unknown function".into(),
            }
        );
    }

    #[test]
    fn test_malformed_brackets() {
        assert_eq!(forward("[a + 1").unwrap_err().fragment(), "[a + 1");
        assert_eq!(forward("[a(1)] + 2").unwrap_err().fragment(), "[a(1)]");
        assert!(forward("(x)^(2").is_err());
    }

    #[test]
    fn test_literals_are_not_checked() {
        assert_eq!(
            forward("datediff([d1], [d2], \"y\", \"mdy\") > 1").unwrap(),
            "rios.conversion.redcap.date.datediff(assessment[\"d1\"], assessment[\"d2\"], \"y\", \"mdy\") > 1"
        );
        assert_eq!(forward("[a] = 'x[y'").unwrap(), "assessment[\"a\"] == 'x[y'");
    }

    #[test]
    fn test_literals_are_not_rewritten() {
        assert_eq!(
            forward("[a] = \"[b]\"").unwrap(),
            "assessment[\"a\"] == \"[b]\""
        );
        assert_eq!(
            forward("[name] = 'a[b]' or [t][f] = 'sum(x)'").unwrap(),
            "assessment[\"name\"] == 'a[b]' or t[\"f\"] == 'sum(x)'"
        );
    }

    #[test]
    fn test_juxtaposed_references() {
        let err = forward("[a][b][c]").unwrap_err();
        assert_eq!(err.fragment(), "a[\"b\"]assessment[\"c\"]");
        assert_eq!(
            forward("[a]+[b]").unwrap(),
            "assessment[\"a\"]+assessment[\"b\"]"
        );
    }
}

//! Exponentiation rewriting.
//!
//! `(base)^(exponent)` nests arbitrarily, so both directions use a
//! counter-based parenthesis scan instead of a regex.

use crate::error::{ExpressionError, Result};
use crate::functions::{KEYWORDS, POW_FUNCTION};
use crate::lexical::{is_name_byte, literal_mask, matching_close, matching_open};

const CARET: &str = ")^(";

/// Rewrites every `(base)^(exponent)` into `math.pow(base, exponent)`.
///
/// Carets are handled leftmost first until none remain. When the left group
/// is the argument list of a call (`sqrt(x)^(2)`), the whole call is the
/// base. A caret not written as `)^(` is left untouched.
pub fn rewrite_exponentiation(expression: &str) -> Result<String> {
    let mut current = expression.to_string();
    let mut from = 0;
    while let Some(offset) = current[from..].find(CARET) {
        let close = from + offset;
        let mask = literal_mask(&current);
        if mask[close] {
            from = close + 1;
            continue;
        }
        let unbalanced = || {
            ExpressionError::value(
                CARET,
                expression,
                "unbalanced parentheses around exponentiation",
            )
        };
        let open = matching_open(&current, &mask, close).ok_or_else(unbalanced)?;
        let exponent_open = close + 2;
        let exponent_close =
            matching_close(&current, &mask, exponent_open).ok_or_else(unbalanced)?;

        let start = call_start(&current, open);
        let base = if start < open {
            &current[start..=close]
        } else {
            &current[open + 1..close]
        };
        let exponent = &current[exponent_open + 1..exponent_close];
        let prefix = &current[..start];
        let separator = if prefix.bytes().last().is_some_and(is_name_byte) {
            " "
        } else {
            ""
        };
        current = format!(
            "{prefix}{separator}{POW_FUNCTION}({}, {}){}",
            base.trim(),
            exponent.trim(),
            &current[exponent_close + 1..]
        );
        from = 0;
    }
    Ok(current)
}

/// Rewrites every `math.pow(base, exponent)` into `(base)^(exponent)`.
pub fn rewrite_power_calls(expression: &str) -> Result<String> {
    let mut current = expression.to_string();
    while let Some(start) = find_pow_call(&current) {
        let mask = literal_mask(&current);
        let open = start + POW_FUNCTION.len();
        let close = matching_close(&current, &mask, open).ok_or_else(|| {
            ExpressionError::value(
                &current[start..],
                expression,
                "unbalanced parentheses in power call",
            )
        })?;
        let comma = top_level_comma(&current, &mask, open, close).ok_or_else(|| {
            ExpressionError::value(
                &current[start..=close],
                expression,
                "power call needs exactly two arguments",
            )
        })?;
        current = format!(
            "{}({})^({}){}",
            &current[..start],
            current[open + 1..comma].trim(),
            current[comma + 1..close].trim(),
            &current[close + 1..]
        );
    }
    Ok(current)
}

/// Start of the call whose argument list opens at `open`, or `open` itself.
fn call_start(text: &str, open: usize) -> usize {
    let bytes = text.as_bytes();
    let mut start = open;
    while start > 0 && is_name_byte(bytes[start - 1]) {
        start -= 1;
    }
    let name = &text[start..open];
    let is_call = name
        .bytes()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == b'_')
        && !KEYWORDS.contains(&name);
    if is_call { start } else { open }
}

/// Leftmost `math.pow(` that is not the tail of a longer name.
fn find_pow_call(text: &str) -> Option<usize> {
    let needle = format!("{POW_FUNCTION}(");
    let mask = literal_mask(text);
    text.match_indices(&needle)
        .map(|(idx, _)| idx)
        .find(|&idx| !mask[idx] && (idx == 0 || !is_name_byte(text.as_bytes()[idx - 1])))
}

/// The single comma separating two arguments between `open` and `close`.
fn top_level_comma(text: &str, mask: &[bool], open: usize, close: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut found = None;
    for idx in open + 1..close {
        if mask[idx] {
            continue;
        }
        match bytes[idx] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                if found.is_some() {
                    return None;
                }
                found = Some(idx);
            }
            _ => {}
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_caret() {
        assert_eq!(rewrite_exponentiation("(x+1)^(2)").unwrap(), "math.pow(x+1, 2)");
    }

    #[test]
    fn test_nested_operands() {
        assert_eq!(
            rewrite_exponentiation("((x))^((y+1))").unwrap(),
            "math.pow((x), (y+1))"
        );
    }

    #[test]
    fn test_chained_and_embedded() {
        assert_eq!(
            rewrite_exponentiation("1 + ((a)^(2))^(3) * 2").unwrap(),
            "1 + math.pow(math.pow(a, 2), 3) * 2"
        );
        assert_eq!(
            rewrite_exponentiation("(a)^(2) + (b)^(3)").unwrap(),
            "math.pow(a, 2) + math.pow(b, 3)"
        );
    }

    #[test]
    fn test_call_is_base() {
        assert_eq!(
            rewrite_exponentiation("math.sqrt(x)^(2)").unwrap(),
            "math.pow(math.sqrt(x), 2)"
        );
        assert_eq!(
            rewrite_exponentiation("not(x)^(2)").unwrap(),
            "not math.pow(x, 2)"
        );
    }

    #[test]
    fn test_untouched_without_groups() {
        assert_eq!(rewrite_exponentiation("x^2").unwrap(), "x^2");
        assert_eq!(rewrite_exponentiation("a == ')^('").unwrap(), "a == ')^('");
    }

    #[test]
    fn test_unbalanced() {
        let err = rewrite_exponentiation("(x)^(2").unwrap_err();
        assert_eq!(err.fragment(), ")^(");
        assert!(rewrite_exponentiation("x)^(2)").is_err());
    }

    #[test]
    fn test_power_calls_back_to_carets() {
        assert_eq!(rewrite_power_calls("math.pow(x+1, 2)").unwrap(), "(x+1)^(2)");
        assert_eq!(
            rewrite_power_calls("math.pow(math.pow(a, 2), f(b, c))").unwrap(),
            "((a)^(2))^(f(b, c))"
        );
        assert_eq!(rewrite_power_calls("xmath.pow(a, b)").unwrap(), "xmath.pow(a, b)");
        assert!(rewrite_power_calls("math.pow(a)").is_err());
        assert!(rewrite_power_calls("math.pow(a, b").is_err());
    }
}

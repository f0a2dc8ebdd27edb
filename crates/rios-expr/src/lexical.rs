//! String-literal aware scanning helpers.

use regex::{Captures, Regex};

/// Marks every byte that belongs to a quoted literal, quotes included.
///
/// Both `'` and `"` open a literal, closed by the same quote. An unterminated
/// literal runs to the end of the text.
pub(crate) fn literal_mask(text: &str) -> Vec<bool> {
    let mut mask = vec![false; text.len()];
    let mut quote: Option<u8> = None;
    for (idx, byte) in text.bytes().enumerate() {
        match quote {
            Some(open) => {
                mask[idx] = true;
                if byte == open {
                    quote = None;
                }
            }
            None if byte == b'"' || byte == b'\'' => {
                mask[idx] = true;
                quote = Some(byte);
            }
            None => {}
        }
    }
    mask
}

/// Replaces literal contents with spaces so that checks only see code.
pub(crate) fn mask_literals(text: &str) -> String {
    let mask = literal_mask(text);
    text.char_indices()
        .map(|(idx, ch)| if mask[idx] { ' ' } else { ch })
        .collect()
}

/// `Regex::replace_all` that leaves matches starting inside a literal alone.
pub(crate) fn replace_outside_literals(
    regex: &Regex,
    text: &str,
    mut replace: impl FnMut(&Captures) -> String,
) -> String {
    let mask = literal_mask(text);
    regex
        .replace_all(text, |caps: &Captures| {
            if caps.get(0).is_some_and(|found| mask[found.start()]) {
                caps[0].to_string()
            } else {
                replace(caps)
            }
        })
        .into_owned()
}

/// `<>` becomes `!=` and a lone `=` becomes `==`.
pub(crate) fn forward_operators(text: &str) -> String {
    let mask = literal_mask(text);
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let (idx, ch) = chars[i];
        let next = chars.get(i + 1).map(|(_, next)| *next);
        if mask[idx] {
            out.push(ch);
            i += 1;
            continue;
        }
        match ch {
            '<' if next == Some('>') => {
                out.push_str("!=");
                i += 2;
            }
            '=' => {
                let prev = i.checked_sub(1).map(|p| chars[p].1);
                if matches!(prev, Some('<' | '>' | '!' | '=')) || next == Some('=') {
                    out.push('=');
                } else {
                    out.push_str("==");
                }
                i += 1;
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }
    out
}

/// `!=` becomes `<>` and `==` becomes `=`.
pub(crate) fn reverse_operators(text: &str) -> String {
    let mask = literal_mask(text);
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let (idx, ch) = chars[i];
        let next = chars.get(i + 1).map(|(_, next)| *next);
        match ch {
            '!' if !mask[idx] && next == Some('=') => {
                out.push_str("<>");
                i += 2;
            }
            '=' if !mask[idx] && next == Some('=') => {
                out.push('=');
                i += 2;
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }
    out
}

/// Index of the `)` closing the `(` at `open`, skipping literals.
pub(crate) fn matching_close(text: &str, mask: &[bool], open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for idx in open..bytes.len() {
        if mask[idx] {
            continue;
        }
        match bytes[idx] {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `(` opening the `)` at `close`, skipping literals.
pub(crate) fn matching_open(text: &str, mask: &[bool], close: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for idx in (0..=close).rev() {
        if mask[idx] {
            continue;
        }
        match bytes[idx] {
            b')' => depth += 1,
            b'(' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Identifier bytes, including the dots of qualified names.
pub(crate) fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_operators() {
        assert_eq!(forward_operators("a <> b"), "a != b");
        assert_eq!(forward_operators("a = 1"), "a == 1");
        assert_eq!(forward_operators("a <= 1 and b >= 2"), "a <= 1 and b >= 2");
        assert_eq!(forward_operators("a == 1 or a != 2"), "a == 1 or a != 2");
        assert_eq!(forward_operators("a = 'x=y'"), "a == 'x=y'");
    }

    #[test]
    fn test_reverse_operators() {
        assert_eq!(reverse_operators("a != b"), "a <> b");
        assert_eq!(reverse_operators("a == \"==\""), "a = \"==\"");
        assert_eq!(reverse_operators("!(a) <= 2"), "!(a) <= 2");
    }

    #[test]
    fn test_matching_parentheses() {
        let text = "f(a, (b), ')') + 1";
        let mask = literal_mask(text);
        assert_eq!(matching_close(text, &mask, 1), Some(13));
        assert_eq!(matching_open(text, &mask, 13), Some(1));
        assert_eq!(matching_close("(a", &literal_mask("(a"), 0), None);
    }

    #[test]
    fn test_replace_outside_literals() {
        let word = Regex::new(r"\bx\b").unwrap();
        assert_eq!(
            replace_outside_literals(&word, "x + 'x' + \"a x\" + x", |_| "y".to_string()),
            "y + 'x' + \"a x\" + y"
        );
    }

    #[test]
    fn test_mask_literals() {
        assert_eq!(mask_literals("a == 'x(y'"), "a ==      ");
    }
}

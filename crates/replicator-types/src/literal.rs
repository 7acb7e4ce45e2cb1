//! SQL literal and identifier handling.
//!
//! Generated statements embed values as text. Every value passes through
//! [`quote_literal`]; identifiers are never quoted and must instead pass
//! [`is_valid_identifier`].

/// Wrap `text` in single quotes, doubling embedded quotes.
///
/// NUL characters are dropped since no supported dialect accepts them
/// inside a string literal. Backslashes and other control characters are
/// kept as-is, which assumes standard literals: PostgreSQL with
/// `standard_conforming_strings` on, MySQL with `NO_BACKSLASH_ESCAPES`.
pub fn quote_literal(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\0' => {}
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Whether `name` can be embedded unquoted as a table or column name.
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote_literal("21 Jump St. Manila"), "'21 Jump St. Manila'");
        assert_eq!(quote_literal(""), "''");
    }

    #[test]
    fn test_quote_embedded_quotes() {
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(quote_literal("'"), "''''");
        assert_eq!(quote_literal("''; DROP TABLE x; --"), "''''''; DROP TABLE x; --'");
    }

    #[test]
    fn test_quote_backslashes_and_control_characters() {
        assert_eq!(quote_literal(r"C:\temp\"), r"'C:\temp\'");
        assert_eq!(quote_literal("a\nb\tc"), "'a\nb\tc'");
        assert_eq!(quote_literal("a\0b"), "'ab'");
    }

    #[test]
    fn test_trailing_backslash_stays_inside_literal() {
        let first = quote_literal("x\\");
        let second = quote_literal(", (SELECT 1)) -- ");
        assert_eq!(first, r"'x\'");
        assert_eq!(second, "', (SELECT 1)) -- '");
        assert_eq!(
            format!("({first}, {second})"),
            r"('x\', ', (SELECT 1)) -- ')"
        );
    }

    #[test]
    fn test_quoted_output_never_has_unpaired_quotes() {
        let samples = [
            "it's", "''", "'''", "\\'", "x\\", "\u{1}'\u{7f}", "ünïcødé'", "a\0'\0b",
        ];
        for sample in samples {
            let quoted = quote_literal(sample);
            let inner = &quoted[1..quoted.len() - 1];
            assert!(quoted.starts_with('\'') && quoted.ends_with('\''));
            assert_eq!(inner.matches('\'').count() % 2, 0, "sample {sample:?}");
            assert_eq!(inner.replace("''", "'"), sample.replace('\0', ""));
            assert!(!inner.contains('\0'));
        }
    }

    #[test]
    fn test_identifiers() {
        assert!(is_valid_identifier("freight_key"));
        assert!(is_valid_identifier("_col1"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1col"));
        assert!(!is_valid_identifier("amt; DROP"));
        assert!(!is_valid_identifier("a-b"));
    }
}

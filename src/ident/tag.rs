use enquote::{enquote, unquote};

/// Renders a struct tag as a double-quoted literal for the canonical ID.
pub fn quote_tag(tag: &str) -> String {
    enquote('"', tag)
}

/// Inverse of [quote_tag]. A literal that does not lex as one quoted string
/// is a nesting violation in the canonical ID, which is a caller bug.
pub fn unquote_tag(literal: &str) -> String {
    unquote(literal).expect("struct tag is not a well-formed string literal")
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::ident::{quote_tag, unquote_tag};

    #[test]
    pub fn test_quote_unquote_is_symmetric() {
        for tag in [
            r#"json:"name,omitempty""#,
            "",
            r"back\slash",
            "spaces and \t tabs",
        ] {
            assert_eq!(unquote_tag(&quote_tag(tag)), tag);
        }
    }

    #[test]
    pub fn test_quote_escapes_inner_quotes() {
        let quoted = quote_tag(r#"json:"id""#);
        assert!(quoted.starts_with('"') && quoted.ends_with('"'));
        assert!(quoted[1..quoted.len() - 1].contains('\\'));
    }

    #[test]
    #[should_panic]
    pub fn test_unterminated_literal_aborts() {
        unquote_tag("\"oops");
    }
}

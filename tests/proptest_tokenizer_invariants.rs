//! Property-based invariant tests for the interpolation tokenizer.
//!
//! 1. Tokens cover the input exactly: their sources concatenate to the text.
//! 2. Text without an opening marker is a single literal, unchanged.
//! 3. Literal runs are maximal (no two literals in a row).
//! 4. Expressions never span a line break.
//! 5. No panics on arbitrary input.

use proptest::prelude::*;
use spark_mvvm::compiler::tokenizer::{parse_text, Token};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Text dense in braces so markers, near-misses and nesting all show up.
fn template_strategy() -> impl Strategy<Value = String> {
    "[a-c {}\n.]{0,48}"
}

fn rebuild(tokens: &[Token]) -> String {
    tokens.iter().map(Token::source).collect()
}

proptest! {
    #[test]
    fn tokens_cover_input(text in template_strategy()) {
        let tokens = parse_text(&text);
        prop_assert_eq!(rebuild(&tokens), text);
    }

    #[test]
    fn text_without_markers_is_one_literal(text in "[^{]{1,64}") {
        let tokens = parse_text(&text);
        prop_assert_eq!(tokens, vec![Token::Literal(text.clone())]);
    }

    #[test]
    fn literals_are_maximal(text in template_strategy()) {
        let tokens = parse_text(&text);
        for pair in tokens.windows(2) {
            prop_assert!(
                !(matches!(pair[0], Token::Literal(_)) && matches!(pair[1], Token::Literal(_))),
                "adjacent literals in {:?}",
                tokens
            );
        }
        prop_assert!(tokens.iter().all(|t| !matches!(t, Token::Literal(s) if s.is_empty())));
    }

    #[test]
    fn expressions_stay_on_one_line(text in template_strategy()) {
        for token in parse_text(&text) {
            if let Token::Expr { value, .. } = token {
                prop_assert!(!value.contains('\n'));
            }
        }
    }

    #[test]
    fn arbitrary_input_never_panics(text in any::<String>()) {
        let tokens = parse_text(&text);
        prop_assert_eq!(rebuild(&tokens), text);
    }
}

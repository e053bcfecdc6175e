// ============================================================================
// spark-mvvm - Text Tokenizer
// Splits text content into literal runs and interpolation markers
// ============================================================================

/// A piece of text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    /// `{{expr}}` (escaped) or `{{{expr}}}` (raw markup)
    Expr { value: String, raw: bool },
}

impl Token {
    pub fn is_expr(&self) -> bool {
        matches!(self, Token::Expr { .. })
    }

    /// The source text this token was cut from.
    pub fn source(&self) -> String {
        match self {
            Token::Literal(text) => text.clone(),
            Token::Expr { value, raw: false } => format!("{{{{{value}}}}}"),
            Token::Expr { value, raw: true } => format!("{{{{{{{value}}}}}}}"),
        }
    }
}

/// Find `close` after `from`, without crossing a line break.
fn find_close(text: &str, from: usize, close: &str) -> Option<usize> {
    let rest = &text[from..];
    let end = rest.find(close)?;
    (!rest[..end].contains('\n')).then_some(from + end)
}

/// Tokenize text content.
///
/// Scans left to right for the earliest marker. At each candidate position a
/// triple-brace marker is tried before a double-brace one, and both close at
/// the first matching terminator on the same line. The tokens cover the
/// input exactly, in order: concatenating their sources gives back `text`.
///
/// # Example
///
/// ```
/// use spark_mvvm::compiler::tokenizer::{parse_text, Token};
///
/// let tokens = parse_text("pre {{a}} mid {{{b}}} post");
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Literal("pre ".into()),
///         Token::Expr { value: "a".into(), raw: false },
///         Token::Literal(" mid ".into()),
///         Token::Expr { value: "b".into(), raw: true },
///         Token::Literal(" post".into()),
///     ]
/// );
/// ```
pub fn parse_text(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find("{{") {
        let start = cursor + offset;

        let matched = if text[start..].starts_with("{{{") {
            find_close(text, start + 3, "}}}")
                .map(|close| (&text[start + 3..close], true, close + 3))
        } else {
            None
        }
        .or_else(|| {
            find_close(text, start + 2, "}}")
                .map(|close| (&text[start + 2..close], false, close + 2))
        });

        match matched {
            Some((value, raw, end)) => {
                if start > last {
                    tokens.push(Token::Literal(text[last..start].to_owned()));
                }
                tokens.push(Token::Expr {
                    value: value.to_owned(),
                    raw,
                });
                last = end;
                cursor = end;
            }
            None => cursor = start + 1,
        }
    }

    if last < text.len() {
        tokens.push(Token::Literal(text[last..].to_owned()));
    }
    tokens
}

// =============================================================================
// TESTS
// =============================================================================

// ============================================================================
// spark-mvvm - Directives
// Classification of directive attributes and their small expression forms
// ============================================================================

use crate::core::constants::{EVENT_DIRECTIVE, INDEX_KEY};
use crate::error::{BindError, Result};
use crate::observer::Value;
use crate::primitives::path::Path;
use crate::primitives::scope::Scope;

// =============================================================================
// DIRECTIVE KIND
// =============================================================================

/// What a directive attribute asks for, with the prefix already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `for="item in items"`
    For,
    /// `on:<event>="method(args)"`
    On(String),
    /// `model="path"`, two-way
    Model,
    /// Any other name, a one-way binding through the updater of that kind
    Bind(String),
}

impl Directive {
    /// Classify a directive name such as `text`, `on:click` or `for`.
    pub fn parse(name: &str) -> Result<Directive> {
        if let Some(rest) = name.strip_prefix(EVENT_DIRECTIVE) {
            if rest.is_empty() {
                return Err(BindError::malformed(name, "event directive without event type"));
            }
            if let Some(event) = rest.strip_prefix(':') {
                if event.is_empty() {
                    return Err(BindError::malformed(
                        name,
                        "event directive without event type",
                    ));
                }
                return Ok(Directive::On(event.to_owned()));
            }
        }

        match name {
            "" => Err(BindError::malformed(name, "empty directive name")),
            "for" => Ok(Directive::For),
            "model" => Ok(Directive::Model),
            kind => Ok(Directive::Bind(kind.to_owned())),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

// =============================================================================
// ITERATION EXPRESSION
// =============================================================================

/// `<item> in <path>`
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr {
    pub item: String,
    pub path: Path,
}

impl ForExpr {
    pub fn parse(expression: &str) -> Result<ForExpr> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        let [item, "in", path] = parts.as_slice() else {
            return Err(BindError::malformed(expression, "expected `<item> in <path>`"));
        };
        if !is_identifier(item) || *item == INDEX_KEY {
            return Err(BindError::malformed(expression, "invalid iteration item name"));
        }

        Ok(ForExpr {
            item: (*item).to_owned(),
            path: Path::parse(path)?,
        })
    }

    /// Local names of the clone at `index`.
    pub fn locals(&self, index: usize, item: Value) -> [(String, Value); 2] {
        [
            (self.item.clone(), item),
            (INDEX_KEY.to_owned(), Value::from(index)),
        ]
    }
}

// =============================================================================
// CALL EXPRESSION
// =============================================================================

/// A positional argument of an event handler call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Literal(Value),
    Path(Path),
}

impl Arg {
    fn parse(raw: &str, expression: &str) -> Result<Arg> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(BindError::malformed(expression, "empty argument"));
        }

        for quote in ['\'', '"'] {
            if let Some(rest) = raw.strip_prefix(quote) {
                return match rest.strip_suffix(quote) {
                    Some(text) if !text.contains(quote) => Ok(Arg::Literal(Value::from(text))),
                    _ => Err(BindError::malformed(expression, "unterminated string argument")),
                };
            }
        }

        match raw {
            "true" => return Ok(Arg::Literal(Value::from(true))),
            "false" => return Ok(Arg::Literal(Value::from(false))),
            "null" => return Ok(Arg::Literal(Value::null())),
            _ => {}
        }
        if raw.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            return raw
                .parse::<f64>()
                .map(|n| Arg::Literal(Value::from(n)))
                .map_err(|_| BindError::malformed(expression, "invalid numeric argument"));
        }

        Ok(Arg::Path(Path::parse(raw)?))
    }

    /// Resolve against `scope`. Literals pass through.
    pub fn resolve(&self, scope: &Scope) -> Result<Value> {
        match self {
            Arg::Literal(value) => Ok(value.clone()),
            Arg::Path(path) => scope.resolve(path),
        }
    }
}

/// Split an argument list on commas outside quotes.
fn split_args(list: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut quote = None;
    let mut start = 0;

    for (i, c) in list.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ',') => {
                args.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(&list[start..]);
    args
}

/// `method`, `method()` or `method(arg, 'text', 3)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub method: String,
    pub args: Vec<Arg>,
}

impl CallExpr {
    pub fn parse(expression: &str) -> Result<CallExpr> {
        let source = expression.trim();

        let (method, args) = match source.split_once('(') {
            None => (source, Vec::new()),
            Some((method, rest)) => {
                let Some(list) = rest.trim_end().strip_suffix(')') else {
                    return Err(BindError::malformed(expression, "unclosed argument list"));
                };
                let args = if list.trim().is_empty() {
                    Vec::new()
                } else {
                    split_args(list)
                        .into_iter()
                        .map(|raw| Arg::parse(raw, expression))
                        .collect::<Result<Vec<_>>>()?
                };
                (method.trim(), args)
            }
        };

        if !is_identifier(method) {
            return Err(BindError::malformed(expression, "invalid method name"));
        }

        Ok(CallExpr {
            method: method.to_owned(),
            args,
        })
    }

    /// Resolve every argument against `scope`.
    pub fn resolve_args(&self, scope: &Scope) -> Result<Vec<Value>> {
        self.args.iter().map(|arg| arg.resolve(scope)).collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

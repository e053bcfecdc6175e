// ============================================================================
// spark-mvvm - Compiler Module
// Host tree, text tokenizer, directives and the binder
// ============================================================================

pub mod compile;
pub mod directive;
pub mod dom;
pub mod methods;
pub mod tokenizer;
pub mod updater;

pub use compile::{CompileConfig, Compiler, View};
pub use directive::{Arg, CallExpr, Directive, ForExpr};
pub use dom::{Event, Node, NodeKind};
pub use methods::{Method, MethodRegistry};
pub use tokenizer::{parse_text, Token};
pub use updater::{UpdateFn, UpdaterRegistry};

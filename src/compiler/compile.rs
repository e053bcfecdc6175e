// ============================================================================
// spark-mvvm - Compiler
// Walks a host tree and turns directives and interpolations into watchers
// ============================================================================
//
// Pre-order, depth first. Elements: an iteration directive takes the element
// over (its other directives are bound on every clone); otherwise each
// directive attribute is bound and stripped, then the children are visited
// unless a `text` or `html` binding owns them.
// Text nodes holding interpolation markers are split into one node per
// token. A failing binding is logged and recorded on the `View`; the walk
// carries on.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::directive::{CallExpr, Directive, ForExpr};
use super::dom::{Node, NodeKind};
use super::methods::MethodRegistry;
use super::tokenizer::{parse_text, Token};
use super::updater::UpdaterRegistry;
use crate::cloned;
use crate::core::constants::{DEFAULT_PREFIX, LENGTH_KEY};
use crate::error::{BindError, Result};
use crate::observer::{ReactiveArray, Value};
use crate::primitives::path::Path;
use crate::primitives::scope::Scope;
use crate::primitives::watcher::Watcher;
use crate::reactivity::tracking::untrack;

/// One-way kinds that replace the element's children
const CONTENT_KINDS: [&str; 2] = ["text", "html"];

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileConfig {
    prefix: String,
}

impl CompileConfig {
    /// Attribute prefix marking a directive.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }
}

// =============================================================================
// VIEW
// =============================================================================

/// Everything one compile pass created.
///
/// Owns the watchers of the compiled bindings: dropping the view stops every
/// binding. Rendered iteration clones are owned per block and replaced on
/// re-render.
#[derive(Default)]
pub struct View {
    watchers: Vec<Watcher>,
    blocks: Vec<Rc<RefCell<Vec<View>>>>,
    errors: Vec<BindError>,
}

impl View {
    /// Live watchers, including those of rendered iteration clones.
    pub fn watcher_count(&self) -> usize {
        let nested: usize = self
            .blocks
            .iter()
            .map(|block| block.borrow().iter().map(View::watcher_count).sum::<usize>())
            .sum();
        self.watchers.len() + nested
    }

    /// Bindings that failed to set up, in compile order. Iteration clones
    /// report the failures of their latest render.
    pub fn errors(&self) -> Vec<BindError> {
        let mut errors = self.errors.clone();
        for block in &self.blocks {
            for view in block.borrow().iter() {
                errors.extend(view.errors());
            }
        }
        errors
    }

    pub fn is_clean(&self) -> bool {
        self.errors().is_empty()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("watchers", &self.watcher_count())
            .field("errors", &self.errors())
            .finish()
    }
}

// =============================================================================
// COMPILER
// =============================================================================

/// Binds a host tree against a scope.
///
/// Cheap to clone: configuration and registries are shared.
///
/// # Example
///
/// ```
/// use spark_mvvm::compiler::{Compiler, dom::Node};
/// use spark_mvvm::{ReactiveObject, Scope};
/// use serde_json::json;
///
/// let data = ReactiveObject::from_json(json!({ "name": "ada" }));
/// let root = Node::element("div")
///     .with_child(Node::element("p").with_attr("v-text", "name"))
///     .with_child(Node::text("hi {{name}}"));
///
/// let view = Compiler::default().compile(&root, &Scope::new(data.clone())).unwrap();
/// assert_eq!(root.inner_html(), "<p>ada</p>hi ada");
///
/// data.set("name", "grace").unwrap();
/// assert_eq!(root.inner_html(), "<p>grace</p>hi grace");
/// assert!(view.is_clean());
/// ```
#[derive(Clone, Default)]
pub struct Compiler {
    config: Rc<CompileConfig>,
    updaters: Rc<UpdaterRegistry>,
    methods: Rc<MethodRegistry>,
}

impl Compiler {
    pub fn new(config: CompileConfig, updaters: UpdaterRegistry, methods: MethodRegistry) -> Self {
        Self {
            config: Rc::new(config),
            updaters: Rc::new(updaters),
            methods: Rc::new(methods),
        }
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Compile the children of `root` in place.
    ///
    /// Binding failures are collected on the returned view; only errors that
    /// are not local to one binding abort the pass.
    pub fn compile(&self, root: &Node, scope: &Scope) -> Result<View> {
        let mut view = View::default();
        self.compile_children(root, scope, &mut view)?;

        tracing::debug!(
            message = "compile.done",
            watchers = view.watcher_count(),
            errors = view.errors.len()
        );
        Ok(view)
    }

    fn compile_children(&self, parent: &Node, scope: &Scope, view: &mut View) -> Result<()> {
        // Snapshot: text nodes replace themselves while we walk
        for child in parent.children() {
            match child.kind() {
                NodeKind::Element(_) => self.compile_element(&child, scope, view)?,
                NodeKind::Text => self.compile_text(&child, scope, view)?,
                NodeKind::Raw | NodeKind::Anchor => {}
            }
        }
        Ok(())
    }

    fn compile_element(&self, node: &Node, scope: &Scope, view: &mut View) -> Result<()> {
        let prefix = self.config.prefix();

        let for_attr = format!("{prefix}for");
        if let Some(expression) = node.attribute(&for_attr) {
            node.remove_attribute(&for_attr);
            let result = self.bind_for(node, &expression, scope, view);
            if result.is_err() {
                // The template stays in the tree unbound
                for (name, _) in node.attributes() {
                    if name.starts_with(prefix) {
                        node.remove_attribute(&name);
                    }
                }
            }
            return self.isolate(view, &for_attr, result);
        }

        let mut owns_content = false;
        for (name, expression) in node.attributes() {
            let Some(directive) = name.strip_prefix(prefix) else {
                continue;
            };
            owns_content |= CONTENT_KINDS.contains(&directive);
            node.remove_attribute(&name);
            let result = self.apply(node, &name, directive, &expression, scope, view);
            self.isolate(view, &name, result)?;
        }

        // Rendered content is data, not template source
        if owns_content {
            return Ok(());
        }
        self.compile_children(node, scope, view)
    }

    fn apply(
        &self,
        node: &Node,
        attribute: &str,
        directive: &str,
        expression: &str,
        scope: &Scope,
        view: &mut View,
    ) -> Result<()> {
        match Directive::parse(directive)? {
            Directive::On(event_type) => self.bind_event(node, attribute, &event_type, expression, scope),
            Directive::Model => self.bind_model(node, expression, scope, view),
            Directive::Bind(kind) => self.bind(node, scope, Path::parse(expression)?, &kind, view),
            // Taken over before the attribute loop
            Directive::For => Ok(()),
        }
    }

    fn compile_text(&self, node: &Node, scope: &Scope, view: &mut View) -> Result<()> {
        let tokens = parse_text(&node.text_content());
        if !tokens.iter().any(Token::is_expr) {
            return Ok(());
        }

        let mut pieces = Vec::with_capacity(tokens.len());
        for token in tokens {
            let piece = match &token {
                Token::Literal(text) => Node::text(text.as_str()),
                Token::Expr { value, raw } => {
                    let (piece, kind) = if *raw {
                        (Node::raw(""), "html")
                    } else {
                        (Node::text(""), "text")
                    };
                    let result = Path::parse(value)
                        .and_then(|path| self.bind(&piece, scope, path, kind, view));
                    self.isolate(view, &token.source(), result)?;
                    piece
                }
            };
            pieces.push(piece);
        }

        node.replace_with(&pieces);
        Ok(())
    }

    /// Record a binding-local failure on the view, propagate anything else.
    fn isolate(&self, view: &mut View, directive: &str, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(error) if error.is_binding_local() => {
                tracing::warn!(message = "binding skipped", directive, %error);
                view.errors.push(error);
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    // =========================================================================
    // ONE-WAY BINDING
    // =========================================================================

    /// Render `path` into `node` now and on every change.
    fn bind(&self, node: &Node, scope: &Scope, path: Path, kind: &str, view: &mut View) -> Result<()> {
        let update = self
            .updaters
            .get(kind)
            .ok_or_else(|| BindError::UnknownDirective {
                directive: kind.to_owned(),
            })?;

        let watcher = Watcher::with_path(
            scope.clone(),
            path,
            cloned!(node, update => move |_, new, old| {
                update(&node, new, Some(old));
                Ok(())
            }),
        )?;
        update(node, &watcher.value(), None);

        view.watchers.push(watcher);
        Ok(())
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    fn bind_event(
        &self,
        node: &Node,
        attribute: &str,
        event_type: &str,
        expression: &str,
        scope: &Scope,
    ) -> Result<()> {
        let call = CallExpr::parse(expression)?;
        let method = self
            .methods
            .get(&call.method)
            .ok_or_else(|| BindError::DirectiveResolution {
                directive: attribute.to_owned(),
                method: call.method.clone(),
            })?;

        node.add_event_listener(
            event_type,
            cloned!(scope => move |event| {
                let args = untrack(|| call.resolve_args(&scope))?;
                method(&scope, event, args.as_slice())
            }),
        );
        Ok(())
    }

    // =========================================================================
    // TWO-WAY BINDING
    // =========================================================================

    fn bind_model(&self, node: &Node, expression: &str, scope: &Scope, view: &mut View) -> Result<()> {
        let path = Path::parse(expression)?;
        self.bind(node, scope, path.clone(), "model", view)?;

        // No write-back while an input method is composing
        let composing = Rc::new(Cell::new(false));

        node.add_event_listener(
            "compositionstart",
            cloned!(composing => move |_| {
                composing.set(true);
                Ok(())
            }),
        );
        node.add_event_listener(
            "compositionend",
            cloned!(composing, scope, path => move |event| {
                composing.set(false);
                write_back(&scope, &path, event.target())
            }),
        );
        node.add_event_listener(
            "input",
            cloned!(scope => move |event| {
                if composing.get() {
                    return Ok(());
                }
                write_back(&scope, &path, event.target())
            }),
        );
        Ok(())
    }

    // =========================================================================
    // ITERATION
    // =========================================================================

    fn bind_for(&self, template: &Node, expression: &str, scope: &Scope, view: &mut View) -> Result<()> {
        let expr = ForExpr::parse(expression)?;
        list_at(scope, &expr)?;
        if template.parent().is_none() {
            return Err(BindError::malformed(expression, "iteration template has no parent"));
        }

        let start = Node::anchor();
        let end = Node::anchor();
        template.replace_with(&[start.clone(), end.clone()]);

        let length = expr.path.join(LENGTH_KEY)?;
        let block = ForBlock {
            compiler: self.clone(),
            template: template.clone(),
            expr,
            scope: scope.clone(),
            start,
            end,
            rendered: Rc::new(RefCell::new(Vec::new())),
        };
        block.render()?;

        let rendered = block.rendered.clone();
        let watcher = Watcher::with_path(scope.clone(), length, move |_, _, _| block.rerender())?;

        view.watchers.push(watcher);
        view.blocks.push(rendered);
        Ok(())
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("config", &self.config)
            .field("updaters", &self.updaters)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Write an input's value back unless the store already holds it.
fn write_back(scope: &Scope, path: &Path, target: &Node) -> Result<()> {
    let value = target.value();
    let current = untrack(|| scope.resolve(path))?;
    if current.as_str() == Some(value.as_str()) {
        return Ok(());
    }
    scope.assign(path, value)?;
    Ok(())
}

fn list_at(scope: &Scope, expr: &ForExpr) -> Result<ReactiveArray> {
    match untrack(|| scope.resolve(&expr.path))? {
        Value::Array(list) => Ok(list),
        _ => Err(BindError::ExpectedList {
            path: expr.path.to_string(),
        }),
    }
}

// =============================================================================
// ITERATION BLOCK
// =============================================================================

/// One iteration directive: a detached template rendered once per list
/// element between two anchors.
struct ForBlock {
    compiler: Compiler,
    template: Node,
    expr: ForExpr,
    scope: Scope,
    start: Node,
    end: Node,
    rendered: Rc<RefCell<Vec<View>>>,
}

impl ForBlock {
    fn render(&self) -> Result<()> {
        let items = untrack(|| list_at(&self.scope, &self.expr).map(|list| list.to_vec()))?;
        let Some(parent) = self.end.parent() else {
            return Ok(());
        };

        let mut views = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let clone = self.template.deep_clone();
            parent.insert_before(&clone, &self.end);

            let scope = self.scope.child(self.expr.locals(index, item));
            let mut view = View::default();
            self.compiler.compile_element(&clone, &scope, &mut view)?;
            views.push(view);
        }

        tracing::debug!(
            message = "for.render",
            path = %self.expr.path,
            items = views.len()
        );
        *self.rendered.borrow_mut() = views;
        Ok(())
    }

    /// Full re-render: drop the previous clones and their bindings first.
    fn rerender(&self) -> Result<()> {
        let previous = std::mem::take(&mut *self.rendered.borrow_mut());
        drop(previous);
        Node::remove_between(&self.start, &self.end);
        self.render()
    }
}

// =============================================================================
// TESTS
// =============================================================================

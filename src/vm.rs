// ============================================================================
// spark-mvvm - Vm
// The view-model: one data root, its methods, and the views mounted on it
// ============================================================================

use std::fmt;

use serde_json::Value as Json;

use crate::compiler::dom::{Event, Node};
use crate::compiler::{CompileConfig, Compiler, MethodRegistry, UpdaterRegistry, View};
use crate::error::{BindError, Result};
use crate::observer::{ReactiveObject, Value};
use crate::primitives::path::Path;
use crate::primitives::scope::Scope;
use crate::primitives::watcher::Watcher;

/// A data root bound to its handlers.
///
/// # Example
///
/// ```
/// use spark_mvvm::compiler::dom::Node;
/// use spark_mvvm::{Value, Vm};
/// use serde_json::json;
///
/// let vm = Vm::builder(json!({ "count": 0 }))
///     .method("increment", |scope, _event, _args| {
///         let next = scope.eval("count")?.as_f64().unwrap_or(0.0) + 1.0;
///         scope.data().set("count", next)?;
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// let button = Node::element("button")
///     .with_attr("v-on:click", "increment")
///     .with_child(Node::text("{{count}}"));
/// let root = Node::element("div").with_child(button.clone());
/// let _view = vm.mount(&root).unwrap();
///
/// button.dispatch("click").unwrap();
/// assert_eq!(vm.get("count").unwrap(), Value::from(1));
/// assert_eq!(root.inner_html(), "<button>1</button>");
/// ```
pub struct Vm {
    scope: Scope,
    compiler: Compiler,
}

impl Vm {
    /// A view-model with the built-in updaters and no methods.
    ///
    /// The root must be a JSON object.
    pub fn new(data: Json) -> Result<Self> {
        Self::builder(data).build()
    }

    pub fn builder(data: Json) -> VmBuilder {
        VmBuilder {
            data,
            config: CompileConfig::default(),
            updaters: UpdaterRegistry::default(),
            methods: MethodRegistry::new(),
        }
    }

    pub fn data(&self) -> &ReactiveObject {
        self.scope.data()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Read a value by path (`todos.0.title`).
    pub fn get(&self, expression: &str) -> Result<Value> {
        self.scope.eval(expression)
    }

    /// Write a value by path. Returns whether anything changed.
    pub fn set(&self, expression: &str, value: impl Into<Value>) -> Result<bool> {
        self.scope.assign(&Path::parse(expression)?, value)
    }

    /// Call `callback(new, old)` whenever `expression` changes.
    ///
    /// The watch lasts as long as the returned handle.
    pub fn watch<F>(&self, expression: &str, mut callback: F) -> Result<Watcher>
    where
        F: FnMut(&Value, &Value) + 'static,
    {
        Watcher::new(self.scope.clone(), expression, move |_, new, old| {
            callback(new, old);
            Ok(())
        })
    }

    /// Compile the children of `root` against this view-model.
    pub fn mount(&self, root: &Node) -> Result<View> {
        self.compiler.compile(root, &self.scope)
    }
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vm")
            .field("data", self.scope.data())
            .field("compiler", &self.compiler)
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

pub struct VmBuilder {
    data: Json,
    config: CompileConfig,
    updaters: UpdaterRegistry,
    methods: MethodRegistry,
}

impl VmBuilder {
    pub fn config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn method(
        mut self,
        name: &str,
        method: impl Fn(&Scope, &Event, &[Value]) -> Result<()> + 'static,
    ) -> Self {
        self.methods.register(name, method);
        self
    }

    /// Register (or replace) the updater for a one-way directive kind.
    pub fn updater(
        mut self,
        kind: &str,
        update: impl Fn(&Node, &Value, Option<&Value>) + 'static,
    ) -> Self {
        self.updaters.register(kind, update);
        self
    }

    pub fn build(self) -> Result<Vm> {
        let Json::Object(map) = self.data else {
            return Err(BindError::InvalidRoot);
        };

        tracing::debug!(
            message = "vm.build",
            keys = map.len(),
            prefix = self.config.prefix()
        );

        Ok(Vm {
            scope: Scope::new(ReactiveObject::from_map(map)),
            compiler: Compiler::new(self.config, self.updaters, self.methods),
        })
    }
}

impl fmt::Debug for VmBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VmBuilder")
            .field("data", &self.data)
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn root_must_be_an_object() {
        assert_eq!(Vm::new(json!([1, 2])).unwrap_err(), BindError::InvalidRoot);
        assert_eq!(Vm::new(json!(3)).unwrap_err(), BindError::InvalidRoot);
        assert!(Vm::new(json!({})).is_ok());
    }

    #[test]
    fn get_and_set_by_path() {
        let vm = Vm::new(json!({ "user": { "name": "ada" } })).unwrap();
        assert_eq!(vm.get("user.name").unwrap(), Value::from("ada"));

        assert!(vm.set("user.name", "grace").unwrap());
        assert!(!vm.set("user.name", "grace").unwrap());
        assert_eq!(vm.data().to_json(), json!({ "user": { "name": "grace" } }));
    }

    #[test]
    fn watch_reports_new_and_old() {
        let vm = Vm::new(json!({ "a": 1 })).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        let watcher = vm
            .watch("a", move |new, old| s.borrow_mut().push((new.to_json(), old.to_json())))
            .unwrap();

        vm.set("a", 2).unwrap();
        assert_eq!(*seen.borrow(), vec![(json!(2), json!(1))]);

        drop(watcher);
        vm.set("a", 3).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn watch_sees_its_own_normalization() {
        let vm = Vm::new(json!({ "name": "ada" })).unwrap();
        let data = vm.data().clone();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        let _watcher = vm
            .watch("name", move |new, _| {
                let text = new.to_display_string();
                s.borrow_mut().push(text.clone());
                data.set("name", text.to_uppercase()).unwrap();
            })
            .unwrap();

        vm.set("name", "bob").unwrap();
        assert_eq!(*seen.borrow(), vec!["bob", "BOB"]);
        assert_eq!(vm.get("name").unwrap(), Value::from("BOB"));
    }

    #[test]
    fn custom_updater_kind() {
        let vm = Vm::builder(json!({ "tip": "hello" }))
            .updater("title", |node, value, _| {
                node.set_attribute("title", &value.to_display_string())
            })
            .build()
            .unwrap();

        let span = Node::element("span").with_attr("v-title", "tip");
        let root = Node::element("div").with_child(span.clone());
        let _view = vm.mount(&root).unwrap();

        assert_eq!(span.attribute("title").as_deref(), Some("hello"));
        vm.set("tip", "bye").unwrap();
        assert_eq!(span.attribute("title").as_deref(), Some("bye"));
    }
}

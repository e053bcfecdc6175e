// ============================================================================
// spark-mvvm - Updaters
// The functions that push a binding's value into the host tree
// ============================================================================

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::dom::Node;
use crate::observer::Value;

/// Writes `new` into `node`. `old` is `None` on the initial render.
pub type UpdateFn = Rc<dyn Fn(&Node, &Value, Option<&Value>)>;

/// Binding kind → update function.
///
/// `Default` carries the four built-in kinds: `text`, `html`, `class` and
/// `model`. Registering a kind again replaces it.
///
/// # Example
///
/// ```
/// use spark_mvvm::compiler::dom::Node;
/// use spark_mvvm::compiler::updater::UpdaterRegistry;
/// use spark_mvvm::Value;
///
/// let mut updaters = UpdaterRegistry::default();
/// updaters.register("title", |node, value, _old| {
///     node.set_attribute("title", &value.to_display_string());
/// });
///
/// let node = Node::element("span");
/// updaters.get("title").unwrap()(&node, &Value::from("hi"), None);
/// assert_eq!(node.attribute("title").as_deref(), Some("hi"));
/// ```
#[derive(Clone)]
pub struct UpdaterRegistry {
    updaters: HashMap<String, UpdateFn>,
}

impl UpdaterRegistry {
    /// A registry with no kinds at all.
    pub fn empty() -> Self {
        Self {
            updaters: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        kind: &str,
        update: impl Fn(&Node, &Value, Option<&Value>) + 'static,
    ) -> &mut Self {
        self.updaters.insert(kind.to_owned(), Rc::new(update));
        self
    }

    pub fn get(&self, kind: &str) -> Option<UpdateFn> {
        self.updaters.get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.updaters.contains_key(kind)
    }
}

impl Default for UpdaterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("text", text_updater)
            .register("html", html_updater)
            .register("class", class_updater)
            .register("model", model_updater);
        registry
    }
}

impl fmt::Debug for UpdaterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&String> = self.updaters.keys().collect();
        kinds.sort();
        f.debug_struct("UpdaterRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

// =============================================================================
// BUILT-IN KINDS
// =============================================================================

/// Text content. Null renders as the empty string.
pub fn text_updater(node: &Node, value: &Value, _old: Option<&Value>) {
    node.set_text_content(&value.to_display_string());
}

/// Raw markup.
pub fn html_updater(node: &Node, value: &Value, _old: Option<&Value>) {
    node.set_inner_html(&value.to_display_string());
}

/// Swap the old class token for the new one, leaving other classes alone.
pub fn class_updater(node: &Node, value: &Value, old: Option<&Value>) {
    let current = node.attribute("class").unwrap_or_default();
    let old = old.map(Value::to_display_string).unwrap_or_default();
    let new = value.to_display_string();

    let mut classes: Vec<&str> = current
        .split_whitespace()
        .filter(|class| old.is_empty() || *class != old)
        .collect();
    if !new.is_empty() && !classes.contains(&new.as_str()) {
        classes.push(&new);
    }
    node.set_attribute("class", &classes.join(" "));
}

/// The value property of a form control.
pub fn model_updater(node: &Node, value: &Value, _old: Option<&Value>) {
    node.set_value(&value.to_display_string());
}

// =============================================================================
// TESTS
// =============================================================================

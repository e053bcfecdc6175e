// ============================================================================
// spark-mvvm - Methods
// Named handlers that event directives dispatch to
// ============================================================================

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::dom::Event;
use crate::error::Result;
use crate::observer::Value;
use crate::primitives::scope::Scope;

/// An event handler: the binding's scope, the triggering event and the
/// call's positional arguments.
pub type Method = Rc<dyn Fn(&Scope, &Event, &[Value]) -> Result<()>>;

#[derive(Clone, Default)]
pub struct MethodRegistry {
    methods: HashMap<String, Method>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        method: impl Fn(&Scope, &Event, &[Value]) -> Result<()> + 'static,
    ) -> &mut Self {
        self.methods.insert(name.to_owned(), Rc::new(method));
        self
    }

    pub fn get(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.methods.keys().collect();
        names.sort();
        f.debug_struct("MethodRegistry")
            .field("names", &names)
            .finish()
    }
}

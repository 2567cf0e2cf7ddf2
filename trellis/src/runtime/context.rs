// Lexical variable frames. Frames chain through immutable `Arc` parents, so
// a closure can snapshot its defining chain cheaply while the live frame at
// the head keeps accepting `let` bindings.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::model::node::NodeRef;
use crate::runtime::error::{ErrorKind, RuntimeError, RuntimeResult};

#[derive(Debug, Default)]
pub struct VariableContext {
    parent: Option<Arc<VariableContext>>,
    bindings: RwLock<HashMap<String, NodeRef>>,
    /// Ordinary function application seals the frame: lookups stop here after
    /// checking local bindings, so caller locals never leak into the callee.
    /// Lambda invocation leaves the frame open to its captured chain.
    scope_boundary: bool,
}

impl VariableContext {
    pub fn new() -> VariableContext {
        VariableContext::default()
    }

    pub fn with_parent(parent: Arc<VariableContext>) -> VariableContext {
        VariableContext {
            parent: Some(parent),
            bindings: RwLock::new(HashMap::new()),
            scope_boundary: false,
        }
    }

    pub fn sealed(parent: Arc<VariableContext>) -> VariableContext {
        VariableContext {
            parent: Some(parent),
            bindings: RwLock::new(HashMap::new()),
            scope_boundary: true,
        }
    }

    /// Register a value in this frame. Shadowing an outer binding is fine;
    /// rebinding a name already local to this frame is not.
    pub fn bind(&self, name: impl Into<String>, value: NodeRef) -> RuntimeResult<()> {
        let name = name.into();
        let mut bindings = self.bindings.write().expect("variable frame poisoned");
        if bindings.contains_key(&name) {
            return Err(RuntimeError::new(ErrorKind::VariableNameConflict { name }));
        }
        bindings.insert(name, value);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<NodeRef> {
        let local = self
            .bindings
            .read()
            .expect("variable frame poisoned")
            .get(name)
            .cloned();
        if local.is_some() || self.scope_boundary {
            return local;
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .bindings
            .read()
            .expect("variable frame poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

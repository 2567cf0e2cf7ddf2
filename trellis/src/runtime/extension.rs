// Extension hook for execution platforms that carry extra natives. Hooks are
// consulted in registration order; the first one that claims a signature
// wins.

use std::sync::Arc;

use crate::model::node::NodeRef;
use crate::runtime::context::VariableContext;
use crate::runtime::error::RuntimeResult;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::natives::NativeFunction;
use crate::runtime::resolution::ResolutionStacks;

pub trait InterpretedExtension: Send + Sync {
    fn name(&self) -> &str;

    /// Natives merged into the registry when the interpreter is built.
    fn extra_natives(&self) -> Vec<(String, Arc<dyn NativeFunction>)> {
        Vec::new()
    }

    /// Last-chance dispatch for a signature the registry does not know.
    /// Return `None` to decline; the next extension is asked, and when all
    /// decline the call fails as unsupported.
    fn extra_function_execution(
        &self,
        _interpreter: &Interpreter,
        _signature: &str,
        _parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
    ) -> Option<RuntimeResult<NodeRef>> {
        None
    }
}

// Assertion natives. Arguments are deferred so the failure message is only
// computed when the assertion actually fails.

use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::model::function::Function;
use crate::model::node::{NodeRef, PrimitiveValue, SourceInfo};
use crate::runtime::context::VariableContext;
use crate::runtime::error::{ErrorKind, RuntimeError, RuntimeResult};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::natives::{
    boolean_value, one_value, register, NativeFunction, NativeRegistry,
};
use crate::runtime::resolution::ResolutionStacks;

pub fn install(registry: &mut NativeRegistry) {
    register(registry, "assert_Boolean_1__Boolean_1_", Assert);
    register(registry, "assert_Boolean_1__String_1__Boolean_1_", Assert);
    register(registry, "assert_Boolean_1__Function_1__Boolean_1_", Assert);
}

struct Assert;

impl NativeFunction for Assert {
    fn arity(&self) -> RangeInclusive<usize> {
        1..=2
    }

    fn defer_parameter_execution(&self) -> bool {
        true
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        stacks: &mut ResolutionStacks,
        context: &Arc<VariableContext>,
        call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let condition = interpreter.execute_expression(&parameters[0], context, stacks)?;
        if boolean_value(&condition, "assert")? {
            return Ok(interpreter
                .repository()
                .value_specification(vec![interpreter.repository().boolean(true)]));
        }
        let message = match parameters.get(1) {
            Some(parameter) => {
                let evaluated = interpreter.execute_expression(parameter, context, stacks)?;
                Some(render_message(interpreter, &evaluated, context, stacks)?)
            }
            None => None,
        };
        Err(RuntimeError::with_source(
            ErrorKind::AssertFailed { message },
            call_site.cloned(),
        ))
    }
}

/// A plain string is used as-is; a function is invoked to produce one.
fn render_message(
    interpreter: &Interpreter,
    evaluated: &NodeRef,
    context: &Arc<VariableContext>,
    stacks: &mut ResolutionStacks,
) -> RuntimeResult<String> {
    let value = one_value(evaluated, "assert")?;
    if let Some(PrimitiveValue::String(message)) = value.primitive_value() {
        return Ok(message.clone());
    }
    if matches!(
        value.as_function(),
        Some(Function::Lambda(_) | Function::Closure(_) | Function::Defined(_))
    ) {
        let function = interpreter.capture_if_open_lambda(&value, context);
        let result = interpreter.execute_lambda(&function, Vec::new(), stacks)?;
        let message = one_value(&result, "assert")?;
        if let Some(PrimitiveValue::String(message)) = message.primitive_value() {
            return Ok(message.clone());
        }
        return Ok(message.describe());
    }
    Ok(value.describe())
}
